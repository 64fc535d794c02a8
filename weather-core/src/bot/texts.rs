//! User-facing messages.

use crate::model::WeatherSnapshot;

pub const GENERIC_ERROR: &str = "Произошла ошибка";
pub const SET_CITY_FIRST: &str = "Сначала введите свой город с помощью команды /city";
pub const NO_COORDINATES: &str = "Мы не смогли получить координаты этой местности(";
pub const NO_WEATHER: &str = "Мы не смогли получить погоду в этой местности(";
pub const UNKNOWN_COMMAND: &str = "Такая команда не доступна";

pub const HELP: &str = "Установите свой город с помощью команды /city название_города\n\n\
Чтобы узнать погоду в выбранном вами городе введите /weather\n\n\
Чтобы еще раз ознакомиться с данной информацией введите команду /help";

pub fn welcome(name: &str) -> String {
    format!("Добро пожаловать, {name}!")
}

pub fn city_saved(city: &str) -> String {
    format!("Город {city} сохранен!")
}

pub fn weather_report(weather: &WeatherSnapshot) -> String {
    [
        weather.city_name.clone(),
        format!("Температура: {:.1}°C", weather.temperature_c),
        format!("Ощущается как: {:.1}°C", weather.feels_like_c),
        format!("Описание: {}", weather.description),
        format!("Осадки: {:.2} мм/ч", weather.precipitation_mm_h),
        format!(
            "Ветер: {:.2} м/с, порыв: {:.2} м/с",
            weather.wind_speed_mps, weather.wind_gust_mps
        ),
        format!("Давление: {:.2} мм рт. ст.", weather.pressure_mmhg()),
        format!("Влажность: {}%", weather.humidity_pct),
        format!("Видимость: {} метров", weather.visibility_m),
        format!("Облака: {}%", weather.clouds_pct),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_fields_in_fixed_order() {
        let weather = WeatherSnapshot {
            city_name: "Paris".into(),
            temperature_c: 12.34,
            feels_like_c: 10.0,
            description: "ясно".into(),
            precipitation_mm_h: 0.25,
            wind_speed_mps: 3.6,
            wind_gust_mps: 7.25,
            ground_pressure_hpa: 1000,
            humidity_pct: 81,
            visibility_m: 10000,
            clouds_pct: 40,
        };

        let expected = "Paris\n\
            Температура: 12.3°C\n\
            Ощущается как: 10.0°C\n\
            Описание: ясно\n\
            Осадки: 0.25 мм/ч\n\
            Ветер: 3.60 м/с, порыв: 7.25 м/с\n\
            Давление: 750.06 мм рт. ст.\n\
            Влажность: 81%\n\
            Видимость: 10000 метров\n\
            Облака: 40%";

        assert_eq!(weather_report(&weather), expected);
    }

    #[test]
    fn help_lists_every_command() {
        assert!(HELP.contains("/city название_города"));
        assert!(HELP.contains("/weather"));
        assert!(HELP.contains("/help"));
    }

    #[test]
    fn confirmation_echoes_city() {
        assert_eq!(city_saved("Paris"), "Город Paris сохранен!");
        assert_eq!(welcome("ann"), "Добро пожаловать, ann!");
    }
}
