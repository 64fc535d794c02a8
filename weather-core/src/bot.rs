//! Routes inbound Telegram messages to command handlers.
//!
//! Each update is handled on its own: the dispatcher keeps no state between
//! messages, everything it remembers lives in the [`UserStore`].

use std::{sync::Arc, time::Duration};

use tracing::{debug, error, info, warn};

use crate::{
    provider::WeatherProvider,
    store::UserStore,
    telegram::{Message, Messenger, Reply, TelegramClient, Update, User},
};

pub mod command;
pub mod texts;

pub use command::Command;

/// Pause before polling again after a failed `getUpdates`.
const POLL_RETRY_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: Arc<dyn UserStore>,
    provider: Arc<dyn WeatherProvider>,
    messenger: Arc<dyn Messenger>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn UserStore>,
        provider: Arc<dyn WeatherProvider>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self { store, provider, messenger }
    }

    /// Long-poll `updates` forever, handling one update at a time in arrival order.
    pub async fn run(&self, updates: &TelegramClient, poll_timeout_secs: u64) {
        let mut offset = 0;

        loop {
            match updates.get_updates(offset, poll_timeout_secs).await {
                Ok(batch) => {
                    for update in batch {
                        offset = update.update_id + 1;
                        self.handle_update(update).await;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "failed to poll updates, retrying");
                    tokio::time::sleep(POLL_RETRY_PAUSE).await;
                }
            }
        }
    }

    pub async fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            debug!(update_id = update.update_id, "skipping update without message");
            return;
        };

        for reply in self.replies(&message).await {
            if let Err(err) = self.messenger.send_message(&reply).await {
                error!(chat_id = reply.chat_id, error = %err, "failed to send reply");
            }
        }
    }

    /// Replies to `message`, in sending order. Empty for anything that is not a command.
    pub async fn replies(&self, message: &Message) -> Vec<Reply> {
        let Some(text) = message.text.as_deref() else {
            return Vec::new();
        };
        let Some(command) = Command::parse(text) else {
            return Vec::new();
        };
        let Some(from) = message.from.as_ref() else {
            debug!(chat_id = message.chat.id, "ignoring command without sender");
            return Vec::new();
        };

        if let Err(err) = self.store.create_user(from.id).await {
            error!(user_id = from.id, error = %err, "failed to ensure user exists");
            return vec![Reply::to(message, texts::GENERIC_ERROR)];
        }

        let chat_id = message.chat.id;
        match command {
            Command::Start => vec![
                Reply::plain(chat_id, texts::welcome(from.display_name())),
                Reply::plain(chat_id, texts::HELP),
            ],
            Command::Help => vec![Reply::plain(chat_id, texts::HELP)],
            Command::City(city) => vec![self.set_city(message, from, &city).await],
            Command::Weather => vec![self.current_weather(message, from).await],
            Command::Unknown(_) => {
                info!(user = from.display_name(), text, "unknown command");
                vec![Reply::to(message, texts::UNKNOWN_COMMAND)]
            }
        }
    }

    async fn set_city(&self, message: &Message, from: &User, city: &str) -> Reply {
        if let Err(err) = self.store.update_city(from.id, city).await {
            error!(user_id = from.id, error = %err, "failed to update city");
            return Reply::to(message, texts::GENERIC_ERROR);
        }

        info!(user_id = from.id, city, "city saved");
        Reply::to(message, texts::city_saved(city))
    }

    async fn current_weather(&self, message: &Message, from: &User) -> Reply {
        let city = match self.store.get_user_city(from.id).await {
            Ok(city) => city,
            Err(err) => {
                error!(user_id = from.id, error = %err, "failed to read saved city");
                return Reply::to(message, texts::GENERIC_ERROR);
            }
        };

        if city.is_empty() {
            return Reply::to(message, texts::SET_CITY_FIRST);
        }

        let coordinates = match self.provider.coordinates(&city).await {
            Ok(coordinates) => coordinates,
            Err(err) => {
                error!(
                    user_id = from.id,
                    city,
                    status = ?err.status(),
                    error = %err,
                    "failed to get coordinates"
                );
                return Reply::to(message, texts::NO_COORDINATES);
            }
        };

        match self.provider.weather(coordinates).await {
            Ok(weather) => Reply::to(message, texts::weather_report(&weather)),
            Err(err) => {
                error!(
                    user_id = from.id,
                    city,
                    status = ?err.status(),
                    error = %err,
                    "failed to get weather"
                );
                Reply::to(message, texts::NO_WEATHER)
            }
        }
    }
}
