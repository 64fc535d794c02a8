use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use weather_core::{
    Config, Dispatcher, SqliteUserStore, TelegramClient, WeatherProvider, bot::texts,
    provider::provider_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-bot", version, about = "Telegram weather bot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the bot and serve updates until Ctrl-C.
    Run,

    /// Interactively set the bot token, API key and database location.
    Configure,

    /// Print the current weather for a city without going through Telegram.
    Show {
        /// City name, as it would be given to `/city`.
        city: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Run => run_bot(load_config()?).await,
            Command::Configure => configure(),
            Command::Show { city } => show(load_config()?, &city).await,
        }
    }
}

/// Config file values, overridden by the environment.
fn load_config() -> anyhow::Result<Config> {
    let mut cfg = Config::load()?;
    cfg.apply_env();
    Ok(cfg)
}

async fn run_bot(cfg: Config) -> anyhow::Result<()> {
    let token = cfg.require_bot_token()?;
    let provider: Arc<dyn WeatherProvider> = Arc::from(provider_from_config(&cfg)?);

    let store = SqliteUserStore::connect(&cfg.database.url)
        .await
        .with_context(|| format!("Failed to open database {}", cfg.database.url))?;

    let telegram = TelegramClient::new(token);
    let me = telegram.get_me().await.context("Failed to authorize with Telegram")?;
    info!(account = me.display_name(), "authorized on account");

    let dispatcher = Dispatcher::new(Arc::new(store), provider, Arc::new(telegram.clone()));

    tokio::select! {
        _ = dispatcher.run(&telegram, cfg.telegram.poll_timeout_secs) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            info!("shutting down");
        }
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let token = inquire::Password::new("Telegram bot token (empty keeps current):")
        .without_confirmation()
        .prompt()
        .context("Failed to read bot token")?;
    if !token.trim().is_empty() {
        cfg.telegram.bot_token = Some(token.trim().to_string());
    }

    let api_key = inquire::Password::new("OpenWeather API key (empty keeps current):")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        cfg.openweather.api_key = Some(api_key.trim().to_string());
    }

    let current_url = cfg.database.url.clone();
    cfg.database.url = inquire::Text::new("Database URL:")
        .with_default(&current_url)
        .prompt()
        .context("Failed to read database URL")?;

    cfg.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn show(cfg: Config, city: &str) -> anyhow::Result<()> {
    let provider = provider_from_config(&cfg)?;

    let coordinates = provider
        .coordinates(city)
        .await
        .with_context(|| format!("Failed to resolve '{city}'"))?;
    let weather = provider.weather(coordinates).await?;

    println!("{}", texts::weather_report(&weather));
    Ok(())
}
