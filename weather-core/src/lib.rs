//! Core library for the `weather-bot` Telegram bot.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider client
//! - Per-user city storage (SQLite)
//! - A minimal Telegram Bot API client
//! - The command dispatcher tying them together
//!
//! It is used by `weather-bot`, but can also be reused by other binaries or services.

pub mod bot;
pub mod config;
pub mod model;
pub mod provider;
pub mod store;
pub mod telegram;

pub use bot::{Command, Dispatcher};
pub use config::Config;
pub use model::{Coordinates, User, WeatherSnapshot};
pub use provider::{ProviderError, WeatherProvider};
pub use store::{SqliteUserStore, StoreError, UserStore};
pub use telegram::{Messenger, TelegramClient, TelegramError};
