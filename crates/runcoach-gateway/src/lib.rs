//! Runcoach Gateway - Telegram transport, routing, and the bot service

pub mod bot;
pub mod config;
pub mod router;
pub mod server;
pub mod telegram;

pub use bot::{Bot, MessageHandler};
pub use config::{RuncoachConfig, Secrets};
pub use router::{Command, Route, Router};
pub use server::start_bot;
pub use telegram::TelegramClient;
