//! # dbot-telegram
//!
//! Telegram layer: adapters from teloxide updates to [`dbot_core::Event`], the teloxide-backed
//! [`dbot_core::Bot`] implementation, env config, the polling runner that feeds an
//! [`action_dispatch::ActionDispatcher`], and one-shot webhook registration.

mod adapters;
mod bot_adapter;
mod config;
mod runner;
mod webhook;

pub use adapters::{
    event_from_update, TelegramCallbackQueryWrapper, TelegramMessageWrapper,
    TelegramPreCheckoutQueryWrapper, TelegramUserWrapper,
};
pub use bot_adapter::TelegramBotAdapter;
pub use config::TelegramConfig;
pub use runner::run_polling;
pub use webhook::{register_webhook, webhook_url};
