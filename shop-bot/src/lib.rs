//! # shop-bot
//!
//! Demo shop on top of action-dispatch: catalog browsing, invoices, payments, feedback.

pub mod cli;
pub mod controllers;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use action_dispatch::{ActionDispatcher, ActionRegistry};
use anyhow::{Context, Result};
use dbot_core::{init_tracing, Bot};
use dbot_telegram::{register_webhook, run_polling, TelegramBotAdapter, TelegramConfig};
use tracing::{info, instrument};

use crate::controllers::CONTROLLERS;
use crate::services::{InMemoryUsers, ShopServices};

pub use cli::{Cli, Commands};

/// Builds the dispatcher for the given services, users and outbound bot.
pub fn build_dispatcher(
    config: &TelegramConfig,
    services: &ShopServices,
    users: Arc<InMemoryUsers>,
    bot: Arc<dyn Bot>,
) -> Result<ActionDispatcher<InMemoryUsers>> {
    let registry = ActionRegistry::from_controllers(services, CONTROLLERS);
    info!(actions = registry.len(), "Actions registered");
    Ok(ActionDispatcher::new(registry, users, bot)
        .with_fan_out_policy(config.fan_out_policy()?)
        .with_invoice_settings(config.invoice_settings()))
}

fn prepare_logging(config: &TelegramConfig) -> Result<()> {
    if let Some(dir) = Path::new(&config.log_file).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).context("Failed to create logs directory")?;
        }
    }
    init_tracing(Some(&config.log_file))
}

/// Main entry: init logging, validate config, register actions, then poll.
#[instrument(skip(config))]
pub async fn run_bot(config: TelegramConfig) -> Result<()> {
    config.validate()?;
    prepare_logging(&config)?;

    let admin_ids = std::env::var("ADMIN_IDS")
        .map(|raw| InMemoryUsers::parse_admin_ids(&raw))
        .unwrap_or_default();
    info!(admins = admin_ids.len(), "Initializing bot");

    let teloxide_bot = config.build_bot();
    let bot: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));
    let dispatcher = build_dispatcher(
        &config,
        &ShopServices::default(),
        Arc::new(InMemoryUsers::new(admin_ids)),
        bot,
    )?;

    run_polling(teloxide_bot, dispatcher).await
}

/// Registers the webhook; `url` overrides WEBHOOK_URL.
pub async fn set_webhook(config: TelegramConfig, url: Option<String>) -> Result<()> {
    config.validate()?;
    let base_url = url
        .or_else(|| config.webhook_url.clone())
        .context("WEBHOOK_URL not set and no --url given")?;
    register_webhook(&config.build_bot(), &base_url, &config.bot_token).await
}
