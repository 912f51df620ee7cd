//! One-shot webhook registration with Telegram.

use anyhow::{Context, Result};
use teloxide::prelude::*;
use tracing::{info, instrument};

/// Webhook endpoint for `token` under `base_url`: `{base_url}/bot{token}`.
pub fn webhook_url(base_url: &str, token: &str) -> Result<reqwest::Url> {
    let raw = format!("{}/bot{}", base_url.trim_end_matches('/'), token);
    reqwest::Url::parse(&raw).with_context(|| format!("Invalid webhook base url: {}", base_url))
}

/// Points Telegram at the bot's webhook endpoint.
#[instrument(skip(bot, token))]
pub async fn register_webhook(bot: &teloxide::Bot, base_url: &str, token: &str) -> Result<()> {
    let url = webhook_url(base_url, token)?;
    bot.set_webhook(url).await?;
    info!(base_url = %base_url, "Webhook registered");
    Ok(())
}
