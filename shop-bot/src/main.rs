//! shop-bot CLI: run the bot or register its webhook. Config from env and optional CLI args.

use anyhow::Result;
use clap::Parser;
use dbot_telegram::TelegramConfig;
use shop_bot::{run_bot, set_webhook, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => run_bot(TelegramConfig::from_env(token)?).await,
        Commands::SetWebhook { url, token } => {
            set_webhook(TelegramConfig::from_env(token)?, url).await
        }
    }
}
