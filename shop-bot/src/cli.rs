//! CLI parser.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "shop-bot")]
#[command(about = "Telegram shop bot: run, set-webhook", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot with long polling (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Register the webhook with Telegram; url overrides WEBHOOK_URL.
    SetWebhook {
        #[arg(short, long)]
        url: Option<String>,
        #[arg(short, long)]
        token: Option<String>,
    },
}
