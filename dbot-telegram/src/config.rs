//! Runtime config for the Telegram layer: token, API URL, logging, invoices, fan-out, webhook.
//! Loaded from env: BOT_TOKEN, TELEGRAM_API_URL / TELOXIDE_API_URL, LOG_FILE,
//! PAYMENT_PROVIDER_TOKEN, INVOICE_CURRENCY, INVOICE_START_PARAMETER, FAN_OUT_POLICY, WEBHOOK_URL.

use action_dispatch::{FanOutPolicy, InvoiceSettings};
use anyhow::Result;
use std::env;
use tracing::error;

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// BOT_TOKEN
    pub bot_token: String,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    pub log_file: String,
    /// PAYMENT_PROVIDER_TOKEN
    pub payment_provider_token: Option<String>,
    pub invoice_currency: String,
    pub invoice_start_parameter: String,
    /// Raw FAN_OUT_POLICY value; parsed in [`TelegramConfig::validate`].
    pub fan_out_policy: Option<String>,
    /// Public base URL for webhook registration.
    pub webhook_url: Option<String>,
}

impl TelegramConfig {
    /// Loads from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn from_env(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?,
        };
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/shop-bot.log".to_string());
        let defaults = InvoiceSettings::default();
        Ok(Self {
            bot_token,
            telegram_api_url,
            log_file,
            payment_provider_token: env::var("PAYMENT_PROVIDER_TOKEN").ok(),
            invoice_currency: env::var("INVOICE_CURRENCY").unwrap_or(defaults.currency),
            invoice_start_parameter: env::var("INVOICE_START_PARAMETER")
                .unwrap_or(defaults.start_parameter),
            fan_out_policy: env::var("FAN_OUT_POLICY").ok(),
            webhook_url: env::var("WEBHOOK_URL").ok(),
        })
    }

    /// Uses the given token; everything else takes its default.
    pub fn with_token(bot_token: String) -> Self {
        let defaults = InvoiceSettings::default();
        Self {
            bot_token,
            telegram_api_url: None,
            log_file: "logs/shop-bot.log".to_string(),
            payment_provider_token: None,
            invoice_currency: defaults.currency,
            invoice_start_parameter: defaults.start_parameter,
            fan_out_policy: None,
            webhook_url: None,
        }
    }

    /// Rejects a malformed API URL or an unknown fan-out policy.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        self.fan_out_policy()?;
        Ok(())
    }

    pub fn invoice_settings(&self) -> InvoiceSettings {
        InvoiceSettings {
            provider_token: self.payment_provider_token.clone(),
            currency: self.invoice_currency.clone(),
            start_parameter: self.invoice_start_parameter.clone(),
        }
    }

    /// Parsed FAN_OUT_POLICY; unset means the default policy.
    pub fn fan_out_policy(&self) -> Result<FanOutPolicy> {
        match &self.fan_out_policy {
            None => Ok(FanOutPolicy::default()),
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("FAN_OUT_POLICY has unknown value: {}", raw)),
        }
    }

    /// Builds the teloxide client, pointing it at a custom API URL when configured.
    pub fn build_bot(&self) -> teloxide::Bot {
        let bot = teloxide::Bot::new(self.bot_token.clone());
        match self.telegram_api_url {
            Some(ref url_str) => match reqwest::Url::parse(url_str) {
                Ok(url) => bot.set_api_url(url),
                Err(e) => {
                    error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                    bot
                }
            },
            None => bot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "BOT_TOKEN",
            "TELEGRAM_API_URL",
            "TELOXIDE_API_URL",
            "LOG_FILE",
            "PAYMENT_PROVIDER_TOKEN",
            "INVOICE_CURRENCY",
            "INVOICE_START_PARAMETER",
            "FAN_OUT_POLICY",
            "WEBHOOK_URL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_with_token() {
        let config = TelegramConfig::with_token("test_token".to_string());
        assert_eq!(config.bot_token, "test_token");
        assert!(config.telegram_api_url.is_none());
        assert_eq!(config.invoice_currency, "RUB");
        assert_eq!(config.invoice_start_parameter, "start123");
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        env::set_var("BOT_TOKEN", "env_token");

        let config = TelegramConfig::from_env(None).unwrap();

        assert_eq!(config.bot_token, "env_token");
        assert_eq!(config.log_file, "logs/shop-bot.log");
        assert!(config.payment_provider_token.is_none());
        assert_eq!(config.invoice_settings(), InvoiceSettings::default());
        assert_eq!(config.fan_out_policy().unwrap(), FanOutPolicy::AllOrNothing);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_env_custom_values() {
        clear_env();
        env::set_var("TELOXIDE_API_URL", "http://localhost:8081");
        env::set_var("PAYMENT_PROVIDER_TOKEN", "provider");
        env::set_var("INVOICE_CURRENCY", "USD");
        env::set_var("FAN_OUT_POLICY", "independent");

        let config = TelegramConfig::from_env(Some("cli_token".to_string())).unwrap();

        assert_eq!(config.bot_token, "cli_token");
        assert_eq!(config.telegram_api_url.as_deref(), Some("http://localhost:8081"));
        let invoice = config.invoice_settings();
        assert_eq!(invoice.provider_token.as_deref(), Some("provider"));
        assert_eq!(invoice.currency, "USD");
        assert_eq!(invoice.start_parameter, "start123");
        assert_eq!(config.fan_out_policy().unwrap(), FanOutPolicy::Independent);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_token_fails() {
        clear_env();
        assert!(TelegramConfig::from_env(None).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = TelegramConfig::with_token("t".to_string());
        config.telegram_api_url = Some("not a url".to_string());
        assert!(config.validate().is_err());

        let mut config = TelegramConfig::with_token("t".to_string());
        config.fan_out_policy = Some("sometimes".to_string());
        assert!(config.validate().is_err());
    }
}
