//! Wraps teloxide::Bot and implements [`dbot_core::Bot`]. Production code talks to Telegram;
//! tests substitute another Bot impl.

use async_trait::async_trait;
use dbot_core::{
    Bot as CoreBot, DbotError, Invoice, MessageOptions, MessageRef, PhotoOptions, Result,
};
use serde_json::Value;
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQueryId, ChatId, InlineKeyboardMarkup, InputFile, LabeledPrice, MessageId, ParseMode,
    PreCheckoutQueryId, ReplyMarkup,
};
use tracing::warn;

/// Thin wrapper around teloxide::Bot that implements dbot-core's Bot trait.
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

fn bot_error(e: teloxide::RequestError) -> DbotError {
    DbotError::Bot(e.to_string())
}

/// Maps a Bot API parse mode name; unknown names are dropped with a warning.
fn parse_mode(name: &str) -> Option<ParseMode> {
    match name {
        "HTML" | "Html" | "html" => Some(ParseMode::Html),
        "MarkdownV2" | "markdownv2" => Some(ParseMode::MarkdownV2),
        #[allow(deprecated)]
        "Markdown" | "markdown" => Some(ParseMode::Markdown),
        other => {
            warn!(parse_mode = %other, "Unknown parse mode ignored");
            None
        }
    }
}

fn reply_markup(value: &Value) -> Option<ReplyMarkup> {
    match serde_json::from_value(value.clone()) {
        Ok(markup) => Some(markup),
        Err(e) => {
            warn!(error = %e, "Invalid reply markup ignored");
            None
        }
    }
}

fn inline_keyboard(value: &Value) -> Option<InlineKeyboardMarkup> {
    match serde_json::from_value(value.clone()) {
        Ok(markup) => Some(markup),
        Err(e) => {
            warn!(error = %e, "Invalid inline keyboard ignored");
            None
        }
    }
}

/// Photos given as http(s) URLs are fetched by Telegram; anything else is treated as a file id.
fn input_file(image: &str) -> InputFile {
    if image.starts_with("http://") || image.starts_with("https://") {
        if let Ok(url) = reqwest::Url::parse(image) {
            return InputFile::url(url);
        }
    }
    InputFile::file_id(teloxide::types::FileId(image.to_string()))
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat_id: i64, text: &str, options: &MessageOptions) -> Result<()> {
        let mut request = self.bot.send_message(ChatId(chat_id), text.to_string());
        if let Some(mode) = options.parse_mode.as_deref().and_then(parse_mode) {
            request = request.parse_mode(mode);
        }
        if let Some(markup) = options.reply_markup.as_ref().and_then(reply_markup) {
            request = request.reply_markup(markup);
        }
        request.await.map_err(bot_error)?;
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, image: &str, options: &PhotoOptions) -> Result<()> {
        let mut request = self.bot.send_photo(ChatId(chat_id), input_file(image));
        if let Some(caption) = &options.caption {
            request = request.caption(caption.clone());
        }
        if let Some(mode) = options.parse_mode.as_deref().and_then(parse_mode) {
            request = request.parse_mode(mode);
        }
        if let Some(markup) = options.reply_markup.as_ref().and_then(reply_markup) {
            request = request.reply_markup(markup);
        }
        request.await.map_err(bot_error)?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<()> {
        self.bot
            .delete_message(ChatId(chat_id), MessageId(message_id))
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn send_invoice(&self, chat_id: i64, invoice: &Invoice) -> Result<()> {
        let prices: Vec<LabeledPrice> = invoice
            .prices
            .iter()
            .map(|p| LabeledPrice::new(p.label.clone(), p.amount))
            .collect();
        let mut request = self
            .bot
            .send_invoice(
                ChatId(chat_id),
                invoice.title.clone(),
                invoice.description.clone(),
                invoice.payload.clone(),
                invoice.currency.clone(),
                prices,
            )
            .start_parameter(invoice.start_parameter.clone());
        if let Some(token) = &invoice.provider_token {
            request = request.provider_token(token.clone());
        }
        if let Some(photo_url) = &invoice.photo_url {
            match reqwest::Url::parse(photo_url) {
                Ok(url) => request = request.photo_url(url),
                Err(e) => {
                    warn!(error = %e, photo_url = %photo_url, "Invalid invoice photo url ignored")
                }
            }
        }
        request.await.map_err(bot_error)?;
        Ok(())
    }

    async fn edit_message_text(
        &self,
        target: MessageRef,
        text: &str,
        options: &MessageOptions,
    ) -> Result<()> {
        let mut request = self.bot.edit_message_text(
            ChatId(target.chat_id),
            MessageId(target.message_id),
            text.to_string(),
        );
        if let Some(mode) = options.parse_mode.as_deref().and_then(parse_mode) {
            request = request.parse_mode(mode);
        }
        if let Some(markup) = options.reply_markup.as_ref().and_then(inline_keyboard) {
            request = request.reply_markup(markup);
        }
        request.await.map_err(bot_error)?;
        Ok(())
    }

    async fn edit_message_reply_markup(
        &self,
        target: MessageRef,
        reply_markup: Option<&Value>,
    ) -> Result<()> {
        let mut request = self
            .bot
            .edit_message_reply_markup(ChatId(target.chat_id), MessageId(target.message_id));
        if let Some(markup) = reply_markup.and_then(inline_keyboard) {
            request = request.reply_markup(markup);
        }
        request.await.map_err(bot_error)?;
        Ok(())
    }

    async fn answer_callback_query(&self, query_id: &str) -> Result<()> {
        self.bot
            .answer_callback_query(CallbackQueryId(query_id.to_string()))
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn answer_pre_checkout_query(&self, query_id: &str, ok: bool) -> Result<()> {
        self.bot
            .answer_pre_checkout_query(PreCheckoutQueryId(query_id.to_string()), ok)
            .await
            .map_err(bot_error)?;
        Ok(())
    }
}
