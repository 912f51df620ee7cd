//! Outbound platform surface.
//!
//! [`Bot`] is transport-agnostic; dbot-telegram implements it over teloxide and tests substitute a
//! recording mock.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::MessageRef;

/// Options shared by text sends and text edits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageOptions {
    pub parse_mode: Option<String>,
    /// Raw reply markup (inline keyboard, reply keyboard, ...) in platform JSON shape.
    pub reply_markup: Option<Value>,
}

/// Extras for a photo send.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoOptions {
    pub caption: Option<String>,
    pub parse_mode: Option<String>,
    pub reply_markup: Option<Value>,
}

/// Invoice line item in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledPrice {
    pub label: String,
    pub amount: u32,
}

/// Fully resolved invoice request.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub title: String,
    pub description: String,
    /// Opaque payload echoed back in the successful payment.
    pub payload: String,
    pub provider_token: Option<String>,
    pub start_parameter: String,
    pub currency: String,
    pub prices: Vec<LabeledPrice>,
    pub photo_url: Option<String>,
}

/// Abstraction over the messaging platform's outbound calls.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat; a user id addresses the private chat with that user.
    async fn send_message(&self, chat_id: i64, text: &str, options: &MessageOptions) -> Result<()>;
    /// Sends a photo by URL or platform file id.
    async fn send_photo(&self, chat_id: i64, image: &str, options: &PhotoOptions) -> Result<()>;
    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<()>;
    async fn send_invoice(&self, chat_id: i64, invoice: &Invoice) -> Result<()>;
    async fn edit_message_text(
        &self,
        target: MessageRef,
        text: &str,
        options: &MessageOptions,
    ) -> Result<()>;
    /// Replaces the inline keyboard of `target`; `None` removes it.
    async fn edit_message_reply_markup(
        &self,
        target: MessageRef,
        reply_markup: Option<&Value>,
    ) -> Result<()>;
    /// Acknowledges a callback query so the client stops showing a loading state.
    async fn answer_callback_query(&self, query_id: &str) -> Result<()>;
    async fn answer_pre_checkout_query(&self, query_id: &str, ok: bool) -> Result<()>;
}
