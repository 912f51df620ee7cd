//! Inbound events: messages (text, contact, photo, successful payment), callback queries and
//! pre-checkout queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{chat::Chat, user::User};

/// Address of an already-sent message (chat + message id); target of edits and deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

/// Shared contact card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub phone_number: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub user_id: Option<i64>,
}

/// One size variant of a sent photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub file_unique_id: String,
    pub width: u32,
    pub height: u32,
    pub file_size: u32,
}

/// Payment confirmation attached to a service message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessfulPayment {
    pub currency: String,
    /// Total in minor currency units.
    pub total_amount: u32,
    pub invoice_payload: String,
}

/// A message delivered to the bot. At most one of `text`, `contact`, `photo`,
/// `successful_payment` is normally set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: i32,
    pub from: User,
    pub chat: Chat,
    pub text: Option<String>,
    pub contact: Option<Contact>,
    /// Photo size variants; empty when the message carries no photo.
    pub photo: Vec<PhotoSize>,
    pub successful_payment: Option<SuccessfulPayment>,
    pub created_at: DateTime<Utc>,
}

impl InboundMessage {
    /// Plain text message from `from` in `chat`.
    pub fn text(id: i32, from: User, chat: Chat, text: impl Into<String>) -> Self {
        Self {
            id,
            from,
            chat,
            text: Some(text.into()),
            contact: None,
            photo: Vec::new(),
            successful_payment: None,
            created_at: Utc::now(),
        }
    }

    /// Message with no content; callers fill the payload field they need.
    pub fn empty(id: i32, from: User, chat: Chat) -> Self {
        Self {
            id,
            from,
            chat,
            text: None,
            contact: None,
            photo: Vec::new(),
            successful_payment: None,
            created_at: Utc::now(),
        }
    }

    /// Reference to this message.
    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            chat_id: self.chat.id,
            message_id: self.id,
        }
    }
}

/// Press of an inline keyboard button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// Message the pressed keyboard is attached to, if still known to the platform.
    pub message: Option<MessageRef>,
    pub data: Option<String>,
}

/// Checkout confirmation request that must be answered before a payment goes through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreCheckoutQuery {
    pub id: String,
    pub from: User,
    pub currency: String,
    pub total_amount: u32,
    pub invoice_payload: String,
}

/// Any inbound platform event the dispatcher understands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Message(InboundMessage),
    CallbackQuery(CallbackQuery),
    PreCheckoutQuery(PreCheckoutQuery),
}

impl Event {
    /// Sender of the event (the principal handed to user resolution).
    pub fn sender(&self) -> &User {
        match self {
            Event::Message(m) => &m.from,
            Event::CallbackQuery(q) => &q.from,
            Event::PreCheckoutQuery(q) => &q.from,
        }
    }

    /// Chat the event itself was posted in; only messages carry one.
    pub fn chat_id(&self) -> Option<i64> {
        match self {
            Event::Message(m) => Some(m.chat.id),
            _ => None,
        }
    }

    /// Message the event originates from: the inbound message itself, or the message a callback
    /// keyboard is attached to.
    pub fn origin_message(&self) -> Option<MessageRef> {
        match self {
            Event::Message(m) => Some(m.message_ref()),
            Event::CallbackQuery(q) => q.message,
            Event::PreCheckoutQuery(_) => None,
        }
    }

    pub fn as_message(&self) -> Option<&InboundMessage> {
        match self {
            Event::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Short name for logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Event::Message(_) => "message",
            Event::CallbackQuery(_) => "callback_query",
            Event::PreCheckoutQuery(_) => "pre_checkout_query",
        }
    }
}
