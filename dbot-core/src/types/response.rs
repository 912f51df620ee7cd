//! Response descriptors: what a handler asks the bot to do after handling an event.
//!
//! Descriptors (de)serialize with the JSON shape
//! `{"type": "message", "text": "...", "timeout": 500}`;
//! an unrecognised `type` becomes [`ResponseKind::Unknown`] and is ignored downstream.

use std::time::Duration;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Numeric field as handlers produce it: integer, float or numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Loose {
    /// Integer part, reading a string up to its first non-digit (`"150 RUB"` is 150).
    fn integer(self) -> Option<i64> {
        match self {
            Loose::Int(n) => Some(n),
            Loose::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Loose::Float(_) => None,
            Loose::Text(text) => {
                let text = text.trim();
                let (sign, digits) = match text.strip_prefix('-') {
                    Some(rest) => (-1, rest),
                    None => (1, text.strip_prefix('+').unwrap_or(text)),
                };
                let end = digits
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(digits.len());
                digits[..end].parse::<i64>().ok().map(|n| sign * n)
            }
        }
    }
}

fn lenient_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Loose::deserialize(deserializer)?
        .integer()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| de::Error::custom("price must be a non-negative integer"))
}

/// Missing, null, zero or negative timeouts all mean "run immediately".
fn lenient_timeout<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    match Option::<Loose>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => raw
            .integer()
            .map(|n| u64::try_from(n).ok().filter(|ms| *ms > 0))
            .ok_or_else(|| de::Error::custom("timeout must be a number of milliseconds")),
    }
}

/// One invoice line item. `price` is in major currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceItem {
    pub caption: String,
    #[serde(deserialize_with = "lenient_price")]
    pub price: u32,
}

impl PriceItem {
    pub fn new(caption: impl Into<String>, price: u32) -> Self {
        Self {
            caption: caption.into(),
            price,
        }
    }
}

/// Type-specific part of a [`Response`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResponseKind {
    /// Text message to the sender.
    Message {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parse_mode: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reply_markup: Option<Value>,
    },
    /// Photo to the sender; `image` is a URL or a platform file id.
    Photo {
        image: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parse_mode: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reply_markup: Option<Value>,
    },
    /// Delete the originating message.
    DeleteMessage,
    /// Invoice to the originating chat.
    Invoice {
        title: String,
        description: String,
        payload: String,
        prices: Vec<PriceItem>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        photo_url: Option<String>,
    },
    /// Replace text (and optionally markup) of the originating message.
    EditMessageText {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parse_mode: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reply_markup: Option<Value>,
    },
    /// Replace the inline keyboard of the originating message; `None` removes it.
    EditMessageReplyMarkup {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reply_markup: Option<Value>,
    },
    #[serde(other)]
    Unknown,
}

/// A single outbound instruction, optionally deferred by `timeout` milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(
        default,
        deserialize_with = "lenient_timeout",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<u64>,
    #[serde(flatten)]
    pub kind: ResponseKind,
}

impl From<ResponseKind> for Response {
    fn from(kind: ResponseKind) -> Self {
        Self {
            timeout: None,
            kind,
        }
    }
}

impl Response {
    pub fn message(text: impl Into<String>) -> Self {
        ResponseKind::Message {
            text: text.into(),
            parse_mode: None,
            reply_markup: None,
        }
        .into()
    }

    pub fn photo(image: impl Into<String>) -> Self {
        ResponseKind::Photo {
            image: image.into(),
            caption: None,
            parse_mode: None,
            reply_markup: None,
        }
        .into()
    }

    pub fn delete_message() -> Self {
        ResponseKind::DeleteMessage.into()
    }

    pub fn invoice(
        title: impl Into<String>,
        description: impl Into<String>,
        payload: impl Into<String>,
        prices: Vec<PriceItem>,
    ) -> Self {
        ResponseKind::Invoice {
            title: title.into(),
            description: description.into(),
            payload: payload.into(),
            prices,
            photo_url: None,
        }
        .into()
    }

    pub fn edit_message_text(text: impl Into<String>) -> Self {
        ResponseKind::EditMessageText {
            text: text.into(),
            parse_mode: None,
            reply_markup: None,
        }
        .into()
    }

    pub fn edit_message_reply_markup(reply_markup: Option<Value>) -> Self {
        ResponseKind::EditMessageReplyMarkup { reply_markup }.into()
    }

    /// Sets the parse mode on message, photo and edit-text descriptors; no-op on others.
    pub fn with_parse_mode(mut self, mode: impl Into<String>) -> Self {
        match &mut self.kind {
            ResponseKind::Message { parse_mode, .. }
            | ResponseKind::Photo { parse_mode, .. }
            | ResponseKind::EditMessageText { parse_mode, .. } => *parse_mode = Some(mode.into()),
            _ => {}
        }
        self
    }

    /// Sets the reply markup on descriptors that carry one; no-op on others.
    pub fn with_reply_markup(mut self, markup: Value) -> Self {
        match &mut self.kind {
            ResponseKind::Message { reply_markup, .. }
            | ResponseKind::Photo { reply_markup, .. }
            | ResponseKind::EditMessageText { reply_markup, .. }
            | ResponseKind::EditMessageReplyMarkup { reply_markup } => *reply_markup = Some(markup),
            _ => {}
        }
        self
    }

    pub fn with_caption(mut self, text: impl Into<String>) -> Self {
        if let ResponseKind::Photo { caption, .. } = &mut self.kind {
            *caption = Some(text.into());
        }
        self
    }

    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        if let ResponseKind::Invoice { photo_url, .. } = &mut self.kind {
            *photo_url = Some(url.into());
        }
        self
    }

    /// Defers execution by `millis` milliseconds.
    pub fn with_timeout(mut self, millis: u64) -> Self {
        self.timeout = Some(millis);
        self
    }

    /// Delay before execution; `None` for absent or zero timeouts.
    pub fn delay(&self) -> Option<Duration> {
        self.timeout
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Wire name of the descriptor type, for logs.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ResponseKind::Message { .. } => "message",
            ResponseKind::Photo { .. } => "photo",
            ResponseKind::DeleteMessage => "deleteMessage",
            ResponseKind::Invoice { .. } => "invoice",
            ResponseKind::EditMessageText { .. } => "editMessageText",
            ResponseKind::EditMessageReplyMarkup { .. } => "editMessageReplyMarkup",
            ResponseKind::Unknown => "unknown",
        }
    }
}
