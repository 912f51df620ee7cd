//! Adapters from Telegram (teloxide) types to dbot_core types.
//! Depends only on teloxide and dbot_core type definitions.

use dbot_core::{
    CallbackQuery, Chat, Contact, Event, InboundMessage, MessageRef, PhotoSize, PreCheckoutQuery,
    SuccessfulPayment, ToCoreEvent, ToCoreUser, User,
};
use teloxide::types::{Update, UpdateKind};

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

/// Sender placeholder for messages without `from` (channel posts).
fn anonymous() -> User {
    User {
        id: 0,
        username: None,
        first_name: None,
        last_name: None,
    }
}

/// Wraps a teloxide Message for conversion to a core [`Event::Message`].
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> TelegramMessageWrapper<'a> {
    /// Converts to the core message without wrapping it in an event.
    pub fn to_inbound(&self) -> InboundMessage {
        let msg = self.0;
        InboundMessage {
            id: msg.id.0,
            from: msg
                .from
                .as_ref()
                .map(|u| TelegramUserWrapper(u).to_core())
                .unwrap_or_else(anonymous),
            chat: Chat {
                id: msg.chat.id.0,
                chat_type: self.chat_type().to_string(),
            },
            text: msg.text().map(str::to_string),
            contact: msg.contact().map(|c| Contact {
                phone_number: c.phone_number.clone(),
                first_name: c.first_name.clone(),
                last_name: c.last_name.clone(),
                user_id: c.user_id.map(|id| id.0 as i64),
            }),
            photo: msg
                .photo()
                .map(|sizes| {
                    sizes
                        .iter()
                        .map(|p| PhotoSize {
                            file_id: p.file.id.0.clone(),
                            file_unique_id: p.file.unique_id.0.clone(),
                            width: p.width,
                            height: p.height,
                            file_size: p.file.size,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            successful_payment: msg.successful_payment().map(|p| SuccessfulPayment {
                currency: p.currency.clone(),
                total_amount: p.total_amount,
                invoice_payload: p.invoice_payload.clone(),
            }),
            created_at: msg.date,
        }
    }

    fn chat_type(&self) -> &'static str {
        let chat = &self.0.chat;
        if chat.is_private() {
            "private"
        } else if chat.is_group() {
            "group"
        } else if chat.is_supergroup() {
            "supergroup"
        } else {
            "channel"
        }
    }
}

impl<'a> ToCoreEvent for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Event {
        Event::Message(self.to_inbound())
    }
}

/// Wraps a teloxide CallbackQuery for conversion to a core [`Event::CallbackQuery`].
pub struct TelegramCallbackQueryWrapper<'a>(pub &'a teloxide::types::CallbackQuery);

impl<'a> ToCoreEvent for TelegramCallbackQueryWrapper<'a> {
    fn to_core(&self) -> Event {
        let q = self.0;
        Event::CallbackQuery(CallbackQuery {
            id: q.id.to_string(),
            from: TelegramUserWrapper(&q.from).to_core(),
            message: q.message.as_ref().map(|m| MessageRef {
                chat_id: m.chat().id.0,
                message_id: m.id().0,
            }),
            data: q.data.clone(),
        })
    }
}

/// Wraps a teloxide PreCheckoutQuery for conversion to a core [`Event::PreCheckoutQuery`].
pub struct TelegramPreCheckoutQueryWrapper<'a>(pub &'a teloxide::types::PreCheckoutQuery);

impl<'a> ToCoreEvent for TelegramPreCheckoutQueryWrapper<'a> {
    fn to_core(&self) -> Event {
        let q = self.0;
        Event::PreCheckoutQuery(PreCheckoutQuery {
            id: q.id.to_string(),
            from: TelegramUserWrapper(&q.from).to_core(),
            currency: q.currency.clone(),
            total_amount: q.total_amount,
            invoice_payload: q.invoice_payload.clone(),
        })
    }
}

/// Converts the update kinds the dispatcher routes; everything else yields `None`.
pub fn event_from_update(update: &Update) -> Option<Event> {
    match &update.kind {
        UpdateKind::Message(msg) => Some(TelegramMessageWrapper(msg).to_core()),
        UpdateKind::CallbackQuery(q) => Some(TelegramCallbackQueryWrapper(q).to_core()),
        UpdateKind::PreCheckoutQuery(q) => Some(TelegramPreCheckoutQueryWrapper(q).to_core()),
        _ => None,
    }
}
