//! Response interpreter: turns handler output into platform calls.
//!
//! Immediate descriptors are executed in sequence order; descriptors with a positive `timeout`
//! are moved into a one-shot timer task and do not hold up their siblings. Targets are resolved
//! from the originating event once, before anything is issued, so deferred calls see the same
//! chat and message as immediate ones. Platform failures are logged, never returned.

use std::sync::Arc;

use dbot_core::{
    Bot, Event, Invoice, LabeledPrice, MessageOptions, MessageRef, PhotoOptions, PriceItem,
    Response, ResponseKind, Result,
};
use tracing::{debug, info, warn};

/// Invoice constants not carried by descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceSettings {
    pub provider_token: Option<String>,
    pub currency: String,
    pub start_parameter: String,
}

impl Default for InvoiceSettings {
    fn default() -> Self {
        Self {
            provider_token: None,
            currency: "RUB".to_string(),
            start_parameter: "start123".to_string(),
        }
    }
}

/// Addressing snapshot of the originating event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseTarget {
    pub sender_id: i64,
    pub chat_id: Option<i64>,
    pub message: Option<MessageRef>,
}

impl ResponseTarget {
    pub fn from_event(event: &Event) -> Self {
        Self {
            sender_id: event.sender().id,
            chat_id: event.chat_id(),
            message: event.origin_message(),
        }
    }

    /// Chat of the originating message if there is one, else the event's own chat.
    pub fn invoice_chat(&self) -> Option<i64> {
        self.message.map(|m| m.chat_id).or(self.chat_id)
    }
}

/// Converts line items to minor units (`price * 100`); also returns the major-unit total.
pub fn labeled_prices(items: &[PriceItem]) -> (Vec<LabeledPrice>, u64) {
    let mut total = 0u64;
    let prices = items
        .iter()
        .map(|item| {
            total += u64::from(item.price);
            LabeledPrice {
                label: item.caption.clone(),
                amount: item.price.saturating_mul(100),
            }
        })
        .collect();
    (prices, total)
}

/// Executes response descriptors against a [`Bot`].
#[derive(Clone)]
pub struct ResponseInterpreter {
    bot: Arc<dyn Bot>,
    invoice: InvoiceSettings,
}

impl ResponseInterpreter {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self {
            bot,
            invoice: InvoiceSettings::default(),
        }
    }

    pub fn with_invoice_settings(mut self, invoice: InvoiceSettings) -> Self {
        self.invoice = invoice;
        self
    }

    pub fn bot(&self) -> &Arc<dyn Bot> {
        &self.bot
    }

    /// Issues every descriptor for `event`. Returns once the immediate ones are done; deferred
    /// ones keep running on their own timers.
    pub async fn interpret(&self, event: &Event, responses: Vec<Response>) {
        if responses.is_empty() {
            return;
        }
        let target = ResponseTarget::from_event(event);

        for response in responses {
            match response.delay() {
                Some(delay) => {
                    debug!(
                        response_type = response.type_name(),
                        delay_ms = delay.as_millis() as u64,
                        "step: response deferred"
                    );
                    let interpreter = self.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        interpreter.run(&target, &response).await;
                    });
                }
                None => self.run(&target, &response).await,
            }
        }
    }

    async fn run(&self, target: &ResponseTarget, response: &Response) {
        if let Err(e) = self.execute(target, &response.kind).await {
            warn!(
                response_type = response.type_name(),
                sender_id = target.sender_id,
                error = %e,
                "Platform call failed"
            );
        }
    }

    async fn execute(&self, target: &ResponseTarget, kind: &ResponseKind) -> Result<()> {
        match kind {
            ResponseKind::Message {
                text,
                parse_mode,
                reply_markup,
            } => {
                let options = MessageOptions {
                    parse_mode: parse_mode.clone(),
                    reply_markup: reply_markup.clone(),
                };
                self.bot
                    .send_message(target.sender_id, text, &options)
                    .await
            }
            ResponseKind::Photo {
                image,
                caption,
                parse_mode,
                reply_markup,
            } => {
                let options = PhotoOptions {
                    caption: caption.clone(),
                    parse_mode: parse_mode.clone(),
                    reply_markup: reply_markup.clone(),
                };
                self.bot.send_photo(target.sender_id, image, &options).await
            }
            ResponseKind::DeleteMessage => {
                let Some(message) = target.message else {
                    warn!("deleteMessage without originating message, skipped");
                    return Ok(());
                };
                self.bot
                    .delete_message(target.sender_id, message.message_id)
                    .await
            }
            ResponseKind::Invoice {
                title,
                description,
                payload,
                prices,
                photo_url,
            } => {
                let Some(chat_id) = target.invoice_chat() else {
                    warn!("invoice without target chat, skipped");
                    return Ok(());
                };
                let (prices, total) = labeled_prices(prices);
                info!(chat_id = chat_id, total = total, "step: sending invoice");
                let invoice = Invoice {
                    title: title.clone(),
                    description: description.clone(),
                    payload: payload.clone(),
                    provider_token: self.invoice.provider_token.clone(),
                    start_parameter: self.invoice.start_parameter.clone(),
                    currency: self.invoice.currency.clone(),
                    prices,
                    photo_url: photo_url.clone(),
                };
                self.bot.send_invoice(chat_id, &invoice).await
            }
            ResponseKind::EditMessageText {
                text,
                parse_mode,
                reply_markup,
            } => {
                let Some(message) = target.message else {
                    warn!("editMessageText without originating message, skipped");
                    return Ok(());
                };
                let options = MessageOptions {
                    parse_mode: parse_mode.clone(),
                    reply_markup: reply_markup.clone(),
                };
                self.bot.edit_message_text(message, text, &options).await
            }
            ResponseKind::EditMessageReplyMarkup { reply_markup } => {
                let Some(message) = target.message else {
                    warn!("editMessageReplyMarkup without originating message, skipped");
                    return Ok(());
                };
                self.bot
                    .edit_message_reply_markup(message, reply_markup.as_ref())
                    .await
            }
            ResponseKind::Unknown => {
                debug!("Ignoring response of unknown type");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbot_core::{CallbackQuery, Chat, InboundMessage, PreCheckoutQuery, User};

    fn sender() -> User {
        User {
            id: 10,
            username: None,
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn test_labeled_prices_convert_to_minor_units() {
        let (prices, total) =
            labeled_prices(&[PriceItem::new("Tea", 150), PriceItem::new("Cake", 3)]);
        assert_eq!(
            prices,
            vec![
                LabeledPrice {
                    label: "Tea".to_string(),
                    amount: 15000
                },
                LabeledPrice {
                    label: "Cake".to_string(),
                    amount: 300
                },
            ]
        );
        assert_eq!(total, 153);
    }

    #[test]
    fn test_invoice_chat_prefers_originating_message() {
        let callback = Event::CallbackQuery(CallbackQuery {
            id: "q".to_string(),
            from: sender(),
            message: Some(MessageRef {
                chat_id: -500,
                message_id: 3,
            }),
            data: None,
        });
        assert_eq!(ResponseTarget::from_event(&callback).invoice_chat(), Some(-500));

        let message = Event::Message(InboundMessage::text(
            4,
            sender(),
            Chat {
                id: 77,
                chat_type: "private".to_string(),
            },
            "hi",
        ));
        let target = ResponseTarget::from_event(&message);
        assert_eq!(target.invoice_chat(), Some(77));
        assert_eq!(target.sender_id, 10);

        let checkout = Event::PreCheckoutQuery(PreCheckoutQuery {
            id: "p".to_string(),
            from: sender(),
            currency: "RUB".to_string(),
            total_amount: 100,
            invoice_payload: "x".to_string(),
        });
        assert_eq!(ResponseTarget::from_event(&checkout).invoice_chat(), None);
    }
}
