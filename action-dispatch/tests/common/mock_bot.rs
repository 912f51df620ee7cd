//! Recording implementation of [`dbot_core::Bot`] for integration tests.
//!
//! Every outbound call is pushed as a [`BotCall`] into an unbounded channel so tests can assert
//! on exactly what reached the platform, and in which order.

use async_trait::async_trait;
use dbot_core::{
    Bot, DbotError, Invoice, MessageOptions, MessageRef, PhotoOptions, Result,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

/// One recorded outbound call.
#[derive(Debug, Clone, PartialEq)]
pub enum BotCall {
    SendMessage {
        chat_id: i64,
        text: String,
        options: MessageOptions,
    },
    SendPhoto {
        chat_id: i64,
        image: String,
        options: PhotoOptions,
    },
    DeleteMessage {
        chat_id: i64,
        message_id: i32,
    },
    SendInvoice {
        chat_id: i64,
        invoice: Invoice,
    },
    EditMessageText {
        target: MessageRef,
        text: String,
        options: MessageOptions,
    },
    EditMessageReplyMarkup {
        target: MessageRef,
        reply_markup: Option<Value>,
    },
    AnswerCallbackQuery {
        query_id: String,
    },
    AnswerPreCheckoutQuery {
        query_id: String,
        ok: bool,
    },
}

/// Mock Bot that records every call. With `fail_sends` set, `send_message` records the call and
/// then returns an error.
pub struct MockBot {
    tx: mpsc::UnboundedSender<BotCall>,
    fail_sends: bool,
}

impl MockBot {
    /// Creates a MockBot and returns the receiver for recorded calls.
    pub fn with_receiver() -> (Arc<Self>, mpsc::UnboundedReceiver<BotCall>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                tx,
                fail_sends: false,
            }),
            rx,
        )
    }

    /// Same as [`MockBot::with_receiver`] but `send_message` fails after recording.
    #[allow(dead_code)]
    pub fn failing_sends() -> (Arc<Self>, mpsc::UnboundedReceiver<BotCall>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                tx,
                fail_sends: true,
            }),
            rx,
        )
    }

    fn record(&self, call: BotCall) {
        let _ = self.tx.send(call);
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, chat_id: i64, text: &str, options: &MessageOptions) -> Result<()> {
        self.record(BotCall::SendMessage {
            chat_id,
            text: text.to_string(),
            options: options.clone(),
        });
        if self.fail_sends {
            return Err(DbotError::Bot("network unreachable".to_string()));
        }
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, image: &str, options: &PhotoOptions) -> Result<()> {
        self.record(BotCall::SendPhoto {
            chat_id,
            image: image.to_string(),
            options: options.clone(),
        });
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<()> {
        self.record(BotCall::DeleteMessage {
            chat_id,
            message_id,
        });
        Ok(())
    }

    async fn send_invoice(&self, chat_id: i64, invoice: &Invoice) -> Result<()> {
        self.record(BotCall::SendInvoice {
            chat_id,
            invoice: invoice.clone(),
        });
        Ok(())
    }

    async fn edit_message_text(
        &self,
        target: MessageRef,
        text: &str,
        options: &MessageOptions,
    ) -> Result<()> {
        self.record(BotCall::EditMessageText {
            target,
            text: text.to_string(),
            options: options.clone(),
        });
        Ok(())
    }

    async fn edit_message_reply_markup(
        &self,
        target: MessageRef,
        reply_markup: Option<&Value>,
    ) -> Result<()> {
        self.record(BotCall::EditMessageReplyMarkup {
            target,
            reply_markup: reply_markup.cloned(),
        });
        Ok(())
    }

    async fn answer_callback_query(&self, query_id: &str) -> Result<()> {
        self.record(BotCall::AnswerCallbackQuery {
            query_id: query_id.to_string(),
        });
        Ok(())
    }

    async fn answer_pre_checkout_query(&self, query_id: &str, ok: bool) -> Result<()> {
        self.record(BotCall::AnswerPreCheckoutQuery {
            query_id: query_id.to_string(),
            ok,
        });
        Ok(())
    }
}

/// Collects every call recorded so far without waiting.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<BotCall>) -> Vec<BotCall> {
    let mut calls = Vec::new();
    while let Ok(call) = rx.try_recv() {
        calls.push(call);
    }
    calls
}

/// Texts of the `SendMessage` calls, in order.
#[allow(dead_code)]
pub fn sent_texts(calls: &[BotCall]) -> Vec<String> {
    calls
        .iter()
        .filter_map(|call| match call {
            BotCall::SendMessage { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}
