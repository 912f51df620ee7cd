//! Per-invocation context handed to action handlers.

use std::sync::Arc;

use dbot_core::{CallbackQuery, Contact, Event, InboundMessage, PhotoSize, SuccessfulPayment};

/// Kind-specific fields extracted from the inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Capture groups of the matched command pattern; index 0 is the whole match.
    Command { captures: Vec<Option<String>> },
    /// Raw callback data and its `:`-separated parts.
    Callback { data: String, parts: Vec<String> },
    SuccessfulPayment(SuccessfulPayment),
    Contact(Contact),
    Text(String),
    Photo(Vec<PhotoSize>),
}

/// Resolved user, raw event and extracted payload. Cheap to clone; fan-out handlers of one
/// event share the same account and event.
pub struct EventContext<A> {
    pub account: Arc<A>,
    pub event: Arc<Event>,
    pub payload: Payload,
}

impl<A> Clone for EventContext<A> {
    fn clone(&self) -> Self {
        Self {
            account: Arc::clone(&self.account),
            event: Arc::clone(&self.event),
            payload: self.payload.clone(),
        }
    }
}

impl<A> EventContext<A> {
    pub fn new(account: Arc<A>, event: Arc<Event>, payload: Payload) -> Self {
        Self {
            account,
            event,
            payload,
        }
    }

    /// Inbound message, when the event is a message.
    pub fn message(&self) -> Option<&InboundMessage> {
        self.event.as_message()
    }

    /// Callback query, when the event is one.
    pub fn callback_query(&self) -> Option<&CallbackQuery> {
        match self.event.as_ref() {
            Event::CallbackQuery(q) => Some(q),
            _ => None,
        }
    }

    /// Callback data parts; empty for other payloads.
    pub fn parts(&self) -> &[String] {
        match &self.payload {
            Payload::Callback { parts, .. } => parts,
            _ => &[],
        }
    }

    /// Capture group `index` of the matched command, if it participated in the match.
    pub fn capture(&self, index: usize) -> Option<&str> {
        match &self.payload {
            Payload::Command { captures } => captures.get(index).and_then(|c| c.as_deref()),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(text) => Some(text),
            _ => self.message().and_then(|m| m.text.as_deref()),
        }
    }
}

/// Splits callback data on `:`; the first part is the lookup key.
pub fn split_callback_data(data: &str) -> Vec<String> {
    data.split(':').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbot_core::{Chat, User};

    fn sender() -> User {
        User {
            id: 1,
            username: Some("alice".to_string()),
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn test_split_callback_data() {
        assert_eq!(split_callback_data("buy:42:x"), vec!["buy", "42", "x"]);
        assert_eq!(split_callback_data("menu"), vec!["menu"]);
        assert_eq!(split_callback_data(""), vec![""]);
    }

    #[test]
    fn test_context_accessors() {
        let event = Arc::new(Event::CallbackQuery(CallbackQuery {
            id: "q".to_string(),
            from: sender(),
            message: None,
            data: Some("buy:42".to_string()),
        }));
        let ctx = EventContext::new(
            Arc::new(()),
            event,
            Payload::Callback {
                data: "buy:42".to_string(),
                parts: split_callback_data("buy:42"),
            },
        );

        assert_eq!(ctx.parts(), ["buy".to_string(), "42".to_string()]);
        assert!(ctx.callback_query().is_some());
        assert!(ctx.message().is_none());
        assert_eq!(ctx.capture(0), None);
        assert_eq!(ctx.text(), None);
    }

    #[test]
    fn test_command_captures_and_text() {
        let chat = Chat {
            id: 1,
            chat_type: "private".to_string(),
        };
        let event = Arc::new(Event::Message(InboundMessage::text(3, sender(), chat, "/item 7")));
        let ctx = EventContext::new(
            Arc::new(()),
            event,
            Payload::Command {
                captures: vec![Some("/item 7".to_string()), Some("7".to_string()), None],
            },
        );

        assert_eq!(ctx.capture(1), Some("7"));
        assert_eq!(ctx.capture(2), None);
        assert_eq!(ctx.capture(9), None);
        assert_eq!(ctx.text(), Some("/item 7"));
    }
}
