//! Shared fixtures: a static user service and event builders.

#![allow(dead_code)]

pub mod mock_bot;

use std::collections::HashMap;

use action_dispatch::UserService;
use async_trait::async_trait;
use dbot_core::{
    CallbackQuery, Chat, Contact, DbotError, Event, InboundMessage, MessageRef, PhotoSize,
    PreCheckoutQuery, Result, SuccessfulPayment, User,
};

/// Resolved account used by the tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub role: String,
}

/// Users with fixed roles; unknown senders fail resolution.
pub struct StaticUsers {
    roles: HashMap<i64, String>,
}

impl StaticUsers {
    pub fn new(entries: &[(i64, &str)]) -> Self {
        Self {
            roles: entries
                .iter()
                .map(|(id, role)| (*id, role.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl UserService for StaticUsers {
    type Account = Account;

    async fn check_user(&self, principal: &User) -> Result<Account> {
        self.roles
            .get(&principal.id)
            .map(|role| Account {
                id: principal.id,
                role: role.clone(),
            })
            .ok_or_else(|| DbotError::UserResolution(format!("unknown user {}", principal.id)))
    }

    fn check_role(&self, account: &Account, role: &str) -> bool {
        account.role == role
    }
}

pub const USER_ID: i64 = 100;
pub const ADMIN_ID: i64 = 200;
pub const STRANGER_ID: i64 = 999;
pub const CHAT_ID: i64 = 100;

pub fn users() -> StaticUsers {
    StaticUsers::new(&[(USER_ID, "user"), (ADMIN_ID, "admin")])
}

pub fn principal(id: i64) -> User {
    User {
        id,
        username: Some(format!("user{}", id)),
        first_name: Some("Test".to_string()),
        last_name: None,
    }
}

pub fn private_chat(id: i64) -> Chat {
    Chat {
        id,
        chat_type: "private".to_string(),
    }
}

pub fn text_event(from: i64, text: &str) -> Event {
    Event::Message(InboundMessage::text(1, principal(from), private_chat(from), text))
}

pub fn callback_event(from: i64, data: &str) -> Event {
    Event::CallbackQuery(CallbackQuery {
        id: format!("cb-{}", data),
        from: principal(from),
        message: Some(MessageRef {
            chat_id: -42,
            message_id: 77,
        }),
        data: Some(data.to_string()),
    })
}

pub fn contact_event(from: i64) -> Event {
    let mut message = InboundMessage::empty(2, principal(from), private_chat(from));
    message.contact = Some(Contact {
        phone_number: "+10000000000".to_string(),
        first_name: "Alice".to_string(),
        last_name: None,
        user_id: Some(from),
    });
    Event::Message(message)
}

pub fn photo_event(from: i64) -> Event {
    let mut message = InboundMessage::empty(3, principal(from), private_chat(from));
    message.photo = vec![PhotoSize {
        file_id: "file-1".to_string(),
        file_unique_id: "uniq-1".to_string(),
        width: 90,
        height: 90,
        file_size: 1024,
    }];
    Event::Message(message)
}

pub fn payment_event(from: i64) -> Event {
    let mut message = InboundMessage::empty(4, principal(from), private_chat(from));
    message.successful_payment = Some(SuccessfulPayment {
        currency: "RUB".to_string(),
        total_amount: 15000,
        invoice_payload: "order-1".to_string(),
    });
    Event::Message(message)
}

pub fn pre_checkout_event(from: i64) -> Event {
    Event::PreCheckoutQuery(PreCheckoutQuery {
        id: "checkout-1".to_string(),
        from: principal(from),
        currency: "RUB".to_string(),
        total_amount: 15000,
        invoice_payload: "order-1".to_string(),
    })
}
