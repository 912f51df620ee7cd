//! Core types: principal, chat, inbound events, response descriptors and conversion traits.
//!
//! Types are split into one file per main type for easier navigation.

mod chat;
mod convert;
mod event;
mod response;
mod user;

pub use chat::Chat;
pub use convert::{ToCoreEvent, ToCoreUser};
pub use event::{
    CallbackQuery, Contact, Event, InboundMessage, MessageRef, PhotoSize, PreCheckoutQuery,
    SuccessfulPayment,
};
pub use response::{PriceItem, Response, ResponseKind};
pub use user::User;
