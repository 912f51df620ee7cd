//! # dbot-core
//!
//! Core types and traits shared by the dispatch engine and the Telegram layer: the principal
//! [`User`], inbound [`Event`]s, [`Response`] descriptors, the outbound [`Bot`] trait, errors and
//! tracing initialization. Transport-agnostic; used by action-dispatch and dbot-telegram.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::{Bot, Invoice, LabeledPrice, MessageOptions, PhotoOptions};
pub use error::{DbotError, HandlerError, Result};
pub use logger::init_tracing;
pub use types::{
    CallbackQuery, Chat, Contact, Event, InboundMessage, MessageRef, PhotoSize, PreCheckoutQuery,
    PriceItem, Response, ResponseKind, SuccessfulPayment, ToCoreEvent, ToCoreUser, User,
};
