//! # Action dispatch
//!
//! Binds inbound bot events (commands, callback queries, payments, contact/text/photo messages)
//! to application actions. Actions are collected once into an [`ActionRegistry`]; the
//! [`ActionDispatcher`] resolves the sender through a [`UserService`], enforces role requirements,
//! runs the matching handler(s) and feeds their [`Response`](dbot_core::Response) descriptors to
//! the [`ResponseInterpreter`].

mod action;
mod auth;
mod context;
mod dispatcher;
mod interpreter;
mod registry;

pub use action::{sync_handler, Action, ActionHandler, ActionKind, SyncHandler, UnknownKind};
pub use auth::{AuthGate, UserService};
pub use context::{split_callback_data, EventContext, Payload};
pub use dispatcher::{ActionDispatcher, FanOutPolicy};
pub use interpreter::{labeled_prices, InvoiceSettings, ResponseInterpreter, ResponseTarget};
pub use registry::{ActionRegistry, Controller, SUCCESSFUL_PAYMENT_KEY};

// Integration tests live in tests/
