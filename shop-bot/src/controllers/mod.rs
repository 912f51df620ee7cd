//! Controllers: each declares the actions of one feature area.

mod catalog;
mod feedback;
mod payments;

use action_dispatch::Controller;

use crate::services::{ShopAccount, ShopServices};

pub use catalog::catalog_controller;
pub use feedback::feedback_controller;
pub use payments::payments_controller;

/// Registration order; earlier command patterns win.
pub const CONTROLLERS: &[Controller<ShopServices, ShopAccount>] =
    &[catalog_controller, payments_controller, feedback_controller];
