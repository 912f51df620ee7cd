//! Completed payments and the admin order listing.

use action_dispatch::{Action, EventContext, Payload};
use dbot_core::{DbotError, HandlerError, Response};

use crate::services::{Order, ShopAccount, ShopServices, ROLE_ADMIN};

/// Delay before the shipping follow-up is sent after a payment.
const FOLLOW_UP_DELAY_MS: u64 = 60_000;

pub fn payments_controller(services: &ShopServices) -> Vec<Action<ShopAccount>> {
    let orders = services.orders.clone();
    let paid = {
        let orders = orders.clone();
        move |ctx: EventContext<ShopAccount>| {
            let orders = orders.clone();
            async move {
                let Payload::SuccessfulPayment(payment) = &ctx.payload else {
                    return Err(DbotError::from(HandlerError::InvalidPayload(
                        "expected payment".to_string(),
                    )));
                };
                orders
                    .record(Order {
                        user_id: ctx.account.user_id,
                        payload: payment.invoice_payload.clone(),
                        total_amount: payment.total_amount,
                        currency: payment.currency.clone(),
                    })
                    .await;
                let amount = format!(
                    "{}.{:02}",
                    payment.total_amount / 100,
                    payment.total_amount % 100
                );
                Ok(vec![
                    Response::message(format!(
                        "Payment of {} {} received, thank you!",
                        amount, payment.currency
                    )),
                    Response::message("Your order is on its way.")
                        .with_timeout(FOLLOW_UP_DELAY_MS),
                ])
            }
        }
    };

    let list_orders = move |_ctx: EventContext<ShopAccount>| {
        let orders = orders.clone();
        async move {
            let all = orders.all().await;
            if all.is_empty() {
                return Ok(vec![Response::message("No orders yet.")]);
            }
            let lines: Vec<String> = all
                .iter()
                .map(|o| {
                    format!(
                        "{} | user {} | {} {}",
                        o.payload, o.user_id, o.total_amount, o.currency
                    )
                })
                .collect();
            Ok::<_, DbotError>(vec![Response::message(lines.join("\n"))])
        }
    };

    vec![
        Action::successful_payment(paid),
        Action::command(r"^/orders$", list_orders).with_role(ROLE_ADMIN),
    ]
}
