//! Free-form input: contacts, text feedback, photos, link moderation.

use action_dispatch::{sync_handler, Action, EventContext, Payload};
use dbot_core::{DbotError, Response};

use crate::services::{Feedback, ShopAccount, ShopServices, ROLE_ADMIN};

/// Delay before a message carrying a link is removed.
const LINK_REMOVAL_DELAY_MS: u64 = 1_000;

const HELP: &str = concat!(
    "/start - catalog\n",
    "/product <id> - product card\n",
    "Send text to leave feedback, share a contact to get a call back."
);

fn has_link(text: &str) -> bool {
    text.contains("http://") || text.contains("https://")
}

pub fn feedback_controller(services: &ShopServices) -> Vec<Action<ShopAccount>> {
    let feedback = services.feedback.clone();

    let help = sync_handler(|_ctx: &EventContext<ShopAccount>| Ok(vec![Response::message(HELP)]));

    let contact = sync_handler(|ctx: &EventContext<ShopAccount>| match &ctx.payload {
        Payload::Contact(contact) => Ok(vec![Response::message(format!(
            "Thanks, {}! We will call you at {}.",
            contact.first_name, contact.phone_number
        ))]),
        _ => Ok(Vec::new()),
    });

    let record = {
        let feedback = feedback.clone();
        move |ctx: EventContext<ShopAccount>| {
            let feedback = feedback.clone();
            async move {
                let text = match ctx.text() {
                    Some(text) if !text.starts_with('/') && !has_link(text) => text.to_string(),
                    _ => return Ok(Vec::new()),
                };
                feedback
                    .push(Feedback {
                        user_id: ctx.account.user_id,
                        text,
                    })
                    .await;
                Ok::<_, DbotError>(vec![Response::message("Thanks for the feedback!")])
            }
        }
    };

    let moderate = sync_handler(|ctx: &EventContext<ShopAccount>| {
        if ctx.account.is_admin || !ctx.text().is_some_and(has_link) {
            return Ok(Vec::new());
        }
        Ok(vec![
            Response::message("Links are not allowed here."),
            Response::delete_message().with_timeout(LINK_REMOVAL_DELAY_MS),
        ])
    });

    let photo = sync_handler(|ctx: &EventContext<ShopAccount>| match &ctx.payload {
        Payload::Photo(sizes) => {
            let largest = sizes.iter().map(|s| s.width * s.height).max().unwrap_or(0);
            Ok(vec![Response::message(format!(
                "Photo received ({} px), our team will take a look.",
                largest
            ))])
        }
        _ => Ok(Vec::new()),
    });

    let list_feedback = move |_ctx: EventContext<ShopAccount>| {
        let feedback = feedback.clone();
        async move {
            let entries = feedback.all().await;
            let body = if entries.is_empty() {
                "No feedback yet.".to_string()
            } else {
                entries
                    .iter()
                    .map(|f| format!("{}: {}", f.user_id, f.text))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            Ok::<_, DbotError>(vec![Response::message(body)])
        }
    };

    vec![
        Action::command(r"^/help$", help),
        Action::command(r"^/feedback$", list_feedback).with_role(ROLE_ADMIN),
        Action::contact(contact),
        Action::text(record),
        Action::text(moderate),
        Action::photo(photo),
    ]
}
