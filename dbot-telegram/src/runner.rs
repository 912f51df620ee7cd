//! Long-polling runner: converts each teloxide update to a core event and hands it to the
//! dispatcher.
//! Talks to teloxide's Dispatcher, `get_me`, and [`ActionDispatcher::dispatch`].

use action_dispatch::{ActionDispatcher, UserService};
use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::Update;
use tracing::{debug, error, info, instrument};

use super::adapters::event_from_update;

/// Polls Telegram until ctrl-c. Every routed update is dispatched on its own task so a slow
/// handler never blocks the next update; dispatch errors are logged and the event dropped.
#[instrument(skip(bot, dispatcher))]
pub async fn run_polling<S>(bot: teloxide::Bot, dispatcher: ActionDispatcher<S>) -> Result<()>
where
    S: UserService + 'static,
{
    match bot.get_me().await {
        Ok(me) => info!(username = ?me.user.username, "Bot identity resolved"),
        Err(e) => error!(error = %e, "get_me failed"),
    }

    let handler = dptree::endpoint(move |update: Update| {
        let dispatcher = dispatcher.clone();
        async move {
            match event_from_update(&update) {
                Some(event) => {
                    info!(
                        user_id = event.sender().id,
                        kind = event.kind_name(),
                        "Received update"
                    );
                    tokio::spawn(async move {
                        if let Err(e) = dispatcher.dispatch(event).await {
                            error!(error = %e, "Dispatch failed");
                        }
                    });
                }
                None => debug!(update_id = ?update.id, "Ignoring unsupported update"),
            }
            respond(())
        }
    });

    info!("Bot started successfully");
    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
