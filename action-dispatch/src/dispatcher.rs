//! Dispatch engine: one routine per inbound event kind.
//!
//! Every routine resolves the sender through the [`AuthGate`], picks the matching action(s),
//! drops the event silently when nothing matches or the role requirement is unmet, runs the
//! handler(s) and hands their output to the [`ResponseInterpreter`]. User resolution and handler
//! errors are returned to the caller, which is expected to log and drop the event.

use std::str::FromStr;
use std::sync::Arc;

use dbot_core::{Bot, CallbackQuery, Event, Response, Result};
use futures::future::join_all;
use tracing::{debug, error, info, instrument, warn};

use crate::action::{Action, ActionKind};
use crate::auth::{AuthGate, UserService};
use crate::context::{split_callback_data, EventContext, Payload};
use crate::interpreter::{InvoiceSettings, ResponseInterpreter};
use crate::registry::ActionRegistry;

/// How fan-out dispatch treats a failing handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanOutPolicy {
    /// One failing handler drops the output of all its siblings for that event.
    #[default]
    AllOrNothing,
    /// Failures are logged; the other handlers' output is still delivered.
    Independent,
}

impl FromStr for FanOutPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all-or-nothing" | "all_or_nothing" => Ok(FanOutPolicy::AllOrNothing),
            "independent" => Ok(FanOutPolicy::Independent),
            other => Err(format!("unknown fan-out policy: {}", other)),
        }
    }
}

/// Routes events to actions. Cheap to clone; clones share the registry, user service and bot.
pub struct ActionDispatcher<S: UserService> {
    registry: Arc<ActionRegistry<S::Account>>,
    gate: AuthGate<S>,
    interpreter: ResponseInterpreter,
    fan_out_policy: FanOutPolicy,
}

impl<S: UserService> Clone for ActionDispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            gate: self.gate.clone(),
            interpreter: self.interpreter.clone(),
            fan_out_policy: self.fan_out_policy,
        }
    }
}

impl<S: UserService> ActionDispatcher<S> {
    pub fn new(registry: ActionRegistry<S::Account>, users: Arc<S>, bot: Arc<dyn Bot>) -> Self {
        Self {
            registry: Arc::new(registry),
            gate: AuthGate::new(users),
            interpreter: ResponseInterpreter::new(bot),
            fan_out_policy: FanOutPolicy::default(),
        }
    }

    pub fn with_fan_out_policy(mut self, policy: FanOutPolicy) -> Self {
        self.fan_out_policy = policy;
        self
    }

    pub fn with_invoice_settings(mut self, settings: InvoiceSettings) -> Self {
        self.interpreter = self.interpreter.with_invoice_settings(settings);
        self
    }

    pub fn registry(&self) -> &ActionRegistry<S::Account> {
        &self.registry
    }

    fn bot(&self) -> &Arc<dyn Bot> {
        self.interpreter.bot()
    }

    /// Routes any inbound event.
    ///
    /// A message is offered to every routine whose payload it carries: text goes to both command
    /// matching and the text listeners; contact, photo and successful payment go to theirs.
    #[instrument(skip(self, event), fields(kind = event.kind_name(), user_id = event.sender().id))]
    pub async fn dispatch(&self, event: Event) -> Result<()> {
        info!("step: event received");
        let event = Arc::new(event);
        match event.as_ref() {
            Event::CallbackQuery(_) => self.on_callback_query(event).await,
            Event::PreCheckoutQuery(_) => self.on_pre_checkout_query(&event).await,
            Event::Message(message) => {
                if message.successful_payment.is_some() {
                    self.on_successful_payment(event).await
                } else if message.contact.is_some() {
                    self.on_contact(event).await
                } else if !message.photo.is_empty() {
                    self.on_photo(event).await
                } else if let Some(body) = message.text.clone() {
                    let account = self.gate.resolve(event.sender()).await?;
                    let listeners = self.fan_out_as(
                        Arc::clone(&account),
                        Arc::clone(&event),
                        ActionKind::Text,
                        Payload::Text(body),
                    );
                    let (command, text) =
                        tokio::join!(self.run_command(account, Arc::clone(&event)), listeners);
                    command.and(text)
                } else {
                    debug!("Message carries no routed payload");
                    Ok(())
                }
            }
        }
    }

    /// Runs the first command whose pattern matches the message text.
    pub async fn on_command(&self, event: Arc<Event>) -> Result<()> {
        if self.matched_command(&event).is_none() {
            return Ok(());
        }
        let account = self.gate.resolve(event.sender()).await?;
        self.run_command(account, event).await
    }

    fn matched_command(
        &self,
        event: &Event,
    ) -> Option<(&Action<S::Account>, Vec<Option<String>>)> {
        let text = event.as_message().and_then(|m| m.text.as_deref())?;
        self.registry.match_command(text)
    }

    async fn run_command(&self, account: Arc<S::Account>, event: Arc<Event>) -> Result<()> {
        let Some((action, captures)) = self.matched_command(&event) else {
            return Ok(());
        };
        debug!(action = %action.label(), "step: command matched");
        self.run_single(account, event, action, Payload::Command { captures })
            .await
    }

    /// Routes a callback query by the leading token of its data. The query is acknowledged
    /// whatever the routing outcome.
    pub async fn on_callback_query(&self, event: Arc<Event>) -> Result<()> {
        let Event::CallbackQuery(query) = event.as_ref() else {
            return Ok(());
        };

        let acknowledge = async {
            if let Err(e) = self.bot().answer_callback_query(&query.id).await {
                warn!(query_id = %query.id, error = %e, "Failed to answer callback query");
            }
        };
        let ((), routed) = tokio::join!(acknowledge, self.route_callback(&event, query));
        routed
    }

    async fn route_callback(&self, event: &Arc<Event>, query: &CallbackQuery) -> Result<()> {
        let account = self.gate.resolve(&query.from).await?;
        let data = query.data.clone().unwrap_or_default();
        let parts = split_callback_data(&data);
        let Some(action) = self.registry.callback(&parts[0]) else {
            debug!(key = %parts[0], "No callback action for key");
            return Ok(());
        };
        self.run_single(
            account,
            Arc::clone(event),
            action,
            Payload::Callback { data, parts },
        )
        .await
    }

    /// Approves every checkout; no action is consulted.
    pub async fn on_pre_checkout_query(&self, event: &Event) -> Result<()> {
        let Event::PreCheckoutQuery(query) = event else {
            return Ok(());
        };
        info!(
            query_id = %query.id,
            payload = %query.invoice_payload,
            total_amount = query.total_amount,
            "step: approving checkout"
        );
        if let Err(e) = self.bot().answer_pre_checkout_query(&query.id, true).await {
            warn!(query_id = %query.id, error = %e, "Failed to answer pre-checkout query");
        }
        Ok(())
    }

    pub async fn on_successful_payment(&self, event: Arc<Event>) -> Result<()> {
        let Some(payment) = event
            .as_message()
            .and_then(|m| m.successful_payment.clone())
        else {
            return Ok(());
        };
        let account = self.gate.resolve(event.sender()).await?;
        let Some(action) = self.registry.successful_payment() else {
            debug!("No successful_payment action registered");
            return Ok(());
        };
        self.run_single(account, event, action, Payload::SuccessfulPayment(payment))
            .await
    }

    pub async fn on_contact(&self, event: Arc<Event>) -> Result<()> {
        let Some(contact) = event.as_message().and_then(|m| m.contact.clone()) else {
            return Ok(());
        };
        self.fan_out(event, ActionKind::Contact, Payload::Contact(contact))
            .await
    }

    pub async fn on_text(&self, event: Arc<Event>) -> Result<()> {
        let Some(text) = event.as_message().and_then(|m| m.text.clone()) else {
            return Ok(());
        };
        self.fan_out(event, ActionKind::Text, Payload::Text(text)).await
    }

    pub async fn on_photo(&self, event: Arc<Event>) -> Result<()> {
        let Some(photo) = event
            .as_message()
            .map(|m| m.photo.clone())
            .filter(|p| !p.is_empty())
        else {
            return Ok(());
        };
        self.fan_out(event, ActionKind::Photo, Payload::Photo(photo)).await
    }

    async fn run_single(
        &self,
        account: Arc<S::Account>,
        event: Arc<Event>,
        action: &Action<S::Account>,
        payload: Payload,
    ) -> Result<()> {
        if !self.gate.permits(&account, action) {
            return Ok(());
        }
        info!(action = %action.label(), "step: handler processing");
        let ctx = EventContext::new(account, Arc::clone(&event), payload);
        let responses = action.handler().handle(ctx).await?;
        info!(
            action = %action.label(),
            responses = responses.len(),
            "step: handler done"
        );
        self.interpreter.interpret(&event, responses).await;
        Ok(())
    }

    /// Invokes every permitted action of a fan-out kind concurrently, then interprets their
    /// output in registration order.
    async fn fan_out(&self, event: Arc<Event>, kind: ActionKind, payload: Payload) -> Result<()> {
        let account = self.gate.resolve(event.sender()).await?;
        self.fan_out_as(account, event, kind, payload).await
    }

    async fn fan_out_as(
        &self,
        account: Arc<S::Account>,
        event: Arc<Event>,
        kind: ActionKind,
        payload: Payload,
    ) -> Result<()> {
        let actions = self.registry.fan_out(kind);
        if actions.is_empty() {
            return Ok(());
        }
        let ctx = EventContext::new(Arc::clone(&account), Arc::clone(&event), payload);

        let invocations = actions.iter().map(|action| {
            let permitted = self.gate.permits(&account, action);
            let ctx = ctx.clone();
            async move {
                if !permitted {
                    return Ok(Vec::new());
                }
                action.handler().handle(ctx).await
            }
        });

        // Every handler settles before any output is judged; a failure never cancels siblings.
        let settled = join_all(invocations).await;
        let outputs: Vec<Vec<Response>> = match self.fan_out_policy {
            FanOutPolicy::AllOrNothing => settled.into_iter().collect::<Result<_>>()?,
            FanOutPolicy::Independent => settled
                .into_iter()
                .zip(actions)
                .filter_map(|(output, action)| match output {
                    Ok(responses) => Some(responses),
                    Err(e) => {
                        error!(action = %action.label(), error = %e, "Fan-out handler failed");
                        None
                    }
                })
                .collect(),
        };

        info!(kind = %kind, handlers = outputs.len(), "step: fan-out handlers settled");
        for responses in outputs {
            self.interpreter.interpret(&event, responses).await;
        }
        Ok(())
    }
}
