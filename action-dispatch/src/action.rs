//! Action declarations: a trigger kind, an optional role requirement and a handler.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use dbot_core::{Response, Result};
use tracing::debug;

use crate::context::EventContext;

/// Event kind an action listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Text matching a regular expression; first matching action wins.
    Command,
    /// Inline keyboard press, keyed by the leading `:`-separated token of the callback data.
    Callback,
    SuccessfulPayment,
    /// Fan-out kinds: every registered action runs.
    Contact,
    Text,
    Photo,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Command => "command",
            ActionKind::Callback => "callback",
            ActionKind::SuccessfulPayment => "successful_payment",
            ActionKind::Contact => "contact",
            ActionKind::Text => "text",
            ActionKind::Photo => "photo",
        }
    }

    /// True for kinds where every registered action is invoked per event.
    pub fn is_fan_out(&self) -> bool {
        matches!(self, ActionKind::Contact | ActionKind::Text | ActionKind::Photo)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned for kind names no action kind answers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl FromStr for ActionKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "command" => Ok(ActionKind::Command),
            "callback" => Ok(ActionKind::Callback),
            "successful_payment" => Ok(ActionKind::SuccessfulPayment),
            "contact" => Ok(ActionKind::Contact),
            "text" => Ok(ActionKind::Text),
            "photo" => Ok(ActionKind::Photo),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Handles one event for one action. Returns the descriptors to execute; an empty vector means
/// "nothing to do".
#[async_trait]
pub trait ActionHandler<A>: Send + Sync {
    async fn handle(&self, ctx: EventContext<A>) -> Result<Vec<Response>>;
}

#[async_trait]
impl<A, F, Fut> ActionHandler<A> for F
where
    A: Send + Sync + 'static,
    F: Fn(EventContext<A>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<Response>>> + Send + 'static,
{
    async fn handle(&self, ctx: EventContext<A>) -> Result<Vec<Response>> {
        (self)(ctx).await
    }
}

/// Adapts a synchronous function into an [`ActionHandler`].
pub struct SyncHandler<F>(F);

/// Wraps `f` so it can be registered where an async handler is expected.
pub fn sync_handler<A, F>(f: F) -> SyncHandler<F>
where
    F: Fn(&EventContext<A>) -> Result<Vec<Response>> + Send + Sync,
{
    SyncHandler(f)
}

#[async_trait]
impl<A, F> ActionHandler<A> for SyncHandler<F>
where
    A: Send + Sync + 'static,
    F: Fn(&EventContext<A>) -> Result<Vec<Response>> + Send + Sync,
{
    async fn handle(&self, ctx: EventContext<A>) -> Result<Vec<Response>> {
        (self.0)(&ctx)
    }
}

/// A registered binding of a trigger to a handler. Immutable once built.
pub struct Action<A> {
    kind: ActionKind,
    /// Regex source for commands, lookup key for callbacks; `None` for implicit triggers.
    trigger: Option<String>,
    role: Option<String>,
    handler: Arc<dyn ActionHandler<A>>,
}

impl<A> Clone for Action<A> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            trigger: self.trigger.clone(),
            role: self.role.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<A> fmt::Debug for Action<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("kind", &self.kind)
            .field("trigger", &self.trigger)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl<A: Send + Sync + 'static> Action<A> {
    fn new(
        kind: ActionKind,
        trigger: Option<String>,
        handler: impl ActionHandler<A> + 'static,
    ) -> Self {
        Self {
            kind,
            trigger,
            role: None,
            handler: Arc::new(handler),
        }
    }

    /// Command matched by regular expression against message text.
    pub fn command(pattern: impl Into<String>, handler: impl ActionHandler<A> + 'static) -> Self {
        Self::new(ActionKind::Command, Some(pattern.into()), handler)
    }

    /// Callback keyed by the leading token of the callback data (`"buy"` for `"buy:42"`).
    pub fn callback(key: impl Into<String>, handler: impl ActionHandler<A> + 'static) -> Self {
        Self::new(ActionKind::Callback, Some(key.into()), handler)
    }

    pub fn successful_payment(handler: impl ActionHandler<A> + 'static) -> Self {
        Self::new(ActionKind::SuccessfulPayment, None, handler)
    }

    pub fn contact(handler: impl ActionHandler<A> + 'static) -> Self {
        Self::new(ActionKind::Contact, None, handler)
    }

    pub fn text(handler: impl ActionHandler<A> + 'static) -> Self {
        Self::new(ActionKind::Text, None, handler)
    }

    pub fn photo(handler: impl ActionHandler<A> + 'static) -> Self {
        Self::new(ActionKind::Photo, None, handler)
    }

    /// Builds an action from a kind name. Unknown names yield `None`; they are ignored rather
    /// than treated as errors.
    pub fn declare(
        kind: &str,
        trigger: Option<&str>,
        handler: impl ActionHandler<A> + 'static,
    ) -> Option<Self> {
        match kind.parse::<ActionKind>() {
            Ok(kind) => Some(Self::new(kind, trigger.map(str::to_string), handler)),
            Err(UnknownKind(name)) => {
                debug!(kind = %name, "Ignoring action with unknown kind");
                None
            }
        }
    }
}

impl<A> Action<A> {
    /// Requires the resolved user to satisfy `role` before the handler runs.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn trigger(&self) -> Option<&str> {
        self.trigger.as_deref()
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn handler(&self) -> &dyn ActionHandler<A> {
        self.handler.as_ref()
    }

    /// Short label for logs: `kind` or `kind:trigger`.
    pub fn label(&self) -> String {
        match &self.trigger {
            Some(trigger) => format!("{}:{}", self.kind, trigger),
            None => self.kind.to_string(),
        }
    }
}
