//! Action registry: built once from controller providers, read-only afterwards.
//!
//! Commands are kept in registration order and matched by regex; callback and successful-payment
//! actions share one exact-match table (later registrations replace earlier ones under the same
//! key); contact, text and photo actions are kept in ordered lists.

use std::collections::HashMap;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::action::{Action, ActionKind};

/// Key of the successful-payment action in the callback table.
pub const SUCCESSFUL_PAYMENT_KEY: &str = "successful_payment";

/// Controller provider: builds action declarations from the service bundle `S`.
pub type Controller<S, A> = fn(&S) -> Vec<Action<A>>;

struct CommandEntry<A> {
    pattern: Regex,
    action: Action<A>,
}

/// Lookup structures for every action kind.
pub struct ActionRegistry<A> {
    commands: Vec<CommandEntry<A>>,
    callbacks: HashMap<String, Action<A>>,
    contact: Vec<Action<A>>,
    text: Vec<Action<A>>,
    photo: Vec<Action<A>>,
}

impl<A> Default for ActionRegistry<A> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            callbacks: HashMap::new(),
            contact: Vec::new(),
            text: Vec::new(),
            photo: Vec::new(),
        }
    }
}

impl<A> ActionRegistry<A> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from controller providers, in order.
    pub fn from_controllers<S>(services: &S, controllers: &[Controller<S, A>]) -> Self {
        controllers
            .iter()
            .fold(Self::new(), |registry, controller| {
                registry.add_controller(services, *controller)
            })
    }

    /// Registers every action the controller declares.
    pub fn add_controller<S, F>(mut self, services: &S, controller: F) -> Self
    where
        F: FnOnce(&S) -> Vec<Action<A>>,
    {
        for action in controller(services) {
            self.register(action);
        }
        self
    }

    /// Registers one action (builder form).
    pub fn add_action(mut self, action: Action<A>) -> Self {
        self.register(action);
        self
    }

    /// Classifies the action by kind. Never fails: command actions with a missing or invalid
    /// pattern are logged and skipped.
    pub fn register(&mut self, action: Action<A>) {
        match action.kind() {
            ActionKind::Command => {
                let Some(source) = action.trigger() else {
                    warn!(action = %action.label(), "Skipping command without pattern");
                    return;
                };
                match Regex::new(source) {
                    Ok(pattern) => {
                        debug!(pattern = %source, "Registered command");
                        self.commands.push(CommandEntry { pattern, action });
                    }
                    Err(e) => {
                        warn!(
                            pattern = %source,
                            error = %e,
                            "Skipping command with invalid pattern"
                        );
                    }
                }
            }
            ActionKind::Callback => {
                let key = action.trigger().unwrap_or_default().to_string();
                self.insert_callback(key, action);
            }
            ActionKind::SuccessfulPayment => {
                self.insert_callback(SUCCESSFUL_PAYMENT_KEY.to_string(), action);
            }
            ActionKind::Contact => self.contact.push(action),
            ActionKind::Text => self.text.push(action),
            ActionKind::Photo => self.photo.push(action),
        }
    }

    fn insert_callback(&mut self, key: String, action: Action<A>) {
        if let Some(previous) = self.callbacks.insert(key.clone(), action) {
            info!(key = %key, replaced = %previous.label(), "Callback action replaced");
        }
    }

    /// First command whose pattern matches `text`, with its capture groups.
    pub fn match_command(&self, text: &str) -> Option<(&Action<A>, Vec<Option<String>>)> {
        self.commands.iter().find_map(|entry| {
            entry.pattern.captures(text).map(|caps| {
                let captures = caps
                    .iter()
                    .map(|m| m.map(|m| m.as_str().to_string()))
                    .collect();
                (&entry.action, captures)
            })
        })
    }

    /// Callback-style action stored under `key`.
    pub fn callback(&self, key: &str) -> Option<&Action<A>> {
        self.callbacks.get(key)
    }

    pub fn successful_payment(&self) -> Option<&Action<A>> {
        self.callbacks.get(SUCCESSFUL_PAYMENT_KEY)
    }

    /// Actions of a fan-out kind in registration order; empty for single-match kinds.
    pub fn fan_out(&self, kind: ActionKind) -> &[Action<A>] {
        match kind {
            ActionKind::Contact => &self.contact,
            ActionKind::Text => &self.text,
            ActionKind::Photo => &self.photo,
            _ => &[],
        }
    }

    /// Total number of reachable actions.
    pub fn len(&self) -> usize {
        self.commands.len()
            + self.callbacks.len()
            + self.contact.len()
            + self.text.len()
            + self.photo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EventContext;
    use dbot_core::{Response, Result};

    async fn noop(_ctx: EventContext<()>) -> Result<Vec<Response>> {
        Ok(Vec::new())
    }

    struct Services {
        admin_role: &'static str,
    }

    fn shop_controller(services: &Services) -> Vec<Action<()>> {
        vec![
            Action::command("^/start$", noop),
            Action::callback("buy", noop).with_role(services.admin_role),
            Action::text(noop),
        ]
    }

    fn feedback_controller(_services: &Services) -> Vec<Action<()>> {
        vec![Action::text(noop).with_role("user"), Action::contact(noop)]
    }

    #[test]
    fn test_classifies_actions_by_kind() {
        let registry = ActionRegistry::new()
            .add_action(Action::command("^/help", noop))
            .add_action(Action::callback("menu", noop))
            .add_action(Action::successful_payment(noop))
            .add_action(Action::contact(noop))
            .add_action(Action::text(noop))
            .add_action(Action::photo(noop))
            .add_action(Action::photo(noop));

        assert!(registry.match_command("/help me").is_some());
        assert!(registry.callback("menu").is_some());
        assert!(registry.successful_payment().is_some());
        assert_eq!(registry.fan_out(ActionKind::Contact).len(), 1);
        assert_eq!(registry.fan_out(ActionKind::Text).len(), 1);
        assert_eq!(registry.fan_out(ActionKind::Photo).len(), 2);
        assert!(registry.fan_out(ActionKind::Callback).is_empty());
        assert_eq!(registry.len(), 7);
    }

    #[test]
    fn test_later_callback_registration_wins() {
        let registry = ActionRegistry::new()
            .add_action(Action::callback("buy", noop))
            .add_action(Action::callback("buy", noop).with_role("admin"));

        assert_eq!(registry.callback("buy").unwrap().role(), Some("admin"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_successful_payment_shares_callback_table() {
        let registry = ActionRegistry::new()
            .add_action(Action::successful_payment(noop))
            .add_action(Action::callback(SUCCESSFUL_PAYMENT_KEY, noop).with_role("late"));

        assert_eq!(registry.successful_payment().unwrap().role(), Some("late"));
    }

    #[test]
    fn test_invalid_command_pattern_is_skipped() {
        let registry = ActionRegistry::new()
            .add_action(Action::command("^/broken(", noop))
            .add_action(Action::command("^/ok", noop));

        assert_eq!(registry.len(), 1);
        assert!(registry.match_command("/broken(").is_none());
    }

    #[test]
    fn test_first_matching_command_wins_with_captures() {
        let registry = ActionRegistry::new()
            .add_action(Action::command(r"^/item (\d+)", noop).with_role("first"))
            .add_action(Action::command(r"^/item", noop).with_role("second"));

        let (action, captures) = registry.match_command("/item 42").unwrap();
        assert_eq!(action.role(), Some("first"));
        assert_eq!(
            captures,
            vec![Some("/item 42".to_string()), Some("42".to_string())]
        );
        assert!(registry.match_command("hello").is_none());
    }

    #[test]
    fn test_from_controllers_keeps_registration_order() {
        let services = Services { admin_role: "admin" };
        let controllers: Vec<Controller<Services, ()>> = vec![shop_controller, feedback_controller];
        let registry = ActionRegistry::from_controllers(&services, &controllers);

        let text = registry.fan_out(ActionKind::Text);
        assert_eq!(text.len(), 2);
        assert_eq!(text[0].role(), None);
        assert_eq!(text[1].role(), Some("user"));
        assert_eq!(registry.callback("buy").unwrap().role(), Some("admin"));
        assert_eq!(registry.len(), 5);
    }
}
