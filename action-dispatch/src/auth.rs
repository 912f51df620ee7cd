//! Authorization gate: resolves the sender to an application account and checks role
//! requirements of actions.

use std::sync::Arc;

use async_trait::async_trait;
use dbot_core::{Result, User};
use tracing::{debug, instrument};

use crate::action::Action;

/// Application-side user store. Resolution may fail (store or network error); the failure ends
/// handling of the event.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Resolved user type passed to handlers.
    type Account: Send + Sync + 'static;

    /// Resolves (and possibly creates) the account for a sender.
    async fn check_user(&self, principal: &User) -> Result<Self::Account>;

    /// True when `account` satisfies the `role` requirement.
    fn check_role(&self, account: &Self::Account, role: &str) -> bool;
}

/// Wraps a [`UserService`] with the two checks the dispatcher runs per event.
pub struct AuthGate<S> {
    users: Arc<S>,
}

impl<S> Clone for AuthGate<S> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
        }
    }
}

impl<S: UserService> AuthGate<S> {
    pub fn new(users: Arc<S>) -> Self {
        Self { users }
    }

    /// Resolves the principal; errors propagate unchanged.
    #[instrument(skip(self, principal), fields(user_id = principal.id))]
    pub async fn resolve(&self, principal: &User) -> Result<Arc<S::Account>> {
        let account = self.users.check_user(principal).await?;
        debug!("step: user resolved");
        Ok(Arc::new(account))
    }

    /// Actions without a role requirement are open to every resolved user.
    pub fn permits(&self, account: &S::Account, action: &Action<S::Account>) -> bool {
        match action.role() {
            None => true,
            Some(role) => {
                let allowed = self.users.check_role(account, role);
                if !allowed {
                    debug!(action = %action.label(), role = %role, "Role requirement not met");
                }
                allowed
            }
        }
    }
}
