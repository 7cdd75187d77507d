//! Gate in front of the list screen.

use crate::auth::AuthUser;
use crate::gateway::AuthGateway;
use crate::screens::Route;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GuardState {
    #[default]
    Checking,
    Redirected,
    Authenticated(AuthUser),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Redirect(Route),
    Authenticated(AuthUser),
}

/// Asks the auth gateway for the current user once per mount.
///
/// Later checks replay the first answer without another query.
#[derive(Debug, Clone, Default)]
pub struct SessionGuard {
    state: GuardState,
    checked: bool,
}

impl SessionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn check<A: AuthGateway + ?Sized>(&mut self, auth: &A) -> GuardOutcome {
        if !self.checked {
            self.checked = true;
            self.state = match auth.current_user().await {
                Ok(Some(user)) => {
                    tracing::debug!(user_id = %user.id, "Session found");
                    GuardState::Authenticated(user)
                }
                Ok(None) => {
                    tracing::info!("No active session, redirecting to {}", Route::Auth.path());
                    GuardState::Redirected
                }
                Err(error) => {
                    tracing::error!("Error checking auth status: {error}");
                    GuardState::Redirected
                }
            };
        }

        match &self.state {
            GuardState::Authenticated(user) => GuardOutcome::Authenticated(user.clone()),
            GuardState::Checking | GuardState::Redirected => GuardOutcome::Redirect(Route::Auth),
        }
    }

    pub const fn state(&self) -> &GuardState {
        &self.state
    }

    /// True until the first check has finished.
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, GuardState::Checking)
    }

    pub const fn identity(&self) -> Option<&AuthUser> {
        match &self.state {
            GuardState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}
