//! Screen-level state machines: authentication, the guarded list, and the
//! per-item view.

pub mod auth;
pub mod guard;
pub mod item;
pub mod list;

pub use auth::{AuthForm, AuthIntent, AuthMode, AuthOutcome, AuthScreen, Credentials};
pub use guard::{GuardOutcome, SessionGuard};
pub use item::{ItemIntent, TodoItemView};
pub use list::{ListPhase, ListScreen};

/// Navigation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Auth,
    List,
}

impl Route {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Auth => "/auth",
            Self::List => "/",
        }
    }
}
