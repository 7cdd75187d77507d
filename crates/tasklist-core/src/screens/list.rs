//! Guarded list screen: session check, then the todo store.

use crate::auth::AuthUser;
use crate::gateway::{AuthGateway, TodoGateway};
use crate::notify::Toast;
use crate::screens::guard::{GuardOutcome, SessionGuard};
use crate::screens::item::TodoItemView;
use crate::screens::Route;
use crate::store::TodoListStore;

pub const EMPTY_LIST_MESSAGE: &str = "No todos yet. Add some tasks to get started!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Loading,
    Redirected(Route),
    Ready,
}

pub struct ListScreen<G> {
    gateway: G,
    guard: SessionGuard,
    store: Option<TodoListStore<G>>,
    phase: ListPhase,
    logout_error: Option<String>,
}

impl<G> ListScreen<G>
where
    G: AuthGateway + TodoGateway + Clone,
{
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            guard: SessionGuard::new(),
            store: None,
            phase: ListPhase::Loading,
            logout_error: None,
        }
    }

    /// Run the session check and, when it passes, the initial load.
    ///
    /// No data is fetched for a redirected visitor.
    pub async fn mount(&mut self) -> ListPhase {
        if self.phase != ListPhase::Loading {
            return self.phase;
        }

        self.phase = match self.guard.check(&self.gateway).await {
            GuardOutcome::Redirect(route) => ListPhase::Redirected(route),
            GuardOutcome::Authenticated(user) => {
                let mut store = TodoListStore::new(self.gateway.clone(), user.id);
                store.load().await;
                self.store = Some(store);
                ListPhase::Ready
            }
        };
        self.phase
    }

    /// Sign out; navigates to the auth screen only when it succeeded.
    ///
    /// Works before [`Self::mount`] too; the failure then lands in
    /// [`Self::error`] without a store.
    pub async fn logout(&mut self) -> Option<Route> {
        match self.gateway.sign_out().await {
            Ok(()) => {
                tracing::info!("Signed out");
                self.store = None;
                self.logout_error = None;
                self.phase = ListPhase::Redirected(Route::Auth);
                Some(Route::Auth)
            }
            Err(error) => {
                tracing::error!("Error logging out: {error}");
                match self.store.as_mut() {
                    Some(store) => store.set_error(error.to_string()),
                    None => self.logout_error = Some(error.to_string()),
                }
                None
            }
        }
    }
}

impl<G> ListScreen<G> {
    pub const fn phase(&self) -> ListPhase {
        self.phase
    }

    pub const fn identity(&self) -> Option<&AuthUser> {
        self.guard.identity()
    }

    pub const fn store(&self) -> Option<&TodoListStore<G>> {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> Option<&mut TodoListStore<G>> {
        self.store.as_mut()
    }

    pub fn error(&self) -> Option<&str> {
        self.store
            .as_ref()
            .and_then(TodoListStore::error)
            .or(self.logout_error.as_deref())
    }

    pub fn item_views(&self) -> Vec<TodoItemView> {
        self.store
            .as_ref()
            .map(|store| store.todos().map(TodoItemView::new).collect())
            .unwrap_or_default()
    }

    /// `"{done} of {total} tasks completed"`, or `None` for an empty list.
    pub fn summary(&self) -> Option<String> {
        let store = self.store.as_ref()?;
        if store.is_empty() {
            return None;
        }
        Some(format!(
            "{} of {} tasks completed",
            store.completed_count(),
            store.len()
        ))
    }

    pub fn take_toasts(&mut self) -> Vec<Toast> {
        self.store
            .as_mut()
            .map(TodoListStore::take_toasts)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::{Call, Failure, InMemoryGateway};

    #[tokio::test]
    async fn redirected_visitor_triggers_no_data_calls() {
        let gateway = InMemoryGateway::new();
        gateway.seed("user-1", "Someone else's", false);
        let mut screen = ListScreen::new(gateway.clone());
        assert_eq!(screen.phase(), ListPhase::Loading);

        assert_eq!(screen.mount().await, ListPhase::Redirected(Route::Auth));
        assert_eq!(gateway.calls(), vec![Call::CurrentUser]);
        assert!(screen.store().is_none());
        assert!(screen.item_views().is_empty());
    }

    #[tokio::test]
    async fn mount_loads_user_rows_once() {
        let gateway = InMemoryGateway::signed_in("user-1");
        gateway.seed("user-1", "Mine", true);
        gateway.seed("user-2", "Theirs", false);
        gateway.seed("user-1", "Also mine", false);
        let mut screen = ListScreen::new(gateway.clone());

        assert_eq!(screen.mount().await, ListPhase::Ready);
        assert_eq!(screen.mount().await, ListPhase::Ready);

        let labels = screen
            .item_views()
            .iter()
            .map(TodoItemView::label)
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["[ ] Also mine", "[x] Mine"]);
        assert_eq!(screen.summary().as_deref(), Some("1 of 2 tasks completed"));
        assert_eq!(
            gateway
                .calls()
                .iter()
                .filter(|call| matches!(call, Call::CurrentUser | Call::Select(_)))
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn empty_list_has_no_summary() {
        let gateway = InMemoryGateway::signed_in("user-1");
        let mut screen = ListScreen::new(gateway);
        screen.mount().await;

        assert_eq!(screen.summary(), None);
        assert!(screen.store().is_some_and(TodoListStore::is_empty));
    }

    #[tokio::test]
    async fn logout_navigates_to_auth() {
        let gateway = InMemoryGateway::signed_in("user-1");
        let mut screen = ListScreen::new(gateway.clone());
        screen.mount().await;

        assert_eq!(screen.logout().await, Some(Route::Auth));
        assert_eq!(screen.phase(), ListPhase::Redirected(Route::Auth));
        assert_eq!(gateway.current_user_id(), None);
    }

    #[tokio::test]
    async fn failed_logout_stays_and_shows_error() {
        let gateway = InMemoryGateway::signed_in("user-1");
        let mut screen = ListScreen::new(gateway.clone());
        screen.mount().await;
        gateway.fail_next(Failure::Remote("Session expired".to_string()));

        assert_eq!(screen.logout().await, None);
        assert_eq!(screen.phase(), ListPhase::Ready);
        assert_eq!(screen.error(), Some("Session expired"));
    }

    #[tokio::test]
    async fn logout_without_mount_reports_failure() {
        let gateway = InMemoryGateway::signed_in("user-1");
        gateway.fail_next(Failure::Unexpected("keychain locked".to_string()));
        let mut screen = ListScreen::new(gateway.clone());

        assert_eq!(screen.logout().await, None);
        assert_eq!(screen.error(), Some("Secure storage error: keychain locked"));
        assert_eq!(gateway.calls(), vec![Call::SignOut]);
    }
}
