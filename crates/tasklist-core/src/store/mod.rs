//! Todo list store.
//!
//! Owns the signed-in user's snapshot and keeps it a reflection of confirmed
//! remote state: every mutator calls the gateway first and patches the local
//! records only after the call succeeded. Failures never escape a mutator;
//! they become an error banner plus a destructive toast.

mod snapshot;

pub use snapshot::Snapshot;

use crate::gateway::{Column, Filter, GatewayError, Order, TodoGateway};
use crate::models::{NewTodo, Todo, TodoId, TodoPatch};
use crate::notify::{Toast, Toaster};
use crate::screens::item::ItemIntent;
use crate::util::is_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Fetch,
    Add,
    Edit,
    Toggle(bool),
    Delete,
}

impl Operation {
    const fn noun(self) -> &'static str {
        match self {
            Self::Fetch => "fetching todos",
            Self::Add => "adding todo",
            Self::Edit => "editing todo",
            Self::Toggle(_) => "updating todo",
            Self::Delete => "deleting todo",
        }
    }

    fn failure_message(self, remote: &str) -> String {
        let action = match self {
            Self::Fetch => "fetch todos",
            Self::Add => "add todo",
            Self::Edit => "edit todo",
            Self::Toggle(_) => "update todo",
            Self::Delete => "delete todo",
        };
        format!("Failed to {action}: {remote}")
    }

    fn failure_toast(self, remote: &str) -> String {
        match self {
            Self::Toggle(_) => format!("Failed to update todo status: {remote}"),
            _ => self.failure_message(remote),
        }
    }

    fn unexpected_message(self) -> String {
        format!("An unexpected error occurred while {}", self.noun())
    }

    fn success_message(self) -> Option<String> {
        match self {
            Self::Fetch => None,
            Self::Add => Some("Todo added successfully".to_string()),
            Self::Edit => Some("Todo updated successfully".to_string()),
            Self::Toggle(true) => Some("Todo marked as completed".to_string()),
            Self::Toggle(false) => Some("Todo marked as incomplete".to_string()),
            Self::Delete => Some("Todo deleted successfully".to_string()),
        }
    }
}

pub struct TodoListStore<G> {
    gateway: G,
    user_id: String,
    snapshot: Snapshot,
    draft: String,
    error: Option<String>,
    toaster: Toaster,
}

impl<G: TodoGateway> TodoListStore<G> {
    /// Empty store for `user_id`; call [`Self::load`] to fill it.
    pub fn new(gateway: G, user_id: impl Into<String>) -> Self {
        Self {
            gateway,
            user_id: user_id.into(),
            snapshot: Snapshot::default(),
            draft: String::new(),
            error: None,
            toaster: Toaster::default(),
        }
    }

    /// Replace the snapshot with the user's rows, newest first.
    ///
    /// On failure the previous snapshot is kept.
    pub async fn load(&mut self) -> bool {
        let filter = Filter::new().eq(Column::UserId, &self.user_id);
        match self
            .gateway
            .select(&filter, Order::desc(Column::CreatedAt))
            .await
        {
            Ok(rows) => {
                tracing::debug!(count = rows.len(), "Loaded todos");
                self.snapshot = Snapshot::from_rows(rows);
                self.record_success(Operation::Fetch);
                true
            }
            Err(error) => {
                self.record_failure(Operation::Fetch, &error);
                false
            }
        }
    }

    /// Create a todo and prepend the rows the gateway returned.
    ///
    /// Returns those rows, or `None` when the title is blank or the call
    /// failed. Blank titles never reach the gateway. A successful add clears
    /// the draft even when `title` did not come from it.
    pub async fn add(&mut self, title: &str) -> Option<Vec<Todo>> {
        if is_blank(title) {
            return None;
        }

        let row = NewTodo::new(title, self.user_id.clone());
        match self.gateway.insert(std::slice::from_ref(&row)).await {
            Ok(created) => {
                self.snapshot.prepend(created.clone());
                self.draft.clear();
                self.record_success(Operation::Add);
                Some(created)
            }
            Err(error) => {
                self.record_failure(Operation::Add, &error);
                None
            }
        }
    }

    /// Add whatever is in the input field.
    pub async fn submit_draft(&mut self) -> Option<Vec<Todo>> {
        let title = self.draft.clone();
        self.add(&title).await
    }

    /// Rename a todo. Blank titles are rejected locally, like [`Self::add`].
    pub async fn edit(&mut self, id: TodoId, new_title: &str) -> bool {
        if is_blank(new_title) {
            return false;
        }
        self.update(id, TodoPatch::title(new_title), Operation::Edit)
            .await
    }

    pub async fn toggle(&mut self, id: TodoId, is_completed: bool) -> bool {
        self.update(
            id,
            TodoPatch::completed(is_completed),
            Operation::Toggle(is_completed),
        )
        .await
    }

    pub async fn delete(&mut self, id: TodoId) -> bool {
        match self.gateway.delete(&self.owned(id)).await {
            Ok(()) => {
                self.snapshot.remove(id);
                self.record_success(Operation::Delete);
                true
            }
            Err(error) => {
                self.record_failure(Operation::Delete, &error);
                false
            }
        }
    }

    /// Route an intent reported by an item view to its mutator.
    pub async fn dispatch(&mut self, intent: ItemIntent) -> bool {
        match intent {
            ItemIntent::Toggle { id, is_completed } => self.toggle(id, is_completed).await,
            ItemIntent::Edit { id, title } => self.edit(id, &title).await,
            ItemIntent::Delete { id } => self.delete(id).await,
        }
    }

    async fn update(&mut self, id: TodoId, patch: TodoPatch, operation: Operation) -> bool {
        match self.gateway.update(&patch, &self.owned(id)).await {
            Ok(()) => {
                self.snapshot.patch(id, &patch);
                self.record_success(operation);
                true
            }
            Err(error) => {
                self.record_failure(operation, &error);
                false
            }
        }
    }

    /// Ownership filter applied to every mutation.
    fn owned(&self, id: TodoId) -> Filter {
        Filter::new()
            .eq(Column::Id, id)
            .eq(Column::UserId, &self.user_id)
    }

    fn record_success(&mut self, operation: Operation) {
        self.error = None;
        if let Some(description) = operation.success_message() {
            self.toaster.push(Toast::success(description));
        }
    }

    fn record_failure(&mut self, operation: Operation, error: &GatewayError) {
        let (message, toast) = if let Some(remote) = error.remote_message() {
            tracing::error!("Error {}: {}", operation.noun(), remote);
            (
                operation.failure_message(remote),
                operation.failure_toast(remote),
            )
        } else {
            tracing::error!("Unexpected error {}: {}", operation.noun(), error);
            let message = operation.unexpected_message();
            (message.clone(), message)
        };
        self.error = Some(message);
        self.toaster.push(Toast::error(toast));
    }
}

impl<G> TodoListStore<G> {
    pub fn todos(&self) -> impl Iterator<Item = &Todo> + '_ {
        self.snapshot.iter()
    }

    pub const fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.snapshot.get(id)
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.snapshot.iter().filter(|todo| todo.is_completed).count()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// Current error banner, cleared by the next successful operation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn take_toasts(&mut self) -> Vec<Toast> {
        self.toaster.drain()
    }
}
