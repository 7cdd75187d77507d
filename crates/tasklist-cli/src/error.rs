use std::io;

use tasklist_core::auth::AuthError;
use tasklist_core::TodoId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] tasklist_core::Error),
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No todo title provided")]
    EmptyTitle,
    #[error("The server accepted the todo but returned no row")]
    NothingCreated,
    #[error("Edited todo title cannot be empty")]
    EmptyEditedTitle,
    #[error("Invalid todo ID: {0}")]
    InvalidTodoId(String),
    #[error("Todo not found: {0}")]
    TodoNotFound(TodoId),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Supabase is not configured for profile '{0}'. Run `tasklist config init` or set SUPABASE_URL and SUPABASE_ANON_KEY."
    )]
    NotConfigured(String),
    #[error(
        "Profile '{0}' is not signed in. Run `tasklist auth login --email <email> --password <password>`."
    )]
    NotSignedIn(String),
    /// Message already shown to the user by the screen.
    #[error("{0}")]
    Failed(String),
}
