//! Boundary to the hosted backend.
//!
//! The screens only ever talk to the backend through these two traits, so
//! the same state machines run against Supabase in production and against an
//! in-memory gateway in tests.

mod supabase;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::{AuthError, AuthResult, AuthSession, AuthUser, OAuthProvider, SignUpOutcome};
use crate::models::{NewTodo, Todo, TodoPatch};

pub use supabase::{SupabaseGateway, TODOS_TABLE};

/// Failure of a data call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend answered with an explicit error payload.
    #[error("{message}")]
    Api { status: Option<u16>, message: String },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No signed-in session")]
    Unauthenticated,
    /// Failure that happened before the backend could answer.
    #[error("Request failed: {0}")]
    Transport(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl GatewayError {
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            status: None,
            message: message.into(),
        }
    }

    /// The backend's own message, when the failure was reported by the backend.
    ///
    /// Anything else (transport, decoding, missing session) is an unexpected
    /// failure and returns `None`.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Columns of the `todos` table that filters and orderings may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    UserId,
    CreatedAt,
}

impl Column {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::UserId => "user_id",
            Self::CreatedAt => "created_at",
        }
    }
}

/// Conjunction of equality predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    predicates: Vec<(Column, String)>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn eq(mut self, column: Column, value: impl ToString) -> Self {
        self.predicates.push((column, value.to_string()));
        self
    }

    pub fn predicates(&self) -> &[(Column, String)] {
        &self.predicates
    }

    /// Value the filter requires for `column`, if it constrains it.
    pub fn value_of(&self, column: Column) -> Option<&str> {
        self.predicates
            .iter()
            .find(|(candidate, _)| *candidate == column)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: Column,
    pub ascending: bool,
}

impl Order {
    pub const fn desc(column: Column) -> Self {
        Self {
            column,
            ascending: false,
        }
    }

    pub const fn asc(column: Column) -> Self {
        Self {
            column,
            ascending: true,
        }
    }
}

/// Row operations against the `todos` collection.
#[async_trait]
pub trait TodoGateway: Send + Sync {
    async fn select(&self, filter: &Filter, order: Order) -> GatewayResult<Vec<Todo>>;

    /// Insert rows and return them as created by the backend.
    async fn insert(&self, rows: &[NewTodo]) -> GatewayResult<Vec<Todo>>;

    async fn update(&self, patch: &TodoPatch, filter: &Filter) -> GatewayResult<()>;

    async fn delete(&self, filter: &Filter) -> GatewayResult<()>;
}

/// Authentication operations of the hosted backend.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<AuthSession>;

    /// Start an OAuth sign-in; returns the URL the browser must visit.
    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> AuthResult<String>;

    async fn sign_out(&self) -> AuthResult<()>;

    /// Identity of the signed-in user, or `None` when nobody is signed in.
    async fn current_user(&self) -> AuthResult<Option<AuthUser>>;
}
