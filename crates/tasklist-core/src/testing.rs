//! In-memory gateway for tests.
//!
//! Behaves like the hosted backend with row-level security: every row has an
//! owner, filters are equality predicates, inserted rows get increasing ids
//! and creation times. Calls are recorded and failures can be queued.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::auth::{AuthError, AuthResult, AuthSession, AuthUser, OAuthProvider, SignUpOutcome};
use crate::gateway::{
    AuthGateway, Column, Filter, GatewayError, GatewayResult, Order, TodoGateway,
};
use crate::models::{NewTodo, Todo, TodoId, TodoPatch};

/// Recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Select(Filter),
    Insert(Vec<NewTodo>),
    Update(TodoPatch, Filter),
    Delete(Filter),
    SignUp(String),
    SignIn(String),
    OAuth(OAuthProvider),
    SignOut,
    CurrentUser,
}

impl Call {
    pub const fn is_data_call(&self) -> bool {
        matches!(
            self,
            Self::Select(_) | Self::Insert(_) | Self::Update(..) | Self::Delete(_)
        )
    }
}

/// Queued failure for the next call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The backend answers with an explicit error message.
    Remote(String),
    /// The call fails before the backend answers.
    Unexpected(String),
}

#[derive(Debug)]
struct State {
    rows: Vec<Todo>,
    next_id: i64,
    epoch: DateTime<Utc>,
    ticks: i64,
    accounts: HashMap<String, (String, AuthUser)>,
    auto_confirm: bool,
    minimal_inserts: bool,
    current_user: Option<AuthUser>,
    calls: Vec<Call>,
    failures: VecDeque<Failure>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
            epoch: DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default(),
            ticks: 0,
            accounts: HashMap::new(),
            auto_confirm: false,
            minimal_inserts: false,
            current_user: None,
            calls: Vec::new(),
            failures: VecDeque::new(),
        }
    }
}

impl State {
    fn next_created_at(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        self.epoch + Duration::seconds(self.ticks)
    }

    fn create_row(&mut self, title: &str, is_completed: bool, user_id: &str) -> Todo {
        let todo = Todo {
            id: TodoId::new(self.next_id),
            title: title.to_string(),
            is_completed,
            user_id: user_id.to_string(),
            created_at: self.next_created_at(),
        };
        self.next_id += 1;
        self.rows.push(todo.clone());
        todo
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<State>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway with `user_id` already signed in.
    pub fn signed_in(user_id: &str) -> Self {
        let gateway = Self::default();
        gateway.state().current_user = Some(test_user(user_id));
        gateway
    }

    /// Insert a row directly, bypassing call recording.
    pub fn seed(&self, user_id: &str, title: &str, is_completed: bool) -> Todo {
        self.state().create_row(title, is_completed, user_id)
    }

    pub fn register_account(&self, email: &str, password: &str, user_id: &str) {
        let mut user = test_user(user_id);
        user.email = Some(email.to_string());
        self.state()
            .accounts
            .insert(email.to_string(), (password.to_string(), user));
    }

    pub fn set_auto_confirm(&self, auto_confirm: bool) {
        self.state().auto_confirm = auto_confirm;
    }

    /// Store inserted rows but answer with none, like `return=minimal`.
    pub fn set_minimal_inserts(&self, minimal: bool) {
        self.state().minimal_inserts = minimal;
    }

    pub fn fail_next(&self, failure: Failure) {
        self.state().failures.push_back(failure);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn data_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(Call::is_data_call)
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.state().current_user.as_ref().map(|user| user.id.clone())
    }

    /// What the backend would return to `user_id` for a newest-first select.
    pub fn rows_for(&self, user_id: &str) -> Vec<Todo> {
        let mut rows = self
            .state()
            .rows
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect::<Vec<_>>();
        rows.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        rows
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn begin(&self, call: Call) -> Option<Failure> {
        let mut state = self.state();
        state.calls.push(call);
        state.failures.pop_front()
    }

    fn begin_data(&self, call: Call) -> GatewayResult<()> {
        match self.begin(call) {
            None => Ok(()),
            Some(Failure::Remote(message)) => Err(GatewayError::api(message)),
            Some(Failure::Unexpected(message)) => Err(GatewayError::Transport(message)),
        }
    }

    fn begin_auth(&self, call: Call) -> AuthResult<()> {
        match self.begin(call) {
            None => Ok(()),
            Some(Failure::Remote(message)) => Err(AuthError::Api(message)),
            Some(Failure::Unexpected(message)) => Err(AuthError::SecureStorage(message)),
        }
    }
}

fn test_user(user_id: &str) -> AuthUser {
    AuthUser {
        id: user_id.to_string(),
        email: None,
        provider: Some("email".to_string()),
    }
}

fn test_session(user: AuthUser) -> AuthSession {
    AuthSession {
        access_token: format!("access-{}", user.id),
        refresh_token: format!("refresh-{}", user.id),
        expires_at: crate::util::unix_timestamp_now() + 3600,
        user,
    }
}

fn matches(row: &Todo, filter: &Filter) -> bool {
    filter.predicates().iter().all(|(column, value)| match column {
        Column::Id => row.id.to_string() == *value,
        Column::UserId => row.user_id == *value,
        Column::CreatedAt => row.created_at.to_rfc3339() == *value,
    })
}

#[async_trait]
impl TodoGateway for InMemoryGateway {
    async fn select(&self, filter: &Filter, order: Order) -> GatewayResult<Vec<Todo>> {
        self.begin_data(Call::Select(filter.clone()))?;
        let mut rows = self
            .state()
            .rows
            .iter()
            .filter(|row| matches(row, filter))
            .cloned()
            .collect::<Vec<_>>();
        rows.sort_by(|left, right| {
            let ordering = match order.column {
                Column::Id => left.id.cmp(&right.id),
                Column::UserId => left.user_id.cmp(&right.user_id),
                Column::CreatedAt => left.created_at.cmp(&right.created_at),
            };
            if order.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
        Ok(rows)
    }

    async fn insert(&self, rows: &[NewTodo]) -> GatewayResult<Vec<Todo>> {
        self.begin_data(Call::Insert(rows.to_vec()))?;
        let mut state = self.state();
        let created: Vec<Todo> = rows
            .iter()
            .map(|row| state.create_row(&row.title, row.is_completed, &row.user_id))
            .collect();
        if state.minimal_inserts {
            return Ok(Vec::new());
        }
        Ok(created)
    }

    async fn update(&self, patch: &TodoPatch, filter: &Filter) -> GatewayResult<()> {
        self.begin_data(Call::Update(patch.clone(), filter.clone()))?;
        self.state()
            .rows
            .iter_mut()
            .filter(|row| matches(row, filter))
            .for_each(|row| row.apply(patch));
        Ok(())
    }

    async fn delete(&self, filter: &Filter) -> GatewayResult<()> {
        self.begin_data(Call::Delete(filter.clone()))?;
        self.state().rows.retain(|row| !matches(row, filter));
        Ok(())
    }
}

#[async_trait]
impl AuthGateway for InMemoryGateway {
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        self.begin_auth(Call::SignUp(email.to_string()))?;
        let mut state = self.state();
        if state.accounts.contains_key(email) {
            return Err(AuthError::Api("User already registered".to_string()));
        }

        let mut user = test_user(&format!("user-{}", state.accounts.len() + 1));
        user.email = Some(email.to_string());
        state
            .accounts
            .insert(email.to_string(), (password.to_string(), user.clone()));

        if state.auto_confirm {
            state.current_user = Some(user.clone());
            Ok(SignUpOutcome::SignedIn(test_session(user)))
        } else {
            Ok(SignUpOutcome::ConfirmationRequired)
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        self.begin_auth(Call::SignIn(email.to_string()))?;
        let mut state = self.state();
        let user = match state.accounts.get(email) {
            Some((expected, user)) if expected == password => user.clone(),
            _ => return Err(AuthError::Api("Invalid login credentials".to_string())),
        };
        state.current_user = Some(user.clone());
        Ok(test_session(user))
    }

    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> AuthResult<String> {
        self.begin_auth(Call::OAuth(provider))?;
        Ok(format!(
            "https://auth.invalid/authorize?provider={provider}&redirect_to={redirect_to}"
        ))
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.begin_auth(Call::SignOut)?;
        self.state().current_user = None;
        Ok(())
    }

    async fn current_user(&self) -> AuthResult<Option<AuthUser>> {
        self.begin_auth(Call::CurrentUser)?;
        Ok(self.state().current_user.clone())
    }
}
