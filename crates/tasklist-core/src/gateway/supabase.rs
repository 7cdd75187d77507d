//! Supabase implementation of the gateways: GoTrue for auth, PostgREST for rows.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

use crate::auth::{
    parse_api_error, AuthResult, AuthSession, AuthUser, OAuthProvider, SessionPersistence,
    SignUpOutcome, SupabaseAuthClient,
};
use crate::config::SupabaseConfig;
use crate::gateway::{AuthGateway, Filter, GatewayError, GatewayResult, Order, TodoGateway};
use crate::models::{NewTodo, Todo, TodoPatch};

pub const TODOS_TABLE: &str = "todos";

/// One client for the whole hosted backend, sharing a connection pool and the
/// persisted session between auth and data calls.
#[derive(Clone)]
pub struct SupabaseGateway<S: SessionPersistence> {
    auth: SupabaseAuthClient<S>,
    rest_url: String,
    anon_key: String,
    client: Client,
}

impl<S: SessionPersistence> SupabaseGateway<S> {
    pub fn new(config: &SupabaseConfig, store: S) -> AuthResult<Self> {
        let client = Client::builder().build()?;
        let auth = SupabaseAuthClient::with_client(
            &config.url,
            config.anon_key.clone(),
            store,
            client.clone(),
        )?;

        Ok(Self {
            auth,
            rest_url: normalize_rest_url(&config.url),
            anon_key: config.anon_key.trim().to_string(),
            client,
        })
    }

    pub const fn auth(&self) -> &SupabaseAuthClient<S> {
        &self.auth
    }

    /// Session used for data calls, refreshed when it has expired.
    pub async fn active_session(&self) -> AuthResult<Option<AuthSession>> {
        self.auth.restore_session().await
    }

    pub async fn complete_oauth(&self, callback_url: &str) -> AuthResult<AuthSession> {
        self.auth.complete_oauth(callback_url).await
    }

    fn table_url(&self) -> String {
        format!("{}/{TODOS_TABLE}", self.rest_url)
    }

    async fn authorized(&self, request: RequestBuilder) -> GatewayResult<RequestBuilder> {
        let session = self
            .active_session()
            .await?
            .ok_or(GatewayError::Unauthenticated)?;
        Ok(request
            .header("apikey", &self.anon_key)
            .bearer_auth(session.access_token))
    }

    async fn send(&self, request: RequestBuilder) -> GatewayResult<Response> {
        let response = self.authorized(request).await?.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Api {
            status: Some(status.as_u16()),
            message: parse_api_error(status, &body),
        })
    }
}

#[async_trait]
impl<S: SessionPersistence> TodoGateway for SupabaseGateway<S> {
    async fn select(&self, filter: &Filter, order: Order) -> GatewayResult<Vec<Todo>> {
        let mut query = vec![("select".to_string(), "*".to_string())];
        query.extend(filter_query(filter));
        query.push(("order".to_string(), order_query(order)));

        let request = self.client.get(self.table_url()).query(&query);
        let response = self.send(request).await?;
        Ok(response.json::<Vec<Todo>>().await?)
    }

    async fn insert(&self, rows: &[NewTodo]) -> GatewayResult<Vec<Todo>> {
        let request = self
            .client
            .post(self.table_url())
            .query(&[("select", "*")])
            .header("Prefer", "return=representation")
            .json(rows);
        let response = self.send(request).await?;
        Ok(response.json::<Vec<Todo>>().await?)
    }

    async fn update(&self, patch: &TodoPatch, filter: &Filter) -> GatewayResult<()> {
        let request = self
            .client
            .patch(self.table_url())
            .query(&filter_query(filter))
            .header("Prefer", "return=minimal")
            .json(patch);
        self.send(request).await?;
        Ok(())
    }

    async fn delete(&self, filter: &Filter) -> GatewayResult<()> {
        let request = self
            .client
            .delete(self.table_url())
            .query(&filter_query(filter))
            .header("Prefer", "return=minimal");
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl<S: SessionPersistence> AuthGateway for SupabaseGateway<S> {
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        self.auth.sign_up(email, password).await
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        self.auth.sign_in(email, password).await
    }

    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> AuthResult<String> {
        self.auth.authorize_url(provider, redirect_to)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        match self.auth.store().load_session()? {
            Some(session) => self.auth.sign_out(&session.access_token).await,
            None => self.auth.store().clear_session(),
        }
    }

    async fn current_user(&self) -> AuthResult<Option<AuthUser>> {
        let Some(session) = self.active_session().await? else {
            return Ok(None);
        };
        self.auth.get_user(&session.access_token).await
    }
}

/// PostgREST endpoint for a project URL.
pub fn normalize_rest_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.ends_with("/rest/v1") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/rest/v1")
    }
}

fn filter_query(filter: &Filter) -> Vec<(String, String)> {
    filter
        .predicates()
        .iter()
        .map(|(column, value)| (column.as_str().to_string(), format!("eq.{value}")))
        .collect()
}

fn order_query(order: Order) -> String {
    let direction = if order.ascending { "asc" } else { "desc" };
    format!("{}.{direction}", order.column.as_str())
}
