//! Supabase auth client logic shared by every tasklist client.

use std::collections::HashMap;
use std::fmt;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::util::{compact_text, unix_timestamp_now};

const EXPIRY_SKEW_SECONDS: i64 = 60;

/// Identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    /// Sign-in provider recorded by the auth service (`email`, `google`, ...).
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub user: AuthUser,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    ConfirmationRequired,
}

/// OAuth identity providers offered on the auth screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OAuthProvider {
    Google,
    GitHub,
}

impl OAuthProvider {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::GitHub => "github",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::GitHub => "GitHub",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Supabase auth is not configured for this build.")]
    NotConfigured,
    #[error("Invalid auth configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    /// Message reported by the auth service, shown to users verbatim.
    #[error("{0}")]
    Api(String),
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> AuthResult<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> AuthResult<()>;
    fn clear_session(&self) -> AuthResult<()>;
}

#[derive(Clone)]
pub struct SupabaseAuthClient<S: SessionPersistence> {
    auth_url: String,
    anon_key: String,
    client: Client,
    store: S,
}

impl<S: SessionPersistence> SupabaseAuthClient<S> {
    pub fn new(url: impl AsRef<str>, anon_key: impl Into<String>, store: S) -> AuthResult<Self> {
        Self::with_client(url, anon_key, store, Client::builder().build()?)
    }

    /// Build a client that shares an existing HTTP connection pool.
    pub fn with_client(
        url: impl AsRef<str>,
        anon_key: impl Into<String>,
        store: S,
        client: Client,
    ) -> AuthResult<Self> {
        let auth_url = normalize_auth_url(url.as_ref())?;
        let anon_key = anon_key.into().trim().to_string();
        if anon_key.is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Supabase anon key must not be empty",
            ));
        }

        Ok(Self {
            auth_url,
            anon_key,
            client,
            store,
        })
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Load the persisted session, refreshing it when it has expired.
    ///
    /// A failed refresh clears the stored session and reports "signed out".
    pub async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        let Some(stored_session) = self.store.load_session()? else {
            return Ok(None);
        };

        if !stored_session.is_expired() {
            return Ok(Some(stored_session));
        }

        match self.refresh_session(&stored_session.refresh_token).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(error) => {
                tracing::warn!("Failed to refresh persisted session: {}", error);
                self.store.clear_session()?;
                Ok(None)
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        validate_credentials(email, password)?;

        let payload = serde_json::json!({
            "email": email,
            "password": password,
        });
        let request = self.public_request(
            self.client
                .post(format!("{}/signup", self.auth_url))
                .json(&payload),
        );
        let response = self.send_auth_request(request).await?;
        match response.into_session()? {
            Some(session) => {
                self.store.save_session(&session)?;
                Ok(SignUpOutcome::SignedIn(session))
            }
            None => Ok(SignUpOutcome::ConfirmationRequired),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        validate_credentials(email, password)?;

        let payload = serde_json::json!({
            "email": email,
            "password": password,
        });
        let request = self.public_request(
            self.client
                .post(format!("{}/token", self.auth_url))
                .query(&[("grant_type", "password")])
                .json(&payload),
        );

        let response = self.send_auth_request(request).await?;
        let session = response.into_session()?.ok_or_else(|| {
            AuthError::Api("Sign-in response did not include an active session".to_string())
        })?;

        self.store.save_session(&session)?;
        Ok(session)
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> AuthResult<AuthSession> {
        if refresh_token.trim().is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Refresh token must not be empty",
            ));
        }

        let payload = serde_json::json!({
            "refresh_token": refresh_token,
        });
        let request = self.public_request(
            self.client
                .post(format!("{}/token", self.auth_url))
                .query(&[("grant_type", "refresh_token")])
                .json(&payload),
        );
        let response = self.send_auth_request(request).await?;
        let session = response.into_session()?.ok_or_else(|| {
            AuthError::Api("Refresh response did not include an active session".to_string())
        })?;

        self.store.save_session(&session)?;
        Ok(session)
    }

    pub async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        let request = self
            .client
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token);

        let response = request.send().await?;
        if !(response.status().is_success() || response.status() == StatusCode::UNAUTHORIZED) {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_api_error(status, &body)));
        }

        self.store.clear_session()?;
        Ok(())
    }

    /// Fetch the user behind an access token.
    ///
    /// Returns `Ok(None)` when the service rejects the token.
    pub async fn get_user(&self, access_token: &str) -> AuthResult<Option<AuthUser>> {
        let response = self
            .client
            .get(format!("{}/user", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_api_error(status, &body)));
        }

        let user = response.json::<SupabaseUser>().await?;
        Ok(Some(user.into()))
    }

    /// Provider consent URL the browser is sent to for an OAuth sign-in.
    pub fn authorize_url(&self, provider: OAuthProvider, redirect_to: &str) -> AuthResult<String> {
        let redirect_to = redirect_to.trim();
        if redirect_to.is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "OAuth redirect URL must not be empty",
            ));
        }

        let mut url = Url::parse(&format!("{}/authorize", self.auth_url))
            .map_err(|_| AuthError::InvalidConfiguration("Supabase URL is not a valid URL"))?;
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str())
            .append_pair("redirect_to", redirect_to);
        Ok(url.into())
    }

    /// Turn the URL the provider redirected back to into a stored session.
    pub async fn complete_oauth(&self, callback_url: &str) -> AuthResult<AuthSession> {
        let tokens = parse_oauth_callback(callback_url)?;
        let user = self.get_user(&tokens.access_token).await?.ok_or_else(|| {
            AuthError::Api("OAuth access token was rejected by the auth service".to_string())
        })?;

        let session = AuthSession {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: tokens.expires_at,
            user,
        };
        self.store.save_session(&session)?;
        Ok(session)
    }

    fn public_request(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
    }

    async fn send_auth_request(&self, request: RequestBuilder) -> AuthResult<SupabaseAuthResponse> {
        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_api_error(status, &body)));
        }
        Ok(response.json::<SupabaseAuthResponse>().await?)
    }
}

pub fn normalize_auth_url(url: &str) -> AuthResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(AuthError::InvalidConfiguration(
            "Supabase URL must not be empty",
        ));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(AuthError::InvalidConfiguration(
            "Supabase URL must include http:// or https://",
        ));
    }
    if trimmed.ends_with("/auth/v1") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/auth/v1"))
    }
}

fn validate_credentials(email: &str, password: &str) -> AuthResult<()> {
    if email.trim().is_empty() {
        return Err(AuthError::Api("Email is required".to_string()));
    }
    if password.trim().is_empty() {
        return Err(AuthError::Api("Password is required".to_string()));
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
struct OAuthCallbackTokens {
    access_token: String,
    refresh_token: String,
    expires_at: i64,
}

/// Read tokens (or the provider's error) from an implicit-flow redirect URL.
fn parse_oauth_callback(callback_url: &str) -> AuthResult<OAuthCallbackTokens> {
    let url = Url::parse(callback_url.trim())
        .map_err(|_| AuthError::Api("OAuth callback is not a valid URL".to_string()))?;

    let mut params = url
        .query_pairs()
        .into_owned()
        .collect::<HashMap<String, String>>();
    if let Some(fragment) = url.fragment() {
        params.extend(url::form_urlencoded::parse(fragment.as_bytes()).into_owned());
    }

    if let Some(message) = params
        .get("error_description")
        .or_else(|| params.get("error"))
    {
        return Err(AuthError::Api(message.trim().to_string()));
    }

    let take = |key: &str| {
        params
            .get(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };
    let access_token = take("access_token");
    let refresh_token = take("refresh_token");
    let expires_at = take("expires_at")
        .and_then(|value| value.parse::<i64>().ok())
        .or_else(|| {
            take("expires_in")
                .and_then(|value| value.parse::<i64>().ok())
                .map(|expires_in| unix_timestamp_now().saturating_add(expires_in))
        });

    match (access_token, refresh_token, expires_at) {
        (Some(access_token), Some(refresh_token), Some(expires_at)) => Ok(OAuthCallbackTokens {
            access_token,
            refresh_token,
            expires_at,
        }),
        _ => Err(AuthError::Api(
            "OAuth callback did not include session tokens".to_string(),
        )),
    }
}

#[derive(Debug, Deserialize)]
struct SupabaseAuthResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<SupabaseUser>,
    session: Option<SupabaseAuthResponseSession>,
}

impl SupabaseAuthResponse {
    fn into_session(self) -> AuthResult<Option<AuthSession>> {
        let nested_session = self.session;
        let access_token = self.access_token.or_else(|| {
            nested_session
                .as_ref()
                .and_then(|session| session.access_token.clone())
        });
        let refresh_token = self.refresh_token.or_else(|| {
            nested_session
                .as_ref()
                .and_then(|session| session.refresh_token.clone())
        });
        let expires_at = self
            .expires_at
            .or_else(|| {
                nested_session
                    .as_ref()
                    .and_then(|session| session.expires_at)
            })
            .or_else(|| {
                self.expires_in
                    .or_else(|| {
                        nested_session
                            .as_ref()
                            .and_then(|session| session.expires_in)
                    })
                    .map(|expires_in| unix_timestamp_now().saturating_add(expires_in))
            });
        let user = self
            .user
            .or_else(|| nested_session.and_then(|session| session.user))
            .map(Into::into);

        match (access_token, refresh_token, expires_at, user) {
            (Some(access_token), Some(refresh_token), Some(expires_at), Some(user)) => {
                Ok(Some(AuthSession {
                    access_token,
                    refresh_token,
                    expires_at,
                    user,
                }))
            }
            (None, None, None, Some(_)) => Ok(None),
            _ => Err(AuthError::Api(
                "Auth response did not include enough session fields".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SupabaseAuthResponseSession {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<SupabaseUser>,
}

#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: String,
    email: Option<String>,
    #[serde(default)]
    app_metadata: Option<SupabaseAppMetadata>,
}

#[derive(Debug, Deserialize)]
struct SupabaseAppMetadata {
    provider: Option<String>,
}

impl From<SupabaseUser> for AuthUser {
    fn from(value: SupabaseUser) -> Self {
        Self {
            id: value.id,
            email: value.email,
            provider: value.app_metadata.and_then(|metadata| metadata.provider),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SupabaseErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
    msg: Option<String>,
}

/// Extract the human-readable message from an auth or REST error body.
pub(crate) fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<SupabaseErrorResponse>(body) {
        if let Some(message) = payload
            .message
            .or(payload.msg)
            .or(payload.error_description)
            .or(payload.error)
        {
            return message.trim().to_string();
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct MemorySessionStore {
        session: Arc<Mutex<Option<AuthSession>>>,
    }

    impl SessionPersistence for MemorySessionStore {
        fn load_session(&self) -> AuthResult<Option<AuthSession>> {
            Ok(self.session.lock().unwrap().clone())
        }

        fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
            *self.session.lock().unwrap() = Some(session.clone());
            Ok(())
        }

        fn clear_session(&self) -> AuthResult<()> {
            *self.session.lock().unwrap() = None;
            Ok(())
        }
    }

    fn client() -> SupabaseAuthClient<MemorySessionStore> {
        SupabaseAuthClient::new(
            "https://demo.supabase.co",
            "anon",
            MemorySessionStore::default(),
        )
        .unwrap()
    }

    #[test]
    fn normalize_auth_url_appends_auth_path() {
        let normalized = normalize_auth_url("https://demo.supabase.co").unwrap();
        assert_eq!(normalized, "https://demo.supabase.co/auth/v1");
    }

    #[test]
    fn normalize_auth_url_keeps_existing_auth_path() {
        let normalized = normalize_auth_url("https://demo.supabase.co/auth/v1").unwrap();
        assert_eq!(normalized, "https://demo.supabase.co/auth/v1");
    }

    #[test]
    fn new_rejects_blank_anon_key() {
        let result =
            SupabaseAuthClient::new("https://demo.supabase.co", "  ", MemorySessionStore::default());
        assert!(matches!(result, Err(AuthError::InvalidConfiguration(_))));
    }

    #[test]
    fn response_without_session_fields_means_confirmation_required() {
        let response = SupabaseAuthResponse {
            access_token: None,
            refresh_token: None,
            expires_at: None,
            expires_in: None,
            user: Some(SupabaseUser {
                id: "user".to_string(),
                email: Some("user@example.com".to_string()),
                app_metadata: None,
            }),
            session: None,
        };
        assert!(response.into_session().unwrap().is_none());
    }

    #[test]
    fn user_payload_keeps_provider_metadata() {
        let raw = r#"{
            "id": "user-1",
            "email": "user@example.com",
            "aud": "authenticated",
            "app_metadata": { "provider": "google", "providers": ["google"] },
            "user_metadata": { "name": "User" }
        }"#;
        let user: AuthUser = serde_json::from_str::<SupabaseUser>(raw).unwrap().into();
        assert_eq!(user.provider.as_deref(), Some("google"));
        assert_eq!(user.email.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn stored_session_without_provider_still_decodes() {
        let raw = r#"{
            "access_token": "a",
            "refresh_token": "r",
            "expires_at": 1,
            "user": { "id": "user", "email": null }
        }"#;
        let session: AuthSession = serde_json::from_str(raw).unwrap();
        assert_eq!(session.user.provider, None);
    }

    #[test]
    fn session_debug_redacts_tokens() {
        let session = AuthSession {
            access_token: "secret-access-token".to_string(),
            refresh_token: "secret-refresh-token".to_string(),
            expires_at: 1_700_000_000,
            user: AuthUser {
                id: "user".to_string(),
                email: None,
                provider: None,
            },
        };
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-access-token"));
        assert!(!rendered.contains("secret-refresh-token"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn authorize_url_encodes_provider_and_redirect() {
        let url = client()
            .authorize_url(OAuthProvider::Google, "http://localhost:3000/")
            .unwrap();
        assert_eq!(
            url,
            "https://demo.supabase.co/auth/v1/authorize?provider=google&redirect_to=http%3A%2F%2Flocalhost%3A3000%2F"
        );
    }

    #[test]
    fn authorize_url_requires_redirect_target() {
        let result = client().authorize_url(OAuthProvider::GitHub, " ");
        assert!(matches!(result, Err(AuthError::InvalidConfiguration(_))));
    }

    #[test]
    fn oauth_callback_reads_fragment_tokens() {
        let tokens = parse_oauth_callback(
            "http://localhost:3000/#access_token=abc&refresh_token=def&expires_at=1700000000&token_type=bearer",
        )
        .unwrap();
        assert_eq!(
            tokens,
            OAuthCallbackTokens {
                access_token: "abc".to_string(),
                refresh_token: "def".to_string(),
                expires_at: 1_700_000_000,
            }
        );
    }

    #[test]
    fn oauth_callback_derives_expiry_from_expires_in() {
        let before = unix_timestamp_now();
        let tokens = parse_oauth_callback(
            "http://localhost:3000/#access_token=abc&refresh_token=def&expires_in=3600",
        )
        .unwrap();
        assert!(tokens.expires_at >= before + 3600);
    }

    #[test]
    fn oauth_callback_surfaces_provider_error() {
        let error = parse_oauth_callback(
            "http://localhost:3000/?error=access_denied&error_description=User+cancelled",
        )
        .unwrap_err();
        assert_eq!(error.to_string(), "User cancelled");
    }

    #[test]
    fn oauth_callback_without_tokens_is_rejected() {
        assert!(parse_oauth_callback("http://localhost:3000/").is_err());
        assert!(parse_oauth_callback("not a url").is_err());
    }

    #[test]
    fn parse_api_error_prefers_message_fields() {
        let message = parse_api_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(message, "Invalid login credentials");

        let message = parse_api_error(StatusCode::UNPROCESSABLE_ENTITY, r#"{"msg":"User already registered"}"#);
        assert_eq!(message, "User already registered");
    }

    #[test]
    fn parse_api_error_falls_back_to_body_or_status() {
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, ""), "HTTP 502");
        assert_eq!(
            parse_api_error(StatusCode::BAD_GATEWAY, " upstream down "),
            "upstream down"
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn restore_session_returns_unexpired_session_without_network() {
        let auth = client();
        let session = AuthSession {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: unix_timestamp_now() + 3600,
            user: AuthUser {
                id: "user".to_string(),
                email: None,
                provider: None,
            },
        };
        auth.store().save_session(&session).unwrap();

        let restored = auth.restore_session().await.unwrap();
        assert_eq!(restored, Some(session));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn restore_session_without_stored_session_is_none() {
        assert_eq!(client().restore_session().await.unwrap(), None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn sign_in_rejects_blank_credentials_before_request() {
        let error = client().sign_in(" ", "secret").await.unwrap_err();
        assert_eq!(error.to_string(), "Email is required");

        let error = client().sign_up("user@example.com", "").await.unwrap_err();
        assert_eq!(error.to_string(), "Password is required");
    }
}
