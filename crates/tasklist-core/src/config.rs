//! Hosted backend configuration.
//!
//! Clients discover the Supabase project URL and its public anon key either
//! from the environment or from their own persisted profiles.

use std::env;

use serde::{Deserialize, Serialize};

use crate::util::{is_http_url, normalize_text_option};
use crate::{Error, Result};

pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
pub const ENV_OAUTH_REDIRECT_URL: &str = "TASKLIST_OAUTH_REDIRECT_URL";

/// Where OAuth providers send the browser back to when nothing else is configured.
pub const DEFAULT_OAUTH_REDIRECT_URL: &str = "http://localhost:3000/";

/// Public project settings needed to talk to the hosted backend.
///
/// The anon key is safe to ship; row-level security on the `todos` table is
/// what actually scopes data to the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    #[serde(default)]
    pub oauth_redirect_url: Option<String>,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self> {
        let url = url.into().trim().trim_end_matches('/').to_string();
        let anon_key = anon_key.into().trim().to_string();
        if !is_http_url(&url) {
            return Err(Error::Config(
                "Supabase URL must include http:// or https://".to_string(),
            ));
        }
        if anon_key.is_empty() {
            return Err(Error::Config(
                "Supabase anon key must not be empty".to_string(),
            ));
        }
        Ok(Self {
            url,
            anon_key,
            oauth_redirect_url: None,
        })
    }

    #[must_use]
    pub fn with_oauth_redirect_url(mut self, redirect_url: Option<String>) -> Self {
        self.oauth_redirect_url = normalize_text_option(redirect_url);
        self
    }

    /// Redirect target handed to OAuth providers.
    pub fn oauth_redirect_url(&self) -> &str {
        self.oauth_redirect_url
            .as_deref()
            .unwrap_or(DEFAULT_OAUTH_REDIRECT_URL)
    }
}

/// Combine an optional URL and anon key into a config.
///
/// Both missing means "not configured"; exactly one missing is an error.
pub fn resolve_optional_supabase_config(
    url: Option<String>,
    anon_key: Option<String>,
) -> Result<Option<SupabaseConfig>> {
    match (normalize_text_option(url), normalize_text_option(anon_key)) {
        (None, None) => Ok(None),
        (Some(url), Some(anon_key)) => SupabaseConfig::new(url, anon_key).map(Some),
        (Some(_), None) => Err(Error::Config(format!("{ENV_SUPABASE_ANON_KEY} is missing"))),
        (None, Some(_)) => Err(Error::Config(format!("{ENV_SUPABASE_URL} is missing"))),
    }
}

/// Resolve settings field by field: explicit values first, then
/// `SUPABASE_URL`, `SUPABASE_ANON_KEY` and `TASKLIST_OAUTH_REDIRECT_URL`.
///
/// Returns `Ok(None)` when neither URL nor key is known and an error when
/// only one of them is.
pub fn resolve_supabase_config(
    url: Option<String>,
    anon_key: Option<String>,
    redirect_url: Option<String>,
) -> Result<Option<SupabaseConfig>> {
    resolve_with(url, anon_key, redirect_url, |key| env::var(key).ok())
}

fn resolve_with<F>(
    url: Option<String>,
    anon_key: Option<String>,
    redirect_url: Option<String>,
    lookup: F,
) -> Result<Option<SupabaseConfig>>
where
    F: Fn(&str) -> Option<String>,
{
    let field = |explicit: Option<String>, key: &str| {
        normalize_text_option(explicit).or_else(|| normalize_text_option(lookup(key)))
    };
    let config = resolve_optional_supabase_config(
        field(url, ENV_SUPABASE_URL),
        field(anon_key, ENV_SUPABASE_ANON_KEY),
    )?;
    let redirect_url = field(redirect_url, ENV_OAUTH_REDIRECT_URL);
    Ok(config.map(|config| config.with_oauth_redirect_url(redirect_url)))
}
