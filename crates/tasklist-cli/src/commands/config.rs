use std::env;

use tasklist_core::config::{ENV_OAUTH_REDIRECT_URL, ENV_SUPABASE_ANON_KEY, ENV_SUPABASE_URL};
use tasklist_core::util::{is_http_url, normalize_text_option};

use crate::cli::ConfigCommands;
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            supabase_url,
            supabase_anon_key,
            redirect_url,
            no_activate,
        } => run_config_init(
            profile.as_deref().or(global_profile),
            ProfileFields {
                supabase_url,
                supabase_anon_key,
                redirect_url,
            },
            no_activate,
        ),
    }
}

/// Values passed on the command line; `None` keeps env or existing values.
#[derive(Debug, Default)]
pub struct ProfileFields {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub redirect_url: Option<String>,
}

pub fn run_config_init(
    profile_name: Option<&str>,
    fields: ProfileFields,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    apply_profile_fields(&mut config, &profile_name, fields, no_activate)?;

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    let profile = config
        .profile(&profile_name)
        .ok_or_else(|| CliError::Config("Failed to persist profile".to_string()))?;
    let missing_fields = missing_fields(profile);
    if missing_fields.is_empty() {
        println!(
            "Profile '{profile_name}' is ready. Run `tasklist auth login --email <email> --password <password>`."
        );
    } else {
        println!(
            "Profile '{}' is missing: {}",
            profile_name,
            missing_fields.join(", ")
        );
    }

    Ok(())
}

/// Merge explicit values, then environment, then what the profile already had.
pub fn apply_profile_fields(
    config: &mut CliProfilesConfig,
    profile_name: &str,
    fields: ProfileFields,
    no_activate: bool,
) -> Result<(), CliError> {
    let existing = config.profile(profile_name).cloned().unwrap_or_default();

    let supabase_url = normalize_text_option(fields.supabase_url)
        .or_else(|| normalize_text_option(env::var(ENV_SUPABASE_URL).ok()))
        .or_else(|| existing.supabase_url());
    let supabase_anon_key = normalize_text_option(fields.supabase_anon_key)
        .or_else(|| normalize_text_option(env::var(ENV_SUPABASE_ANON_KEY).ok()))
        .or_else(|| existing.supabase_anon_key());
    let redirect_url = normalize_text_option(fields.redirect_url)
        .or_else(|| normalize_text_option(env::var(ENV_OAUTH_REDIRECT_URL).ok()))
        .or_else(|| existing.oauth_redirect_url());

    let profile = config.profile_mut_or_default(profile_name);
    if let Some(value) = supabase_url {
        profile.supabase_url = Some(value.trim_end_matches('/').to_string());
    }
    if let Some(value) = supabase_anon_key {
        profile.supabase_anon_key = Some(value);
    }
    if let Some(value) = redirect_url {
        profile.oauth_redirect_url = Some(value);
    }

    validate_profile_urls(profile)?;

    if !no_activate {
        config.active_profile = Some(profile_name.to_string());
    }
    Ok(())
}

pub fn missing_fields(profile: &CliProfile) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if profile.supabase_url().is_none() {
        missing.push("supabase_url");
    }
    if profile.supabase_anon_key().is_none() {
        missing.push("supabase_anon_key");
    }
    missing
}

fn validate_profile_urls(profile: &CliProfile) -> Result<(), CliError> {
    if let Some(url) = profile.supabase_url() {
        if !is_http_url(&url) {
            return Err(CliError::Config(
                "supabase_url must include http:// or https://".to_string(),
            ));
        }
    }
    if let Some(url) = profile.oauth_redirect_url() {
        if !is_http_url(&url) {
            return Err(CliError::Config(
                "redirect_url must include http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}
