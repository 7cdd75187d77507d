//! tasklist CLI - manage your Supabase task list from the terminal
//!
//! Every command mounts the same screens a GUI would: the session guard and
//! list store for todo commands, the auth screen for `auth` commands.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::{
    run_add, run_auth, run_completions, run_config, run_delete, run_edit, run_list, run_toggle,
};
use crate::error::CliError;

const DEFAULT_LOG_DIRECTIVE: &str = "tasklist=warn";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let directive = DEFAULT_LOG_DIRECTIVE
        .parse::<Directive>()
        .map_err(|error| CliError::Config(format!("Invalid log directive: {error}")))?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Some(Commands::List { json }) => run_list(json, profile).await?,
        Some(Commands::Add { title }) => run_add(&title, profile).await?,
        Some(Commands::Edit { id, title }) => run_edit(&id, &title, profile).await?,
        Some(Commands::Toggle(args)) => run_toggle(&args, profile).await?,
        Some(Commands::Delete { id }) => run_delete(&id, profile).await?,
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())?;
        }
        Some(Commands::Config { command }) => run_config(command, profile)?,
        Some(Commands::Auth { command }) => run_auth(command, profile).await?,
        None => {
            // Quick add: tasklist "buy milk"; bare `tasklist` lists.
            if cli.title.is_empty() {
                run_list(false, profile).await?;
            } else {
                run_add(&cli.title, profile).await?;
            }
        }
    }

    Ok(())
}
