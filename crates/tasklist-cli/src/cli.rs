use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tasklist_core::auth::OAuthProvider;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "Manage your task list from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// CLI profile name for Supabase configuration and session
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Quick add: tasklist "buy milk"
    #[arg(trailing_var_arg = true)]
    pub title: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List your todos, newest first
    #[command(alias = "ls")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a new todo
    #[command(alias = "new")]
    Add {
        /// Todo title
        title: Vec<String>,
    },
    /// Rename a todo (opens $VISUAL / $EDITOR when no title is given)
    Edit {
        /// Todo ID
        id: String,
        /// New title
        title: Vec<String>,
    },
    /// Flip a todo between completed and incomplete
    Toggle(ToggleArgs),
    /// Delete a todo
    #[command(alias = "rm")]
    Delete {
        /// Todo ID
        id: String,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Sign in, register, or sign out with Supabase
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Args)]
pub struct ToggleArgs {
    /// Todo ID
    pub id: String,
    /// Mark as completed instead of flipping
    #[arg(long, conflicts_with = "undone")]
    pub done: bool,
    /// Mark as incomplete instead of flipping
    #[arg(long)]
    pub undone: bool,
}

impl ToggleArgs {
    /// Explicit target state, if one was requested.
    pub const fn target(&self) -> Option<bool> {
        if self.done {
            Some(true)
        } else if self.undone {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ProviderArg {
    Google,
    Github,
}

impl From<ProviderArg> for OAuthProvider {
    fn from(value: ProviderArg) -> Self {
        match value {
            ProviderArg::Google => Self::Google,
            ProviderArg::Github => Self::GitHub,
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Supabase project URL
        #[arg(long, value_name = "URL")]
        supabase_url: Option<String>,
        /// Supabase anon/public key
        #[arg(long, value_name = "KEY")]
        supabase_anon_key: Option<String>,
        /// Where OAuth providers redirect after sign-in
        #[arg(long, value_name = "URL")]
        redirect_url: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in with email/password and store the session in the keychain
    Login {
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Create an account with email/password
    Register {
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Print the provider sign-in URL
    Oauth {
        /// Identity provider
        #[arg(long, value_enum, default_value_t = ProviderArg::Google)]
        provider: ProviderArg,
        /// Redirect target (defaults to the profile's redirect URL)
        #[arg(long, value_name = "URL")]
        redirect_to: Option<String>,
    },
    /// Finish an OAuth sign-in from the URL the browser was redirected to
    Callback {
        /// Full redirect URL including its #fragment
        url: String,
    },
    /// Show auth status for profile
    Status,
    /// Sign out and clear the stored session
    Logout,
}
