//! Login / registration screen.

use std::fmt;

use crate::auth::{OAuthProvider, SignUpOutcome};
use crate::gateway::AuthGateway;
use crate::notify::{Toast, Toaster};
use crate::screens::Route;

pub const REGISTRATION_MESSAGE: &str = "Check your email for the confirmation link!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Login => Self::Register,
            Self::Register => Self::Login,
        }
    }

    pub const fn greeting(self) -> &'static str {
        match self {
            Self::Login => "Welcome back!",
            Self::Register => "Create your account",
        }
    }

    pub const fn heading(self) -> &'static str {
        match self {
            Self::Login => "Sign in to your account",
            Self::Register => "Create a new account",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Login => "Enter your credentials to access your account",
            Self::Register => "Fill in the details to create your account",
        }
    }

    /// Label of the link that flips the mode.
    pub const fn switch_prompt(self) -> &'static str {
        match self {
            Self::Login => "Don't have an account? Register",
            Self::Register => "Already have an account? Login",
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// What the form asks the screen to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthIntent {
    Submit {
        mode: AuthMode,
        credentials: Credentials,
    },
    OAuth(OAuthProvider),
}

/// Collects credentials; the mode is owned by the screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthForm {
    mode: AuthMode,
    pub email: String,
    pub password: String,
}

impl AuthForm {
    pub const fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            email: String::new(),
            password: String::new(),
        }
    }

    pub const fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn submit(&self) -> AuthIntent {
        AuthIntent::Submit {
            mode: self.mode,
            credentials: Credentials {
                email: self.email.clone(),
                password: self.password.clone(),
            },
        }
    }

    pub const fn oauth(provider: OAuthProvider) -> AuthIntent {
        AuthIntent::OAuth(provider)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Stay on the auth screen; see [`AuthScreen::message`].
    Stay,
    Navigate(Route),
    /// Send the browser to the provider's authorization page.
    OpenUrl(String),
}

#[derive(Debug, Clone, Default)]
pub struct AuthScreen {
    mode: AuthMode,
    message: Option<String>,
    toaster: Toaster,
}

impl AuthScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: AuthMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub const fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    pub const fn form(&self) -> AuthForm {
        AuthForm::new(self.mode)
    }

    /// Inline message under the form (errors and the registration notice).
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn take_toasts(&mut self) -> Vec<Toast> {
        self.toaster.drain()
    }

    pub async fn handle<A: AuthGateway + ?Sized>(
        &mut self,
        auth: &A,
        intent: AuthIntent,
        redirect_to: &str,
    ) -> AuthOutcome {
        match intent {
            AuthIntent::Submit { mode, credentials } => self.submit(auth, mode, &credentials).await,
            AuthIntent::OAuth(provider) => self.oauth_login(auth, provider, redirect_to).await,
        }
    }

    pub async fn submit<A: AuthGateway + ?Sized>(
        &mut self,
        auth: &A,
        mode: AuthMode,
        credentials: &Credentials,
    ) -> AuthOutcome {
        self.message = None;
        let result = match mode {
            AuthMode::Register => auth
                .sign_up(&credentials.email, &credentials.password)
                .await
                .map(|outcome| self.registered(&outcome)),
            AuthMode::Login => auth
                .sign_in_with_password(&credentials.email, &credentials.password)
                .await
                .map(|_| self.logged_in()),
        };

        result.unwrap_or_else(|error| {
            tracing::error!("Auth error: {error}");
            self.fail(error.to_string(), "An error occurred")
        })
    }

    pub async fn oauth_login<A: AuthGateway + ?Sized>(
        &mut self,
        auth: &A,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> AuthOutcome {
        self.message = None;
        match auth.sign_in_with_oauth(provider, redirect_to).await {
            Ok(url) => AuthOutcome::OpenUrl(url),
            Err(error) => {
                tracing::error!("{} login error: {error}", provider.display_name());
                let fallback = format!("An error occurred with {} login", provider.display_name());
                self.fail(error.to_string(), &fallback)
            }
        }
    }

    fn registered(&mut self, outcome: &SignUpOutcome) -> AuthOutcome {
        if let SignUpOutcome::SignedIn(session) = outcome {
            tracing::info!(user_id = %session.user.id, "Registered with immediate session");
        }
        self.toaster
            .push(Toast::info("Registration successful", REGISTRATION_MESSAGE));
        self.message = Some(REGISTRATION_MESSAGE.to_string());
        AuthOutcome::Stay
    }

    fn logged_in(&mut self) -> AuthOutcome {
        self.toaster.push(Toast::info("Login successful", "Welcome back!"));
        AuthOutcome::Navigate(Route::List)
    }

    fn fail(&mut self, message: String, fallback: &str) -> AuthOutcome {
        let message = if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        };
        self.toaster.push(Toast::error(message.clone()));
        self.message = Some(message);
        AuthOutcome::Stay
    }
}
