use tasklist_core::auth::OAuthProvider;
use tasklist_core::gateway::AuthGateway;
use tasklist_core::screens::{AuthForm, AuthIntent, AuthMode, AuthOutcome, AuthScreen, ListScreen};

use crate::cli::AuthCommands;
use crate::commands::common::{connect, print_toasts, Connection};
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    let connection = connect(global_profile)?;

    match command {
        AuthCommands::Login { email, password } => {
            run_credentials(&connection, AuthMode::Login, email, password).await
        }
        AuthCommands::Register { email, password } => {
            run_credentials(&connection, AuthMode::Register, email, password).await
        }
        AuthCommands::Oauth {
            provider,
            redirect_to,
        } => {
            let redirect_to =
                redirect_to.unwrap_or_else(|| connection.config.oauth_redirect_url().to_string());
            let url = start_oauth(&connection.gateway, provider.into(), &redirect_to).await?;
            println!("{url}");
            eprintln!(
                "Open the URL above to sign in, then run `tasklist auth callback '<redirected url>'`."
            );
            Ok(())
        }
        AuthCommands::Callback { url } => {
            let session = connection.gateway.complete_oauth(&url).await?;
            let email_label = session.user.email.as_deref().unwrap_or("(no email)");
            println!(
                "Signed in profile '{}' as {email_label}",
                connection.profile_name
            );
            Ok(())
        }
        AuthCommands::Status => {
            let profile_name = &connection.profile_name;
            if let Some(session) = connection.gateway.active_session().await? {
                let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                println!(
                    "Profile '{}' is signed in as {} (expires_at={})",
                    profile_name, email_label, session.expires_at
                );
            } else {
                println!("Profile '{profile_name}' is not signed in.");
            }
            Ok(())
        }
        AuthCommands::Logout => {
            let mut screen = ListScreen::new(connection.gateway);
            if screen.logout().await.is_none() {
                let message = screen.error().unwrap_or("Failed to sign out").to_string();
                return Err(CliError::Failed(message));
            }
            println!("Signed out profile '{}'", connection.profile_name);
            Ok(())
        }
    }
}

async fn run_credentials(
    connection: &Connection,
    mode: AuthMode,
    email: String,
    password: String,
) -> Result<(), CliError> {
    let mut screen = AuthScreen::with_mode(mode);
    let outcome = submit_credentials(
        &connection.gateway,
        &mut screen,
        email.clone(),
        password,
        connection.config.oauth_redirect_url(),
    )
    .await?;

    match outcome {
        AuthOutcome::Navigate(_) => {
            println!("Signed in profile '{}' as {email}", connection.profile_name);
        }
        AuthOutcome::Stay | AuthOutcome::OpenUrl(_) => {
            if let Some(message) = screen.message() {
                println!("{message}");
            }
        }
    }
    Ok(())
}

/// Fill the auth form and submit it through the screen.
pub async fn submit_credentials<A: AuthGateway + ?Sized>(
    auth: &A,
    screen: &mut AuthScreen,
    email: String,
    password: String,
    redirect_to: &str,
) -> Result<AuthOutcome, CliError> {
    let mut form = screen.form();
    form.email = email;
    form.password = password;
    drive(auth, screen, form.submit(), redirect_to).await
}

/// Ask the screen for the provider's authorization URL.
pub async fn start_oauth<A: AuthGateway + ?Sized>(
    auth: &A,
    provider: OAuthProvider,
    redirect_to: &str,
) -> Result<String, CliError> {
    let mut screen = AuthScreen::new();
    match drive(auth, &mut screen, AuthForm::oauth(provider), redirect_to).await? {
        AuthOutcome::OpenUrl(url) => Ok(url),
        AuthOutcome::Stay | AuthOutcome::Navigate(_) => Err(CliError::Failed(format!(
            "An error occurred with {} login",
            provider.display_name()
        ))),
    }
}

async fn drive<A: AuthGateway + ?Sized>(
    auth: &A,
    screen: &mut AuthScreen,
    intent: AuthIntent,
    redirect_to: &str,
) -> Result<AuthOutcome, CliError> {
    let outcome = screen.handle(auth, intent, redirect_to).await;
    let toasts = screen.take_toasts();
    if let Some(failure) = toasts.iter().find(|toast| toast.is_error()) {
        let message = screen.message().unwrap_or(&failure.description);
        return Err(CliError::Failed(message.to_string()));
    }

    print_toasts(&toasts);
    Ok(outcome)
}
