use clap::Parser;
use pretty_assertions::assert_eq;
use tasklist_core::auth::OAuthProvider;
use tasklist_core::screens::list::EMPTY_LIST_MESSAGE;
use tasklist_core::screens::{AuthMode, AuthOutcome, AuthScreen, Route};
use tasklist_core::testing::{Call, Failure, InMemoryGateway};
use tasklist_core::{Todo, TodoId};

use crate::cli::{AuthCommands, Cli, Commands, CompletionShell};
use crate::commands::add::add_todo;
use crate::commands::auth_cmd::{start_oauth, submit_credentials};
use crate::commands::common::{
    first_line, format_relative_time, format_todo_line, mount_list, parse_todo_id,
};
use crate::commands::completions::render_completions;
use crate::commands::config::{apply_profile_fields, missing_fields, ProfileFields};
use crate::commands::delete::delete_todo;
use crate::commands::edit::edit_todo;
use crate::commands::list::render_list;
use crate::commands::toggle::toggle_todo;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

const USER: &str = "user-1";
const PROFILE: &str = "test";
const REDIRECT: &str = "http://localhost:3000/";

fn titles(gateway: &InMemoryGateway) -> Vec<String> {
    gateway
        .rows_for(USER)
        .into_iter()
        .map(|todo| todo.title)
        .collect()
}

#[test]
fn parse_todo_id_trims_and_rejects_garbage() {
    assert_eq!(parse_todo_id(" 42 ").unwrap(), TodoId::new(42));
    assert!(matches!(
        parse_todo_id("abc"),
        Err(CliError::InvalidTodoId(id)) if id == "abc"
    ));
}

#[test]
fn first_line_skips_blank_lines() {
    assert_eq!(first_line("\n  \nBuy milk\nignored\n"), Some("Buy milk".to_string()));
    assert_eq!(first_line("Call mom\r\n"), Some("Call mom".to_string()));
    assert_eq!(first_line(" \n\t "), None);
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
    assert_eq!(format_relative_time(now - 3 * 24 * 60 * 60_000, now), "3d ago");
}

#[test]
fn format_todo_line_shows_id_marker_and_title() {
    let todo = Todo {
        id: TodoId::new(7),
        title: "Water plants".to_string(),
        is_completed: true,
        user_id: USER.to_string(),
        created_at: chrono::DateTime::from_timestamp(0, 0).unwrap(),
    };
    let line = format_todo_line(&todo, 30_000);
    assert!(line.starts_with("    7  [x] Water plants"));
    assert!(line.ends_with("just now"));
}

#[test]
fn bare_words_parse_as_quick_add() {
    let cli = Cli::try_parse_from(["tasklist", "buy", "milk"]).unwrap();
    assert!(cli.command.is_none());
    assert_eq!(cli.title, vec!["buy".to_string(), "milk".to_string()]);
}

#[test]
fn toggle_flags_pick_target_state() {
    let cli = Cli::try_parse_from(["tasklist", "toggle", "3", "--done"]).unwrap();
    let Some(Commands::Toggle(args)) = cli.command else {
        panic!("expected toggle command");
    };
    assert_eq!(args.id, "3");
    assert_eq!(args.target(), Some(true));

    let cli = Cli::try_parse_from(["tasklist", "toggle", "3"]).unwrap();
    let Some(Commands::Toggle(args)) = cli.command else {
        panic!("expected toggle command");
    };
    assert_eq!(args.target(), None);

    assert!(Cli::try_parse_from(["tasklist", "toggle", "3", "--done", "--undone"]).is_err());
}

#[test]
fn auth_oauth_defaults_to_google() {
    let cli = Cli::try_parse_from(["tasklist", "--profile", "work", "auth", "oauth"]).unwrap();
    assert_eq!(cli.profile.as_deref(), Some("work"));
    let Some(Commands::Auth {
        command: AuthCommands::Oauth {
            provider,
            redirect_to,
        },
    }) = cli.command
    else {
        panic!("expected auth oauth command");
    };
    assert_eq!(OAuthProvider::from(provider), OAuthProvider::Google);
    assert_eq!(redirect_to, None);
}

#[tokio::test(flavor = "current_thread")]
async fn add_todo_creates_row_for_signed_in_user() {
    let gateway = InMemoryGateway::signed_in(USER);
    gateway.seed(USER, "Existing", false);

    let todo = add_todo(gateway.clone(), PROFILE, "Buy milk").await.unwrap();

    assert_eq!(todo.title, "Buy milk");
    assert_eq!(todo.user_id, USER);
    assert!(!todo.is_completed);
    assert_eq!(titles(&gateway), vec!["Buy milk", "Existing"]);
}

#[tokio::test(flavor = "current_thread")]
async fn add_todo_errors_when_insert_returns_no_row() {
    let gateway = InMemoryGateway::signed_in(USER);
    gateway.seed(USER, "old existing", false);
    gateway.set_minimal_inserts(true);

    let result = add_todo(gateway.clone(), PROFILE, "brand new").await;

    assert!(matches!(result, Err(CliError::NothingCreated)));
    assert_eq!(titles(&gateway), vec!["brand new", "old existing"]);
}

#[tokio::test(flavor = "current_thread")]
async fn add_todo_rejects_blank_title_without_calls() {
    let gateway = InMemoryGateway::signed_in(USER);

    let result = add_todo(gateway.clone(), PROFILE, "   ").await;

    assert!(matches!(result, Err(CliError::EmptyTitle)));
    assert!(gateway.calls().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn commands_require_a_session() {
    let gateway = InMemoryGateway::new();
    gateway.seed(USER, "Hidden", false);

    let result = add_todo(gateway.clone(), PROFILE, "Buy milk").await;

    assert!(matches!(result, Err(CliError::NotSignedIn(profile)) if profile == PROFILE));
    assert!(gateway.data_calls().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn edit_todo_renames_row() {
    let gateway = InMemoryGateway::signed_in(USER);
    let seeded = gateway.seed(USER, "Old", false);
    let mut screen = mount_list(gateway.clone(), PROFILE).await.unwrap();

    let todo = edit_todo(&mut screen, seeded.id, "New").await.unwrap();

    assert_eq!(todo.title, "New");
    assert_eq!(titles(&gateway), vec!["New"]);
}

#[tokio::test(flavor = "current_thread")]
async fn edit_todo_rejects_blank_title() {
    let gateway = InMemoryGateway::signed_in(USER);
    let seeded = gateway.seed(USER, "Old", false);
    let mut screen = mount_list(gateway.clone(), PROFILE).await.unwrap();
    gateway.clear_calls();

    let result = edit_todo(&mut screen, seeded.id, " ").await;

    assert!(matches!(result, Err(CliError::EmptyEditedTitle)));
    assert!(gateway.calls().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn toggle_todo_flips_or_forces_state() {
    let gateway = InMemoryGateway::signed_in(USER);
    let seeded = gateway.seed(USER, "Task", false);
    let mut screen = mount_list(gateway.clone(), PROFILE).await.unwrap();

    let flipped = toggle_todo(&mut screen, seeded.id, None).await.unwrap();
    assert!(flipped.is_completed);

    let forced = toggle_todo(&mut screen, seeded.id, Some(true)).await.unwrap();
    assert!(forced.is_completed);

    let undone = toggle_todo(&mut screen, seeded.id, Some(false)).await.unwrap();
    assert!(!undone.is_completed);
    assert!(!gateway.rows_for(USER)[0].is_completed);
}

#[tokio::test(flavor = "current_thread")]
async fn delete_todo_removes_row() {
    let gateway = InMemoryGateway::signed_in(USER);
    let keep = gateway.seed(USER, "Keep", false);
    let doomed = gateway.seed(USER, "Drop", false);
    let mut screen = mount_list(gateway.clone(), PROFILE).await.unwrap();

    delete_todo(&mut screen, doomed.id).await.unwrap();

    assert_eq!(titles(&gateway), vec!["Keep"]);
    assert!(screen.store().unwrap().get(keep.id).is_some());
    assert!(matches!(
        delete_todo(&mut screen, doomed.id).await,
        Err(CliError::TodoNotFound(id)) if id == doomed.id
    ));
}

#[tokio::test(flavor = "current_thread")]
async fn failed_delete_surfaces_remote_message() {
    let gateway = InMemoryGateway::signed_in(USER);
    let seeded = gateway.seed(USER, "Task", false);
    let mut screen = mount_list(gateway.clone(), PROFILE).await.unwrap();
    gateway.fail_next(Failure::Remote("network error".to_string()));

    let error = delete_todo(&mut screen, seeded.id).await.unwrap_err();

    assert_eq!(error.to_string(), "Failed to delete todo: network error");
    assert_eq!(titles(&gateway), vec!["Task"]);
    assert_eq!(screen.store().unwrap().len(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn render_list_shows_rows_then_summary() {
    let gateway = InMemoryGateway::signed_in(USER);
    gateway.seed(USER, "First", true);
    gateway.seed(USER, "Second", false);
    let screen = mount_list(gateway, PROFILE).await.unwrap();

    let lines = render_list(&screen, false).unwrap();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].contains("[ ] Second"));
    assert!(lines[1].contains("[x] First"));
    assert_eq!(lines[3], "1 of 2 tasks completed");
}

#[tokio::test(flavor = "current_thread")]
async fn render_list_handles_empty_and_json() {
    let gateway = InMemoryGateway::signed_in(USER);
    let screen = mount_list(gateway.clone(), PROFILE).await.unwrap();
    assert_eq!(
        render_list(&screen, false).unwrap(),
        vec![EMPTY_LIST_MESSAGE.to_string()]
    );

    gateway.seed(USER, "Json", false);
    let screen = mount_list(gateway, PROFILE).await.unwrap();
    let rendered = render_list(&screen, true).unwrap();
    let items: serde_json::Value = serde_json::from_str(&rendered[0]).unwrap();
    assert_eq!(items[0]["title"], "Json");
    assert_eq!(items[0]["is_completed"], false);
}

#[tokio::test(flavor = "current_thread")]
async fn login_navigates_to_list() {
    let gateway = InMemoryGateway::new();
    gateway.register_account("me@example.com", "secret", USER);
    let mut screen = AuthScreen::with_mode(AuthMode::Login);

    let outcome = submit_credentials(
        &gateway,
        &mut screen,
        "me@example.com".to_string(),
        "secret".to_string(),
        REDIRECT,
    )
    .await
    .unwrap();

    assert_eq!(outcome, AuthOutcome::Navigate(Route::List));
    assert_eq!(gateway.current_user_id().as_deref(), Some(USER));
}

#[tokio::test(flavor = "current_thread")]
async fn login_failure_reports_backend_message() {
    let gateway = InMemoryGateway::new();
    let mut screen = AuthScreen::with_mode(AuthMode::Login);

    let error = submit_credentials(
        &gateway,
        &mut screen,
        "me@example.com".to_string(),
        "wrong".to_string(),
        REDIRECT,
    )
    .await
    .unwrap_err();

    assert_eq!(error.to_string(), "Invalid login credentials");
}

#[tokio::test(flavor = "current_thread")]
async fn register_stays_with_confirmation_notice() {
    let gateway = InMemoryGateway::new();
    let mut screen = AuthScreen::with_mode(AuthMode::Register);

    let outcome = submit_credentials(
        &gateway,
        &mut screen,
        "new@example.com".to_string(),
        "secret".to_string(),
        REDIRECT,
    )
    .await
    .unwrap();

    assert_eq!(outcome, AuthOutcome::Stay);
    assert_eq!(
        screen.message(),
        Some("Check your email for the confirmation link!")
    );
    assert_eq!(gateway.calls(), vec![Call::SignUp("new@example.com".to_string())]);
}

#[tokio::test(flavor = "current_thread")]
async fn start_oauth_returns_provider_url() {
    let gateway = InMemoryGateway::new();

    let url = start_oauth(&gateway, OAuthProvider::GitHub, REDIRECT)
        .await
        .unwrap();

    assert!(url.contains("provider=github"));
    assert_eq!(gateway.calls(), vec![Call::OAuth(OAuthProvider::GitHub)]);
}

#[test]
fn config_fields_reject_non_http_urls() {
    let mut config = CliProfilesConfig::default();
    let result = apply_profile_fields(
        &mut config,
        "work",
        ProfileFields {
            supabase_url: Some("https://project.supabase.co".to_string()),
            supabase_anon_key: Some("anon".to_string()),
            redirect_url: Some("localhost:3000".to_string()),
        },
        false,
    );
    assert!(matches!(result, Err(CliError::Config(_))));
}

#[test]
fn config_fields_activate_profile() {
    let mut config = CliProfilesConfig::default();
    apply_profile_fields(
        &mut config,
        "work",
        ProfileFields {
            supabase_url: Some("https://project.supabase.co/".to_string()),
            supabase_anon_key: Some("anon".to_string()),
            redirect_url: Some("http://localhost:3000/".to_string()),
        },
        false,
    )
    .unwrap();

    let profile = config.profile("work").unwrap();
    assert_eq!(
        profile.supabase_url.as_deref(),
        Some("https://project.supabase.co")
    );
    assert!(missing_fields(profile).is_empty());
    assert_eq!(config.active_profile.as_deref(), Some("work"));

    apply_profile_fields(&mut config, "home", ProfileFields::default(), true).unwrap();
    assert_eq!(config.active_profile.as_deref(), Some("work"));
}

#[test]
fn completions_use_binary_name() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("tasklist"));
}
