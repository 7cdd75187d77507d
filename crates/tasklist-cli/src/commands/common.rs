use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use serde::Serialize;
use tasklist_core::config::SupabaseConfig;
use tasklist_core::gateway::{AuthGateway, TodoGateway};
use tasklist_core::notify::Toast;
use tasklist_core::screens::{ItemIntent, ListPhase, ListScreen, TodoItemView};
use tasklist_core::util::is_blank;
use tasklist_core::{Todo, TodoId};

use crate::auth::{gateway_for_profile, CliGateway};
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

/// Resolved profile plus a gateway bound to its keychain entry.
pub struct Connection {
    pub profile_name: String,
    pub config: SupabaseConfig,
    pub gateway: CliGateway,
}

pub fn connect(global_profile: Option<&str>) -> Result<Connection, CliError> {
    let profiles = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = profiles.resolve_profile_name(global_profile);
    let profile = profiles.profile(&profile_name).cloned().unwrap_or_default();
    let config = profile
        .supabase_config()?
        .ok_or_else(|| CliError::NotConfigured(profile_name.clone()))?;
    let gateway = gateway_for_profile(&profile_name, &config)?;

    tracing::debug!("Using profile '{}' at {}", profile_name, config.url);
    Ok(Connection {
        profile_name,
        config,
        gateway,
    })
}

/// Mount the list screen: session check, then the initial load.
pub async fn mount_list<G>(gateway: G, profile_name: &str) -> Result<ListScreen<G>, CliError>
where
    G: AuthGateway + TodoGateway + Clone,
{
    let mut screen = ListScreen::new(gateway);
    match screen.mount().await {
        ListPhase::Ready => {}
        ListPhase::Loading | ListPhase::Redirected(_) => {
            return Err(CliError::NotSignedIn(profile_name.to_string()));
        }
    }

    if let Some(error) = screen.error() {
        return Err(CliError::Failed(error.to_string()));
    }
    screen.take_toasts();
    Ok(screen)
}

/// Finish a mutation: print its toasts, or turn the error banner into an error.
pub fn settle<G>(screen: &mut ListScreen<G>, succeeded: bool) -> Result<(), CliError> {
    let toasts = screen.take_toasts();
    if succeeded {
        print_toasts(&toasts);
        return Ok(());
    }

    let message = screen
        .error()
        .map(str::to_string)
        .or_else(|| {
            toasts
                .iter()
                .find(|toast| toast.is_error())
                .map(|toast| toast.description.clone())
        })
        .unwrap_or_else(|| "Operation failed".to_string());
    Err(CliError::Failed(message))
}

/// Row view for `id` as currently held by the store.
pub fn item_view<G>(screen: &ListScreen<G>, id: TodoId) -> Result<TodoItemView, CliError> {
    screen
        .store()
        .and_then(|store| store.get(id))
        .map(TodoItemView::new)
        .ok_or(CliError::TodoNotFound(id))
}

/// Hand an item intent to the store and settle the outcome.
pub async fn dispatch<G: TodoGateway>(
    screen: &mut ListScreen<G>,
    intent: ItemIntent,
) -> Result<(), CliError> {
    let succeeded = match screen.store_mut() {
        Some(store) => store.dispatch(intent).await,
        None => false,
    };
    settle(screen, succeeded)
}

pub fn print_toasts(toasts: &[Toast]) {
    for toast in toasts.iter().filter(|toast| !toast.is_error()) {
        eprintln!("{}", format_toast(toast));
    }
}

pub fn format_toast(toast: &Toast) -> String {
    format!("{}: {}", toast.title, toast.description)
}

#[derive(Debug, Serialize)]
pub struct TodoListItem {
    pub id: i64,
    pub title: String,
    pub is_completed: bool,
    pub created_at: String,
    pub relative_time: String,
}

pub fn format_todo_line(todo: &Todo, now_ms: i64) -> String {
    let marker = if todo.is_completed { "[x]" } else { "[ ]" };
    let relative_time = format_relative_time(todo.created_at.timestamp_millis(), now_ms);
    format!(
        "{:>5}  {marker} {:<40}  {relative_time}",
        todo.id.get(),
        todo.title
    )
}

pub fn format_todo_lines(todos: &[Todo]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    todos
        .iter()
        .map(|todo| format_todo_line(todo, now_ms))
        .collect()
}

pub fn todo_to_list_item(todo: &Todo) -> TodoListItem {
    let now_ms = Utc::now().timestamp_millis();
    TodoListItem {
        id: todo.id.get(),
        title: todo.title.clone(),
        is_completed: todo.is_completed,
        created_at: todo.created_at.to_rfc3339(),
        relative_time: format_relative_time(todo.created_at.timestamp_millis(), now_ms),
    }
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn parse_todo_id(id: &str) -> Result<TodoId, CliError> {
    id.parse::<TodoId>()
        .map_err(|_| CliError::InvalidTodoId(id.trim().to_string()))
}

/// Title from the arguments, then piped stdin, then the editor.
pub fn resolve_todo_title(title_parts: &[String]) -> Result<String, CliError> {
    let joined = title_parts.join(" ");
    if !is_blank(&joined) {
        return Ok(joined);
    }

    if let Some(title) = read_piped_stdin()? {
        return Ok(title);
    }

    if let Some(title) = capture_editor_input()? {
        return Ok(title);
    }

    Err(CliError::EmptyTitle)
}

/// First non-blank line of `content`, without its line ending.
pub fn first_line(content: &str) -> Option<String> {
    content
        .lines()
        .find(|line| !is_blank(line))
        .map(|line| line.trim_end_matches('\r').to_string())
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(first_line(&buffer))
}

pub fn capture_editor_input() -> Result<Option<String>, CliError> {
    capture_editor_input_with_initial("")
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_title_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(first_line(&content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let mut command = Command::new(program);
            command.args(parts).arg(file_path);

            let status = command.status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_title_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("tasklist-todo-{}-{now}.txt", std::process::id()))
}
