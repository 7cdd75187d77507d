use chrono::Utc;
use tasklist_core::gateway::{AuthGateway, TodoGateway};
use tasklist_core::util::is_blank;
use tasklist_core::Todo;

use crate::commands::common::{
    connect, format_todo_line, mount_list, resolve_todo_title, settle,
};
use crate::error::CliError;

pub async fn run_add(title_parts: &[String], global_profile: Option<&str>) -> Result<(), CliError> {
    let title = resolve_todo_title(title_parts)?;

    let connection = connect(global_profile)?;
    let todo = add_todo(connection.gateway, &connection.profile_name, &title).await?;

    println!("{}", format_todo_line(&todo, Utc::now().timestamp_millis()));
    Ok(())
}

pub async fn add_todo<G>(gateway: G, profile_name: &str, title: &str) -> Result<Todo, CliError>
where
    G: AuthGateway + TodoGateway + Clone,
{
    if is_blank(title) {
        return Err(CliError::EmptyTitle);
    }

    let mut screen = mount_list(gateway, profile_name).await?;
    let store = screen
        .store_mut()
        .ok_or_else(|| CliError::NotSignedIn(profile_name.to_string()))?;
    store.set_draft(title);
    let created = store.submit_draft().await;

    settle(&mut screen, created.is_some())?;
    created
        .and_then(|rows| rows.into_iter().next())
        .ok_or(CliError::NothingCreated)
}
