use chrono::Utc;
use tasklist_core::gateway::TodoGateway;
use tasklist_core::screens::{ItemIntent, ListScreen};
use tasklist_core::{Todo, TodoId};

use crate::cli::ToggleArgs;
use crate::commands::common::{
    connect, dispatch, format_todo_line, item_view, mount_list, parse_todo_id,
};
use crate::error::CliError;

pub async fn run_toggle(args: &ToggleArgs, global_profile: Option<&str>) -> Result<(), CliError> {
    let id = parse_todo_id(&args.id)?;
    let connection = connect(global_profile)?;
    let mut screen = mount_list(connection.gateway, &connection.profile_name).await?;

    let todo = toggle_todo(&mut screen, id, args.target()).await?;
    println!("{}", format_todo_line(&todo, Utc::now().timestamp_millis()));
    Ok(())
}

/// Flip the checkbox, or force it to `target`.
pub async fn toggle_todo<G: TodoGateway>(
    screen: &mut ListScreen<G>,
    id: TodoId,
    target: Option<bool>,
) -> Result<Todo, CliError> {
    let view = item_view(screen, id)?;
    let intent = match target {
        Some(is_completed) => ItemIntent::Toggle { id, is_completed },
        None => view.toggle(),
    };

    dispatch(screen, intent).await?;
    screen
        .store()
        .and_then(|store| store.get(id))
        .cloned()
        .ok_or(CliError::TodoNotFound(id))
}
