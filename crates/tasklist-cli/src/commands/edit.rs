use chrono::Utc;
use tasklist_core::gateway::TodoGateway;
use tasklist_core::screens::ListScreen;
use tasklist_core::util::is_blank;
use tasklist_core::{Todo, TodoId};

use crate::commands::common::{
    capture_editor_input_with_initial, connect, dispatch, format_todo_line, item_view, mount_list,
    parse_todo_id,
};
use crate::error::CliError;

pub async fn run_edit(
    id: &str,
    title_parts: &[String],
    global_profile: Option<&str>,
) -> Result<(), CliError> {
    let id = parse_todo_id(id)?;
    let connection = connect(global_profile)?;
    let mut screen = mount_list(connection.gateway, &connection.profile_name).await?;

    let joined = title_parts.join(" ");
    let title = if is_blank(&joined) {
        let current = item_view(&screen, id)?;
        capture_editor_input_with_initial(current.title())?.ok_or(CliError::EmptyEditedTitle)?
    } else {
        joined
    };

    let todo = edit_todo(&mut screen, id, &title).await?;
    println!("{}", format_todo_line(&todo, Utc::now().timestamp_millis()));
    Ok(())
}

/// Drive the row's edit form: open, type, save.
pub async fn edit_todo<G: TodoGateway>(
    screen: &mut ListScreen<G>,
    id: TodoId,
    title: &str,
) -> Result<Todo, CliError> {
    let mut view = item_view(screen, id)?;
    view.begin_edit();
    view.set_draft(title);
    let intent = view.save().ok_or(CliError::EmptyEditedTitle)?;

    dispatch(screen, intent).await?;
    screen
        .store()
        .and_then(|store| store.get(id))
        .cloned()
        .ok_or(CliError::TodoNotFound(id))
}
