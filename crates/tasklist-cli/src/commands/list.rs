use tasklist_core::screens::list::EMPTY_LIST_MESSAGE;
use tasklist_core::screens::ListScreen;

use crate::commands::common::{
    connect, format_todo_lines, mount_list, todo_to_list_item, TodoListItem,
};
use crate::error::CliError;

pub async fn run_list(as_json: bool, global_profile: Option<&str>) -> Result<(), CliError> {
    let connection = connect(global_profile)?;
    let screen = mount_list(connection.gateway, &connection.profile_name).await?;

    for line in render_list(&screen, as_json)? {
        println!("{line}");
    }
    Ok(())
}

/// Rows newest first, then the completion summary.
pub fn render_list<G>(screen: &ListScreen<G>, as_json: bool) -> Result<Vec<String>, CliError> {
    let todos = screen
        .store()
        .map(|store| store.snapshot().to_vec())
        .unwrap_or_default();

    if as_json {
        let json_items = todos
            .iter()
            .map(todo_to_list_item)
            .collect::<Vec<TodoListItem>>();
        return Ok(vec![serde_json::to_string_pretty(&json_items)?]);
    }

    if todos.is_empty() {
        return Ok(vec![EMPTY_LIST_MESSAGE.to_string()]);
    }

    let mut lines = format_todo_lines(&todos);
    if let Some(summary) = screen.summary() {
        lines.push(String::new());
        lines.push(summary);
    }
    Ok(lines)
}
