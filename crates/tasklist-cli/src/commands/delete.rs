use tasklist_core::gateway::TodoGateway;
use tasklist_core::screens::ListScreen;
use tasklist_core::TodoId;

use crate::commands::common::{connect, dispatch, item_view, mount_list, parse_todo_id};
use crate::error::CliError;

pub async fn run_delete(id: &str, global_profile: Option<&str>) -> Result<(), CliError> {
    let id = parse_todo_id(id)?;
    let connection = connect(global_profile)?;
    let mut screen = mount_list(connection.gateway, &connection.profile_name).await?;

    delete_todo(&mut screen, id).await?;
    println!("{id}");
    Ok(())
}

pub async fn delete_todo<G: TodoGateway>(
    screen: &mut ListScreen<G>,
    id: TodoId,
) -> Result<(), CliError> {
    let intent = item_view(screen, id)?
        .delete()
        .ok_or(CliError::TodoNotFound(id))?;
    dispatch(screen, intent).await
}
