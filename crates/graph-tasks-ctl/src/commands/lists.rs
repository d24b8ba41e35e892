//! To-Do list command handler

use graph_tasks_client::{ClientResult, TaskApi};
use graph_tasks_sdk::responses::ListSummary;

use crate::output;

pub(crate) async fn handle_lists_command(api: &dyn TaskApi, json: bool) -> ClientResult<()> {
    let lists = api.list_todo_lists().await?;
    let summaries: Vec<ListSummary> = lists.iter().map(ListSummary::from).collect();

    if json {
        output::json(&summaries);
        return Ok(());
    }

    output::header(format!("To-Do lists ({})", summaries.len()));
    for list in &summaries {
        let marker = if list.is_default { " (default)" } else { "" };
        output::item(format!("{}{}", list.display_name, marker));
        output::dim(format!("    {}", list.id));
    }
    Ok(())
}
