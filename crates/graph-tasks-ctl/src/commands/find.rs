//! To-Do task search command handler

use std::sync::Arc;

use graph_tasks_client::{ClientResult, TaskApi, TaskSettings};
use graph_tasks_sdk::{FindOutcome, FindRequest, TaskFinder};

use crate::output;

pub(crate) async fn handle_find_command(
    api: Arc<dyn TaskApi>,
    settings: TaskSettings,
    request: &FindRequest,
    json: bool,
) -> ClientResult<()> {
    let outcome = TaskFinder::new(api, settings).find(request).await?;
    if json {
        output::json(&outcome);
        return Ok(());
    }

    match &outcome {
        FindOutcome::Exact(found) => {
            output::success(format!("Found \"{}\"", found.task.title));
            output::label("Task", &found.task.id);
            output::label(
                "List",
                found.list_name.as_deref().unwrap_or(found.list_id.as_str()),
            );
            output::label("Status", found.task.status);
        }
        FindOutcome::Partial { count, matches } => {
            output::header(format!("{count} partial match(es)"));
            for task in matches {
                output::item(format!("{} [{}]", task.title, task.status));
                output::dim(format!("    {} in {}", task.id, task.list_id));
            }
        }
        FindOutcome::NoMatch { message, .. } => output::warning(message),
    }
    Ok(())
}
