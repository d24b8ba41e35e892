//! Planner → To-Do conversion command handler

use std::sync::Arc;

use graph_tasks_client::{ClientResult, TaskApi, TaskSettings};
use graph_tasks_sdk::{ConversionReport, ConversionRequest, SourceCompletion, TaskConverter};

use crate::output;

pub(crate) async fn handle_convert_command(
    api: Arc<dyn TaskApi>,
    settings: TaskSettings,
    request: &ConversionRequest,
    json: bool,
) -> ClientResult<()> {
    let report = TaskConverter::new(api, settings).convert(request).await?;
    if json {
        output::json(&report);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &ConversionReport) {
    output::success(&report.message);
    output::label("To-Do task", &report.todo_task.id);
    output::label("Title", &report.todo_task.title);
    output::label("List", &report.todo_list_id);
    output::label("Checklist", &report.checklist_items);
    for item in &report.checklist_results {
        match &item.error {
            None => output::status_icon(true, &item.display_name),
            Some(e) => output::status_icon(false, format!("{} ({})", item.display_name, e)),
        }
    }
    match report.source_completion {
        SourceCompletion::MarkedComplete => {
            output::dim(format!("Planner task {} marked complete", report.planner_task_id))
        }
        SourceCompletion::Failed => output::warning(format!(
            "Planner task {} was not marked complete: {}",
            report.planner_task_id,
            report.source_completion_error.as_deref().unwrap_or("unknown error")
        )),
        SourceCompletion::NotRequested => {}
    }
}
