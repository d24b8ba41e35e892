//! Planner → To-Do field mapping.
//!
//! Pure functions only. The converter decides which remote calls to make;
//! everything here is deterministic over the fetched snapshot.

use chrono::{DateTime, SecondsFormat, Utc};

use graph_tasks_client::models::{
    BodyType, ChecklistEntry, DateTimeTimeZone, Importance, ItemBody, PlannerTask,
    PlannerTaskDetails, TaskStatus, TodoTaskDraft,
};

/// First line of the metadata footer appended to every converted body.
pub const FOOTER_HEADING: &str = "Converted from Microsoft Planner";

/// Time zone attached to every converted due date. Planner's own zone is discarded.
pub const DUE_DATE_TIME_ZONE: &str = "UTC";

const DUE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Map a Planner priority code to To-Do importance.
///
/// Only the codes 1, 5 and 9 are mapped; every other code is `normal`.
pub fn importance_for_priority(priority: i32) -> Importance {
    match priority {
        1 => Importance::High,
        5 => Importance::Normal,
        9 => Importance::Low,
        _ => Importance::Normal,
    }
}

/// `completed` iff the task is 100% complete, otherwise `notStarted`.
pub fn status_for_percent(percent_complete: i32) -> TaskStatus {
    if percent_complete == 100 {
        TaskStatus::Completed
    } else {
        TaskStatus::NotStarted
    }
}

/// The four metadata lines identifying the source task, in fixed order.
pub fn metadata_footer(task: &PlannerTask) -> [String; 4] {
    let created = task
        .created_date_time
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "unknown".to_string());
    [
        FOOTER_HEADING.to_string(),
        format!("Plan ID: {}", task.plan_id),
        format!("Task ID: {}", task.id),
        format!("Created: {}", created),
    ]
}

/// Description (if any), a blank line, then the metadata footer.
///
/// The description is copied verbatim; a blank one is treated as absent.
pub fn build_body(task: &PlannerTask, description: Option<&str>) -> ItemBody {
    let footer = metadata_footer(task).join("\n");
    let content = match description.filter(|d| !d.trim().is_empty()) {
        Some(description) => format!("{}\n\n{}", description, footer),
        None => footer,
    };
    ItemBody {
        content,
        content_type: BodyType::Text,
    }
}

/// Structured due date in UTC.
pub fn due_date(due: DateTime<Utc>) -> DateTimeTimeZone {
    DateTimeTimeZone {
        date_time: due.format(DUE_DATE_FORMAT).to_string(),
        time_zone: DUE_DATE_TIME_ZONE.to_string(),
    }
}

/// Title with the conversion tag prepended when requested.
pub fn converted_title(title: &str, add_prefix: bool, prefix: &str) -> String {
    if add_prefix {
        format!("{}{}", prefix, title)
    } else {
        title.to_string()
    }
}

/// Build the To-Do insert body for a Planner task.
pub fn map_planner_to_todo(
    task: &PlannerTask,
    details: Option<&PlannerTaskDetails>,
    add_prefix: bool,
    prefix: &str,
) -> TodoTaskDraft {
    let description = details.and_then(|d| d.description.as_deref());
    TodoTaskDraft {
        title: converted_title(&task.title, add_prefix, prefix),
        body: Some(build_body(task, description)),
        importance: importance_for_priority(task.priority),
        status: status_for_percent(task.percent_complete),
        due_date_time: task.due_date_time.map(due_date),
    }
}

/// Checklist entries ordered by order hint; ties keep wire order.
///
/// A missing hint sorts as the empty string, i.e. first.
pub fn ordered_checklist(details: &PlannerTaskDetails) -> Vec<&ChecklistEntry> {
    let mut entries: Vec<&ChecklistEntry> = details.checklist.entries().iter().collect();
    entries.sort_by(|a, b| {
        let a = a.item.order_hint.as_deref().unwrap_or("");
        let b = b.item.order_hint.as_deref().unwrap_or("");
        a.cmp(b)
    });
    entries
}
