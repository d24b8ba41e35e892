//! Shared response types consumed by both MCP (JSON serialization) and ctl (terminal formatting).
//!
//! These give a stable, trimmed view of Graph resources suitable for LLM
//! consumption and CLI tables. Field names are camelCase to match Graph.

use serde::Serialize;

use graph_tasks_client::models::{
    DateTimeTimeZone, PlannerTask, TodoTask, TodoTaskList, WellknownListName,
};

use crate::mapping::importance_for_priority;

/// Lightweight view of a To-Do task, tagged with the list it lives in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProjection {
    pub id: String,
    pub title: String,
    pub status: String,
    pub importance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date_time: Option<DateTimeTimeZone>,
    pub list_id: String,
}

impl TaskProjection {
    pub fn new(task: &TodoTask, list_id: &str) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            status: task.status.to_string(),
            importance: task.importance.to_string(),
            due_date_time: task.due_date_time.clone(),
            list_id: list_id.to_string(),
        }
    }
}

/// To-Do list summary for list views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSummary {
    pub id: String,
    pub display_name: String,
    pub wellknown_list_name: WellknownListName,
    pub is_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_shared: Option<bool>,
}

impl From<&TodoTaskList> for ListSummary {
    fn from(list: &TodoTaskList) -> Self {
        Self {
            id: list.id.clone(),
            display_name: list.display_name.clone(),
            wellknown_list_name: list.wellknown_list_name,
            is_default: list.is_default(),
            is_shared: list.is_shared,
        }
    }
}

/// Planner task summary, including the importance it would convert to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerTaskSummary {
    pub id: String,
    pub title: String,
    pub plan_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_id: Option<String>,
    pub priority: i32,
    pub importance: String,
    pub percent_complete: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<String>,
}

impl From<&PlannerTask> for PlannerTaskSummary {
    fn from(task: &PlannerTask) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            plan_id: task.plan_id.clone(),
            bucket_id: task.bucket_id.clone(),
            priority: task.priority,
            importance: importance_for_priority(task.priority).to_string(),
            percent_complete: task.percent_complete,
            due_date_time: task.due_date_time.map(|d| d.to_rfc3339()),
            created_date_time: task.created_date_time.map(|d| d.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_tasks_client::models::{Importance, TaskStatus};

    #[test]
    fn test_projection_json_shape() {
        let task = TodoTask {
            id: "t1".to_string(),
            title: "Tapped Hole".to_string(),
            importance: Importance::High,
            status: TaskStatus::InProgress,
            ..Default::default()
        };
        let json = serde_json::to_value(TaskProjection::new(&task, "list-1")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "t1",
                "title": "Tapped Hole",
                "status": "inProgress",
                "importance": "high",
                "listId": "list-1"
            })
        );
    }

    #[test]
    fn test_list_summary_flags_default() {
        let list = TodoTaskList {
            id: "l1".to_string(),
            display_name: "Tasks".to_string(),
            wellknown_list_name: WellknownListName::DefaultList,
            ..Default::default()
        };
        let summary = ListSummary::from(&list);
        assert!(summary.is_default);
        assert_eq!(summary.display_name, "Tasks");
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["wellknownListName"], "defaultList");
        assert!(json.get("isShared").is_none());
    }

    #[test]
    fn test_planner_summary_maps_importance() {
        let task = PlannerTask {
            id: "p1".to_string(),
            title: "Review".to_string(),
            priority: 9,
            ..Default::default()
        };
        let summary = PlannerTaskSummary::from(&task);
        assert_eq!(summary.importance, "low");
        assert!(summary.due_date_time.is_none());
    }
}
