//! Parameter and response structs for all MCP tools.
//!
//! Parameter field names are camelCase on the wire, matching Graph.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use graph_tasks_sdk::responses::PlannerTaskSummary;

fn default_true() -> bool {
    true
}

// ── convert_planner_task ──

/// Parameters for the `convert_planner_task` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConvertPlannerTaskParams {
    /// Planner task to copy.
    #[schemars(description = "ID of the Planner task to convert")]
    pub planner_task_id: String,
    /// Destination list; the default To-Do list when omitted.
    #[schemars(description = "Destination To-Do list ID (defaults to the user's default list)")]
    #[serde(default)]
    pub todo_list_id: Option<String>,
    #[schemars(description = "Mark the Planner task 100% complete after conversion (default: true)")]
    #[serde(default = "default_true")]
    pub mark_complete: bool,
    #[schemars(description = "Prefix the To-Do title with '[Planner] ' (default: true)")]
    #[serde(default = "default_true")]
    pub add_prefix: bool,
}

// ── find_todo_task ──

/// Parameters for the `find_todo_task` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindTodoTaskParams {
    /// Title (or part of it) to search for.
    #[schemars(description = "Task title to search for; an exact title match is returned in full")]
    pub title: String,
    #[schemars(description = "Only search this To-Do list (searches all lists when omitted)")]
    #[serde(default)]
    pub list_id: Option<String>,
    #[schemars(description = "Include completed tasks in the search (default: false)")]
    #[serde(default)]
    pub include_completed: bool,
}

// ── list_todo_tasks ──

/// Parameters for the `list_todo_tasks` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListTodoTasksParams {
    #[schemars(description = "To-Do list ID (from list_todo_lists)")]
    pub list_id: String,
    #[schemars(description = "Include completed tasks (default: false)")]
    #[serde(default)]
    pub include_completed: bool,
    /// Maximum number of tasks to return.
    #[schemars(description = "Maximum number of tasks to return (1-100)")]
    #[serde(default)]
    pub top: Option<u32>,
}

// ── get_planner_task ──

/// Parameters for the `get_planner_task` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetPlannerTaskParams {
    #[schemars(description = "ID of the Planner task")]
    pub planner_task_id: String,
}

/// Response for the `get_planner_task` tool.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerTaskView {
    pub task: PlannerTaskSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub checklist: Vec<ChecklistItemView>,
    /// Set when details could not be fetched; the task itself is still returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details_error: Option<String>,
}

/// A Planner checklist item in display order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemView {
    pub id: String,
    pub title: String,
    pub is_checked: bool,
}

// ── list_my_planner_tasks ──

/// Parameters for the `list_my_planner_tasks` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListMyPlannerTasksParams {
    #[schemars(description = "Include 100% complete tasks (default: false)")]
    #[serde(default)]
    pub include_completed: bool,
}

// ── complete_todo_task ──

/// Parameters for the `complete_todo_task` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTodoTaskParams {
    #[schemars(description = "To-Do list ID containing the task")]
    pub list_id: String,
    #[schemars(description = "ID of the To-Do task to mark completed")]
    pub task_id: String,
}
