//! The remote task-management surface used by conversion and search.
//!
//! `TaskApi` is the seam between orchestration logic and transport: the
//! reqwest-backed [`GraphClient`](crate::GraphClient) implements it for the
//! live API, and `testing::FakeTaskApi` implements it in memory.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::models::{
    ChecklistItemDraft, PlannerTask, PlannerTaskDetails, PlannerTaskPatch, TodoChecklistItem,
    TodoTask, TodoTaskDraft, TodoTaskList, TodoTaskPatch,
};

/// Server-side filter for listing To-Do tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoTaskQuery {
    /// Substring the task title must contain.
    pub title_contains: Option<String>,
    /// Skip tasks whose status is `completed`.
    pub exclude_completed: bool,
    /// Maximum number of tasks to return; sent as `$top` and caps paging.
    pub top: Option<u32>,
}

impl TodoTaskQuery {
    /// Render the OData `$filter` expression, if any condition is set.
    ///
    /// Single quotes inside the title fragment are escaped by doubling.
    pub fn odata_filter(&self) -> Option<String> {
        let mut clauses = Vec::new();
        if let Some(fragment) = &self.title_contains {
            clauses.push(format!("contains(title,'{}')", fragment.replace('\'', "''")));
        }
        if self.exclude_completed {
            clauses.push("status ne 'completed'".to_string());
        }
        if clauses.is_empty() {
            None
        } else {
            Some(clauses.join(" and "))
        }
    }

    /// Whether a task satisfies this query (same semantics as the server filter).
    pub fn matches(&self, task: &TodoTask) -> bool {
        let title_ok = self
            .title_contains
            .as_ref()
            .is_none_or(|fragment| task.title.contains(fragment.as_str()));
        let status_ok =
            !self.exclude_completed || task.status != crate::models::TaskStatus::Completed;
        title_ok && status_ok
    }
}

/// Read/insert/update operations on Planner and To-Do resources.
#[async_trait]
pub trait TaskApi: Send + Sync + std::fmt::Debug {
    /// A handle for one logical operation. Credentials are resolved once here
    /// and reused by every call made through the returned handle; callers
    /// open a fresh session per operation and drop it afterwards.
    async fn session(&self) -> ClientResult<Arc<dyn TaskApi>>;

    /// Fetch a Planner task by id.
    async fn get_planner_task(&self, task_id: &str) -> ClientResult<PlannerTask>;

    /// Fetch the details (description, checklist) of a Planner task.
    async fn get_planner_task_details(&self, task_id: &str) -> ClientResult<PlannerTaskDetails>;

    /// Planner tasks assigned to the signed-in user.
    async fn list_my_planner_tasks(&self) -> ClientResult<Vec<PlannerTask>>;

    /// Conditional update of a Planner task guarded by `etag` (`If-Match`).
    async fn update_planner_task(
        &self,
        task_id: &str,
        etag: &str,
        patch: &PlannerTaskPatch,
    ) -> ClientResult<()>;

    /// All To-Do lists of the signed-in user.
    async fn list_todo_lists(&self) -> ClientResult<Vec<TodoTaskList>>;

    /// Tasks of a To-Do list, filtered server-side.
    async fn list_todo_tasks(
        &self,
        list_id: &str,
        query: &TodoTaskQuery,
    ) -> ClientResult<Vec<TodoTask>>;

    /// Fetch a single To-Do task.
    async fn get_todo_task(&self, list_id: &str, task_id: &str) -> ClientResult<TodoTask>;

    /// Insert a To-Do task.
    async fn create_todo_task(&self, list_id: &str, draft: &TodoTaskDraft)
        -> ClientResult<TodoTask>;

    /// Update a To-Do task.
    async fn update_todo_task(
        &self,
        list_id: &str,
        task_id: &str,
        patch: &TodoTaskPatch,
    ) -> ClientResult<TodoTask>;

    /// Insert a checklist item on a To-Do task.
    async fn create_checklist_item(
        &self,
        list_id: &str,
        task_id: &str,
        item: &ChecklistItemDraft,
    ) -> ClientResult<TodoChecklistItem>;
}
