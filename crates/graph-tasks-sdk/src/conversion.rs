//! Planner → To-Do task conversion.
//!
//! A conversion is a fixed sequence of remote calls. Fetching the source task,
//! resolving the destination list, and creating the destination task are
//! critical and propagate their errors. Fetching details, copying each
//! checklist item, and marking the source complete are best-effort: failures
//! are logged and recorded in the [`ConversionReport`] instead.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use graph_tasks_client::models::{
    ChecklistItemDraft, PlannerTaskDetails, PlannerTaskPatch, TodoTask,
};
use graph_tasks_client::{ClientError, ClientResult, TaskApi, TaskSettings};

use crate::mapping::{map_planner_to_todo, ordered_checklist};

/// Etag sent when the source task carries none.
const WILDCARD_ETAG: &str = "*";

/// Parameters of a single conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub planner_task_id: String,
    /// Destination list; the user's default list when absent.
    pub todo_list_id: Option<String>,
    /// Mark the Planner task 100% complete after copying.
    pub mark_complete: bool,
    /// Prepend the configured title prefix.
    pub add_prefix: bool,
}

impl ConversionRequest {
    pub fn new(planner_task_id: impl Into<String>) -> Self {
        Self {
            planner_task_id: planner_task_id.into(),
            todo_list_id: None,
            mark_complete: true,
            add_prefix: true,
        }
    }
}

/// Outcome of copying one checklist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemResult {
    pub display_name: String,
    pub is_checked: bool,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What happened to the source task after conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceCompletion {
    MarkedComplete,
    Failed,
    NotRequested,
}

/// Result of a conversion. Returned whenever the destination task exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    pub success: bool,
    pub todo_task: TodoTask,
    pub todo_list_id: String,
    pub planner_task_id: String,
    /// `"<created>/<total> created"`.
    pub checklist_items: String,
    pub checklist_results: Vec<ChecklistItemResult>,
    pub source_completion: SourceCompletion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_completion_error: Option<String>,
    pub message: String,
}

impl ConversionReport {
    /// Number of checklist items created successfully.
    pub fn checklist_created(&self) -> usize {
        self.checklist_results.iter().filter(|r| r.success).count()
    }
}

/// Converts Planner tasks into To-Do tasks.
#[derive(Debug, Clone)]
pub struct TaskConverter {
    api: Arc<dyn TaskApi>,
    settings: TaskSettings,
}

impl TaskConverter {
    pub fn new(api: Arc<dyn TaskApi>, settings: TaskSettings) -> Self {
        Self { api, settings }
    }

    pub async fn convert(&self, request: &ConversionRequest) -> ClientResult<ConversionReport> {
        let source_id = request.planner_task_id.trim();
        if source_id.is_empty() {
            return Err(ClientError::InvalidInput(
                "plannerTaskId must not be empty".to_string(),
            ));
        }
        info!(planner_task_id = %source_id, "Converting Planner task");

        let task = self.api.get_planner_task(source_id).await?;

        let details = match self.api.get_planner_task_details(source_id).await {
            Ok(details) => Some(details),
            Err(e) => {
                warn!(planner_task_id = %source_id, error = %e, "Could not fetch task details, continuing without them");
                None
            }
        };

        let list_id = self.resolve_list(request.todo_list_id.as_deref()).await?;

        let draft = map_planner_to_todo(
            &task,
            details.as_ref(),
            request.add_prefix,
            &self.settings.title_prefix,
        );
        let created = self.api.create_todo_task(&list_id, &draft).await?;
        info!(todo_task_id = %created.id, todo_list_id = %list_id, "Created To-Do task");

        let checklist_results = match &details {
            Some(details) => self.copy_checklist(&list_id, &created.id, details).await,
            None => Vec::new(),
        };

        let (source_completion, source_completion_error) = if request.mark_complete {
            match self.mark_source_complete(source_id).await {
                Ok(()) => (SourceCompletion::MarkedComplete, None),
                Err(e) => {
                    warn!(planner_task_id = %source_id, error = %e, "Failed to mark Planner task complete");
                    (SourceCompletion::Failed, Some(e.to_string()))
                }
            }
        } else {
            (SourceCompletion::NotRequested, None)
        };

        let created_count = checklist_results.iter().filter(|r| r.success).count();
        let message = summary_message(&task.title, &created.title, source_completion);

        Ok(ConversionReport {
            success: true,
            checklist_items: format!("{}/{} created", created_count, checklist_results.len()),
            checklist_results,
            todo_task: created,
            todo_list_id: list_id,
            planner_task_id: source_id.to_string(),
            source_completion,
            source_completion_error,
            message,
        })
    }

    /// Explicit list id as given, otherwise the user's default list.
    ///
    /// An explicit id is not checked here; a bad id surfaces when the task is created.
    pub async fn resolve_list(&self, explicit: Option<&str>) -> ClientResult<String> {
        if let Some(id) = explicit.map(str::trim).filter(|id| !id.is_empty()) {
            return Ok(id.to_string());
        }
        let lists = self.api.list_todo_lists().await?;
        lists
            .into_iter()
            .find(|list| list.is_default())
            .map(|list| {
                debug!(list_id = %list.id, name = %list.display_name, "Using default To-Do list");
                list.id
            })
            .ok_or_else(|| ClientError::config_error("No default To-Do list found"))
    }

    async fn copy_checklist(
        &self,
        list_id: &str,
        todo_task_id: &str,
        details: &PlannerTaskDetails,
    ) -> Vec<ChecklistItemResult> {
        let mut results = Vec::with_capacity(details.checklist.len());
        for entry in ordered_checklist(details) {
            let draft = ChecklistItemDraft {
                display_name: entry.item.title.clone(),
                is_checked: entry.item.is_checked,
            };
            let outcome = self
                .api
                .create_checklist_item(list_id, todo_task_id, &draft)
                .await;
            let error = match outcome {
                Ok(_) => None,
                Err(e) => {
                    warn!(item = %draft.display_name, error = %e, "Failed to create checklist item");
                    Some(e.to_string())
                }
            };
            results.push(ChecklistItemResult {
                display_name: draft.display_name,
                is_checked: draft.is_checked,
                success: error.is_none(),
                error,
            });
        }
        results
    }

    /// Re-fetch for a fresh etag, then set the task to 100%.
    async fn mark_source_complete(&self, task_id: &str) -> ClientResult<()> {
        let current = self.api.get_planner_task(task_id).await?;
        let etag = current.etag.as_deref().unwrap_or(WILDCARD_ETAG);
        let patch = PlannerTaskPatch {
            percent_complete: Some(100),
            ..Default::default()
        };
        self.api.update_planner_task(task_id, etag, &patch).await
    }
}

fn summary_message(source_title: &str, todo_title: &str, completion: SourceCompletion) -> String {
    let base = format!(
        "Converted Planner task '{}' to To-Do task '{}'",
        source_title, todo_title
    );
    match completion {
        SourceCompletion::MarkedComplete => format!("{}; Planner task marked complete", base),
        SourceCompletion::Failed => format!("{}; failed to mark Planner task complete", base),
        SourceCompletion::NotRequested => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_tasks_client::models::{
        Checklist, ChecklistEntry, Importance, PlannerChecklistItem, PlannerTask, TaskStatus,
        TodoTaskList, WellknownListName,
    };
    use graph_tasks_client::testing::FakeTaskApi;

    fn default_list() -> TodoTaskList {
        TodoTaskList {
            id: "default-list".to_string(),
            display_name: "Tasks".to_string(),
            wellknown_list_name: WellknownListName::DefaultList,
            ..Default::default()
        }
    }

    fn work_list() -> TodoTaskList {
        TodoTaskList {
            id: "work-list".to_string(),
            display_name: "Work".to_string(),
            ..Default::default()
        }
    }

    fn source_task() -> PlannerTask {
        PlannerTask {
            etag: Some("W/\"etag-1\"".to_string()),
            id: "planner-1".to_string(),
            title: "Tapped Hole".to_string(),
            plan_id: "plan-1".to_string(),
            priority: 1,
            percent_complete: 100,
            ..Default::default()
        }
    }

    fn checklist_details() -> PlannerTaskDetails {
        let item = |title: &str, checked: bool, hint: &str| PlannerChecklistItem {
            title: title.to_string(),
            is_checked: checked,
            order_hint: Some(hint.to_string()),
            ..Default::default()
        };
        PlannerTaskDetails {
            id: "planner-1".to_string(),
            description: Some("Drill and tap".to_string()),
            checklist: Checklist(vec![
                ChecklistEntry {
                    id: "c2".to_string(),
                    item: item("Deburr", false, "2"),
                },
                ChecklistEntry {
                    id: "c1".to_string(),
                    item: item("Drill", true, "1"),
                },
            ]),
            ..Default::default()
        }
    }

    fn converter(api: Arc<FakeTaskApi>) -> TaskConverter {
        TaskConverter::new(api, TaskSettings::default())
    }

    #[tokio::test]
    async fn test_end_to_end_partial_checklist_failure() {
        let api = Arc::new(
            FakeTaskApi::new()
                .with_planner_task(source_task())
                .with_details("planner-1", checklist_details())
                .with_list(work_list())
                .with_list(default_list())
                .fail_checklist_item("Deburr"),
        );

        let report = converter(api.clone())
            .convert(&ConversionRequest::new("planner-1"))
            .await
            .unwrap();

        assert!(report.success);
        assert_eq!(report.checklist_items, "1/2 created");
        assert_eq!(report.todo_task.importance, Importance::High);
        assert_eq!(report.todo_task.status, TaskStatus::Completed);
        assert_eq!(report.todo_task.title, "[Planner] Tapped Hole");
        assert_eq!(report.todo_list_id, "default-list");
        assert_eq!(report.source_completion, SourceCompletion::MarkedComplete);

        // Both items attempted, in order-hint order.
        let attempted: Vec<&str> = report
            .checklist_results
            .iter()
            .map(|r| r.display_name.as_str())
            .collect();
        assert_eq!(attempted, vec!["Drill", "Deburr"]);
        assert!(report.checklist_results[0].success);
        assert!(!report.checklist_results[1].success);
        assert!(report.checklist_results[1].error.is_some());
        assert_eq!(api.checklist_items(&report.todo_task.id).len(), 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["checklistItems"], "1/2 created");
        assert_eq!(json["todoTask"]["importance"], "high");
        assert_eq!(json["todoTask"]["status"], "completed");
        assert_eq!(json["sourceCompletion"], "markedComplete");
    }

    #[tokio::test]
    async fn test_completion_uses_refetched_etag() {
        let api = Arc::new(
            FakeTaskApi::new()
                .with_planner_task(source_task())
                .with_list(default_list()),
        );
        converter(api.clone())
            .convert(&ConversionRequest::new("planner-1"))
            .await
            .unwrap();

        let updates = api.planner_updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].1, "W/\"etag-1\"");
        assert_eq!(updates[0].2.percent_complete, Some(100));

        let fetches = api
            .calls()
            .iter()
            .filter(|c| c.as_str() == "get_planner_task:planner-1")
            .count();
        assert_eq!(fetches, 2);
    }

    #[tokio::test]
    async fn test_missing_etag_uses_wildcard() {
        let task = PlannerTask {
            etag: None,
            ..source_task()
        };
        let api = Arc::new(
            FakeTaskApi::new()
                .with_planner_task(task)
                .with_list(default_list()),
        );
        converter(api.clone())
            .convert(&ConversionRequest::new("planner-1"))
            .await
            .unwrap();
        assert_eq!(api.planner_updates()[0].1, "*");
    }

    #[tokio::test]
    async fn test_completion_failure_still_succeeds() {
        let api = Arc::new(
            FakeTaskApi::new()
                .with_planner_task(source_task())
                .with_list(default_list())
                .fail_planner_update(),
        );
        let report = converter(api)
            .convert(&ConversionRequest::new("planner-1"))
            .await
            .unwrap();

        assert!(report.success);
        assert_eq!(report.source_completion, SourceCompletion::Failed);
        assert!(report
            .source_completion_error
            .as_deref()
            .unwrap()
            .contains("412"));
    }

    #[tokio::test]
    async fn test_completion_not_requested() {
        let api = Arc::new(
            FakeTaskApi::new()
                .with_planner_task(source_task())
                .with_list(default_list()),
        );
        let request = ConversionRequest {
            mark_complete: false,
            add_prefix: false,
            ..ConversionRequest::new("planner-1")
        };
        let report = converter(api.clone()).convert(&request).await.unwrap();

        assert_eq!(report.source_completion, SourceCompletion::NotRequested);
        assert_eq!(report.todo_task.title, "Tapped Hole");
        assert!(api.planner_updates().is_empty());
    }

    #[tokio::test]
    async fn test_details_failure_is_best_effort() {
        let api = Arc::new(
            FakeTaskApi::new()
                .with_planner_task(source_task())
                .with_list(default_list())
                .fail_details(),
        );
        let report = converter(api)
            .convert(&ConversionRequest::new("planner-1"))
            .await
            .unwrap();

        assert_eq!(report.checklist_items, "0/0 created");
        let body = report.todo_task.body.unwrap();
        assert!(body.content.starts_with("Converted from Microsoft Planner"));
    }

    #[tokio::test]
    async fn test_missing_source_task_propagates() {
        let api = Arc::new(FakeTaskApi::new().with_list(default_list()));
        let err = converter(api.clone())
            .convert(&ConversionRequest::new("missing"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::NotFound { .. }));
        assert!(!api.calls().iter().any(|c| c.starts_with("create_todo_task")));
    }

    #[tokio::test]
    async fn test_no_default_list_is_config_error() {
        let api = Arc::new(
            FakeTaskApi::new()
                .with_planner_task(source_task())
                .with_list(work_list()),
        );
        let err = converter(api.clone())
            .convert(&ConversionRequest::new("planner-1"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::ConfigError(_)));
        assert!(!api.calls().iter().any(|c| c.starts_with("create_todo_task")));
    }

    #[tokio::test]
    async fn test_explicit_list_is_used_without_lookup() {
        let api = Arc::new(
            FakeTaskApi::new()
                .with_planner_task(source_task())
                .with_list(work_list()),
        );
        let request = ConversionRequest {
            todo_list_id: Some("work-list".to_string()),
            ..ConversionRequest::new("planner-1")
        };
        let report = converter(api.clone()).convert(&request).await.unwrap();

        assert_eq!(report.todo_list_id, "work-list");
        assert!(!api.calls().contains(&"list_todo_lists".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_explicit_list_fails_on_create() {
        let api = Arc::new(FakeTaskApi::new().with_planner_task(source_task()));
        let request = ConversionRequest {
            todo_list_id: Some("nope".to_string()),
            ..ConversionRequest::new("planner-1")
        };
        let err = converter(api.clone()).convert(&request).await.unwrap_err();

        assert!(matches!(err, ClientError::NotFound { .. }));
        assert!(api.planner_updates().is_empty());
    }

    #[tokio::test]
    async fn test_empty_task_id_is_invalid_input() {
        let api = Arc::new(FakeTaskApi::new());
        let err = converter(api.clone())
            .convert(&ConversionRequest::new("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
        assert!(api.calls().is_empty());
    }
}
