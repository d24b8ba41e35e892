//! MCP ServerHandler implementation for graph-tasks.
//!
//! Exposes Microsoft Planner and To-Do operations to LLM agents:
//!
//! **Conversion and search**
//! - `convert_planner_task`: Copy a Planner task into To-Do, then mark the source complete
//! - `find_todo_task`: Find a To-Do task by title across prioritized lists
//!
//! **Read-only**
//! - `list_todo_lists`: All To-Do lists of the signed-in user
//! - `list_todo_tasks`: Tasks of one To-Do list
//! - `get_planner_task`: A Planner task with its description and checklist
//! - `list_my_planner_tasks`: Planner tasks assigned to the signed-in user
//!
//! **Write**
//! - `complete_todo_task`: Mark a To-Do task completed

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use tracing::{debug, warn};

use graph_tasks_client::models::{TaskStatus, TodoTaskPatch};
use graph_tasks_client::{
    ClientConfig, ClientResult, GraphClient, TaskApi, TaskSettings, TodoTaskQuery,
};
use graph_tasks_sdk::mapping::ordered_checklist;
use graph_tasks_sdk::responses::{ListSummary, PlannerTaskSummary, TaskProjection};
use graph_tasks_sdk::{ConversionRequest, FindRequest, TaskConverter, TaskFinder};

use crate::tools::*;

/// Largest page a single `list_todo_tasks` call returns.
const MAX_TOP: u32 = 100;

/// graph-tasks MCP server handler.
#[derive(Debug, Clone)]
pub struct GraphTasksMcpServer {
    tool_router: ToolRouter<Self>,
    api: Arc<dyn TaskApi>,
    settings: TaskSettings,
}

impl GraphTasksMcpServer {
    /// Create a server over any [`TaskApi`] backend.
    pub fn new(api: Arc<dyn TaskApi>, settings: TaskSettings) -> Self {
        Self {
            tool_router: Self::tool_router(),
            api,
            settings,
        }
    }

    /// Create a server backed by the live Graph API.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let client = GraphClient::from_config(config)?;
        Ok(Self::new(Arc::new(client), config.tasks.clone()))
    }

    /// Backend handle for one tool invocation; the token is resolved once here.
    async fn session(&self) -> ClientResult<Arc<dyn TaskApi>> {
        self.api.session().await
    }

    fn converter(&self, api: Arc<dyn TaskApi>) -> TaskConverter {
        TaskConverter::new(api, self.settings.clone())
    }

    fn finder(&self, api: Arc<dyn TaskApi>) -> TaskFinder {
        TaskFinder::new(api, self.settings.clone())
    }
}

/// `None` for absent or whitespace-only optional ids.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for GraphTasksMcpServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = "graph-tasks bridges Microsoft Planner and Microsoft To-Do for the signed-in user.\n\
             Conversion: get_planner_task or list_my_planner_tasks to pick a source, then \
             convert_planner_task copies it (title, notes, due date, importance, checklist) into a To-Do list \
             and marks the Planner task 100% complete. Pass markComplete: false to leave the source open.\n\
             Lookup: find_todo_task searches lists by a keyword taken from the title and returns an exact match, \
             partial matches, or none. list_todo_lists/list_todo_tasks browse lists directly.\n\
             complete_todo_task marks a To-Do task completed.\n\
             Errors are returned as JSON objects with 'error' (code) and 'message' fields."
            .to_string();

        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "graph-tasks-mcp".to_string(),
                title: Some("Graph Tasks MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some(
                    "Microsoft Planner and To-Do tools: task conversion, title search, and list browsing"
                        .to_string(),
                ),
                icons: None,
                website_url: None,
            },
            instructions: Some(instructions),
        }
    }
}

#[tool_router(router = tool_router)]
impl GraphTasksMcpServer {
    // ── Conversion and search ──

    /// Convert a Planner task into a To-Do task.
    #[tool(
        name = "convert_planner_task",
        description = "Convert a Microsoft Planner task into a Microsoft To-Do task. Copies the title (prefixed with '[Planner] ' unless addPrefix is false), description plus a provenance footer, due date, importance (from Planner priority) and checklist items in Planner order, then marks the Planner task 100% complete unless markComplete is false. Uses the default To-Do list when todoListId is omitted. Checklist and completion failures are reported in the result rather than failing the call."
    )]
    pub async fn convert_planner_task(
        &self,
        Parameters(params): Parameters<ConvertPlannerTaskParams>,
    ) -> CallToolResult {
        let request = ConversionRequest {
            planner_task_id: params.planner_task_id,
            todo_list_id: non_blank(params.todo_list_id),
            mark_complete: params.mark_complete,
            add_prefix: params.add_prefix,
        };
        let api = match self.session().await {
            Ok(api) => api,
            Err(e) => return client_error_result(&e),
        };
        match self.converter(api).convert(&request).await {
            Ok(report) => json_result(&report),
            Err(e) => client_error_result(&e),
        }
    }

    /// Find a To-Do task by title.
    #[tool(
        name = "find_todo_task",
        description = "Find a Microsoft To-Do task by title. Searches lists (Planner, Work and Tasks lists first) for titles containing a keyword from the given title. Returns matchType 'exact' with the full task when a title matches exactly, 'partial' with lightweight matches otherwise, or 'none'. Completed tasks are skipped unless includeCompleted is true."
    )]
    pub async fn find_todo_task(
        &self,
        Parameters(params): Parameters<FindTodoTaskParams>,
    ) -> CallToolResult {
        let request = FindRequest {
            title: params.title,
            list_id: non_blank(params.list_id),
            include_completed: params.include_completed,
        };
        let api = match self.session().await {
            Ok(api) => api,
            Err(e) => return client_error_result(&e),
        };
        match self.finder(api).find(&request).await {
            Ok(outcome) => json_result(&outcome),
            Err(e) => client_error_result(&e),
        }
    }

    // ── Read-only ──

    /// List all To-Do lists.
    #[tool(
        name = "list_todo_lists",
        description = "List all Microsoft To-Do lists of the signed-in user with id, displayName, wellknownListName and whether the list is the default. Use the ids with list_todo_tasks, find_todo_task or convert_planner_task."
    )]
    pub async fn list_todo_lists(&self) -> CallToolResult {
        let api = match self.session().await {
            Ok(api) => api,
            Err(e) => return client_error_result(&e),
        };
        match api.list_todo_lists().await {
            Ok(lists) => {
                let summaries: Vec<ListSummary> = lists.iter().map(ListSummary::from).collect();
                json_result(&serde_json::json!({
                    "count": summaries.len(),
                    "lists": summaries,
                }))
            }
            Err(e) => client_error_result(&e),
        }
    }

    /// List tasks of one To-Do list.
    #[tool(
        name = "list_todo_tasks",
        description = "List tasks of a Microsoft To-Do list as lightweight summaries (id, title, status, importance, due date). Completed tasks are skipped unless includeCompleted is true. Use top to cap the number of results (max 100)."
    )]
    pub async fn list_todo_tasks(
        &self,
        Parameters(params): Parameters<ListTodoTasksParams>,
    ) -> CallToolResult {
        let list_id = params.list_id.trim();
        if list_id.is_empty() {
            return error_result("invalid_input", "listId must not be empty");
        }
        let top = params.top.map(|t| t.clamp(1, MAX_TOP));
        let query = TodoTaskQuery {
            title_contains: None,
            exclude_completed: !params.include_completed,
            top,
        };

        let api = match self.session().await {
            Ok(api) => api,
            Err(e) => return client_error_result(&e),
        };
        match api.list_todo_tasks(list_id, &query).await {
            Ok(tasks) => {
                let limit = top.map_or(tasks.len(), |t| t as usize);
                let projections: Vec<TaskProjection> = tasks
                    .iter()
                    .take(limit)
                    .map(|t| TaskProjection::new(t, list_id))
                    .collect();
                json_result(&serde_json::json!({
                    "listId": list_id,
                    "count": projections.len(),
                    "tasks": projections,
                }))
            }
            Err(e) => client_error_result(&e),
        }
    }

    /// Get a Planner task with its details.
    #[tool(
        name = "get_planner_task",
        description = "Get a Microsoft Planner task: title, plan, priority with the To-Do importance it converts to, percent complete, dates, description and checklist items in display order. If the details cannot be fetched the task is still returned with detailsError set."
    )]
    pub async fn get_planner_task(
        &self,
        Parameters(params): Parameters<GetPlannerTaskParams>,
    ) -> CallToolResult {
        let task_id = params.planner_task_id.trim();
        if task_id.is_empty() {
            return error_result("invalid_input", "plannerTaskId must not be empty");
        }
        let api = match self.session().await {
            Ok(api) => api,
            Err(e) => return client_error_result(&e),
        };
        let task = match api.get_planner_task(task_id).await {
            Ok(task) => task,
            Err(e) => return client_error_result(&e),
        };

        let mut view = PlannerTaskView {
            task: PlannerTaskSummary::from(&task),
            description: None,
            checklist: Vec::new(),
            details_error: None,
        };
        match api.get_planner_task_details(task_id).await {
            Ok(details) => {
                view.checklist = ordered_checklist(&details)
                    .into_iter()
                    .map(|entry| ChecklistItemView {
                        id: entry.id.clone(),
                        title: entry.item.title.clone(),
                        is_checked: entry.item.is_checked,
                    })
                    .collect();
                view.description = details.description.filter(|d| !d.trim().is_empty());
            }
            Err(e) => {
                warn!(planner_task_id = %task_id, error = %e, "Could not fetch Planner task details");
                view.details_error = Some(e.to_string());
            }
        }
        json_result(&view)
    }

    /// List Planner tasks assigned to the signed-in user.
    #[tool(
        name = "list_my_planner_tasks",
        description = "List Microsoft Planner tasks assigned to the signed-in user. Tasks at 100% complete are skipped unless includeCompleted is true. Pass an id to get_planner_task or convert_planner_task."
    )]
    pub async fn list_my_planner_tasks(
        &self,
        Parameters(params): Parameters<ListMyPlannerTasksParams>,
    ) -> CallToolResult {
        let api = match self.session().await {
            Ok(api) => api,
            Err(e) => return client_error_result(&e),
        };
        match api.list_my_planner_tasks().await {
            Ok(tasks) => {
                let summaries: Vec<PlannerTaskSummary> = tasks
                    .iter()
                    .filter(|t| params.include_completed || t.percent_complete < 100)
                    .map(PlannerTaskSummary::from)
                    .collect();
                debug!(total = tasks.len(), returned = summaries.len(), "Listed Planner tasks");
                json_result(&serde_json::json!({
                    "count": summaries.len(),
                    "tasks": summaries,
                }))
            }
            Err(e) => client_error_result(&e),
        }
    }

    // ── Write ──

    /// Mark a To-Do task completed.
    #[tool(
        name = "complete_todo_task",
        description = "Mark a Microsoft To-Do task as completed. Requires the list id and task id (from find_todo_task or list_todo_tasks). Returns the updated task summary."
    )]
    pub async fn complete_todo_task(
        &self,
        Parameters(params): Parameters<CompleteTodoTaskParams>,
    ) -> CallToolResult {
        let list_id = params.list_id.trim();
        let task_id = params.task_id.trim();
        if list_id.is_empty() || task_id.is_empty() {
            return error_result("invalid_input", "listId and taskId must not be empty");
        }
        let patch = TodoTaskPatch {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        let api = match self.session().await {
            Ok(api) => api,
            Err(e) => return client_error_result(&e),
        };
        match api.update_todo_task(list_id, task_id, &patch).await {
            Ok(task) => json_result(&TaskProjection::new(&task, list_id)),
            Err(e) => client_error_result(&e),
        }
    }
}
