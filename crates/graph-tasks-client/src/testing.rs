//! In-memory [`TaskApi`] for tests in this and downstream crates.
//!
//! Enabled with the `test-utils` feature. State is seeded with the `with_*`
//! builders, failures are injected per call site, and every call is recorded
//! so tests can assert on exactly which remote operations ran.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::api::{TaskApi, TodoTaskQuery};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    ChecklistItemDraft, PlannerTask, PlannerTaskDetails, PlannerTaskPatch, TodoChecklistItem,
    TodoTask, TodoTaskDraft, TodoTaskList, TodoTaskPatch,
};

#[derive(Debug, Default)]
struct FakeState {
    planner_tasks: Vec<PlannerTask>,
    planner_details: HashMap<String, PlannerTaskDetails>,
    lists: Vec<TodoTaskList>,
    todo_tasks: HashMap<String, Vec<TodoTask>>,
    checklist_items: HashMap<String, Vec<TodoChecklistItem>>,
    planner_updates: Vec<(String, String, PlannerTaskPatch)>,
    calls: Vec<String>,
    failing_checklist_titles: HashSet<String>,
    failing_lists: HashSet<String>,
    fail_details: bool,
    fail_planner_update: bool,
    fail_list_lists: bool,
    fail_session: bool,
    sessions: usize,
    next_id: u64,
}

impl FakeState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn has_list(&self, list_id: &str) -> bool {
        self.lists.iter().any(|l| l.id == list_id)
    }
}

/// In-memory Planner + To-Do backend.
///
/// Clones share state, so sessions opened from it see and record the same
/// data as the original.
#[derive(Debug, Default, Clone)]
pub struct FakeTaskApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTaskApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_planner_task(self, task: PlannerTask) -> Self {
        self.state().planner_tasks.push(task);
        self
    }

    pub fn with_details(self, task_id: &str, details: PlannerTaskDetails) -> Self {
        self.state()
            .planner_details
            .insert(task_id.to_string(), details);
        self
    }

    pub fn with_list(self, list: TodoTaskList) -> Self {
        self.state().lists.push(list);
        self
    }

    pub fn with_todo_task(self, list_id: &str, task: TodoTask) -> Self {
        self.state()
            .todo_tasks
            .entry(list_id.to_string())
            .or_default()
            .push(task);
        self
    }

    /// Make checklist item creation fail for items with this display name.
    pub fn fail_checklist_item(self, display_name: &str) -> Self {
        self.state()
            .failing_checklist_titles
            .insert(display_name.to_string());
        self
    }

    /// Make task listing fail for this list.
    pub fn fail_list(self, list_id: &str) -> Self {
        self.state().failing_lists.insert(list_id.to_string());
        self
    }

    /// Make every details fetch fail.
    pub fn fail_details(self) -> Self {
        self.state().fail_details = true;
        self
    }

    /// Make every Planner update fail with a precondition error.
    pub fn fail_planner_update(self) -> Self {
        self.state().fail_planner_update = true;
        self
    }

    /// Make listing To-Do lists fail.
    pub fn fail_list_lists(self) -> Self {
        self.state().fail_list_lists = true;
        self
    }

    /// Make opening a session fail with an authentication error.
    pub fn fail_session(self) -> Self {
        self.state().fail_session = true;
        self
    }

    /// Number of sessions opened so far.
    pub fn sessions(&self) -> usize {
        self.state().sessions
    }

    /// Every call made so far, as `operation:argument` strings.
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Planner updates as `(task_id, etag, patch)`.
    pub fn planner_updates(&self) -> Vec<(String, String, PlannerTaskPatch)> {
        self.state().planner_updates.clone()
    }

    /// Current tasks of a To-Do list.
    pub fn todo_tasks(&self, list_id: &str) -> Vec<TodoTask> {
        self.state()
            .todo_tasks
            .get(list_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Checklist items created on a To-Do task.
    pub fn checklist_items(&self, task_id: &str) -> Vec<TodoChecklistItem> {
        self.state()
            .checklist_items
            .get(task_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl TaskApi for FakeTaskApi {
    async fn session(&self) -> ClientResult<Arc<dyn TaskApi>> {
        let mut state = self.state();
        if state.fail_session {
            return Err(ClientError::AuthError("token command failed".to_string()));
        }
        state.sessions += 1;
        drop(state);
        Ok(Arc::new(self.clone()))
    }

    async fn get_planner_task(&self, task_id: &str) -> ClientResult<PlannerTask> {
        let mut state = self.state();
        state.calls.push(format!("get_planner_task:{task_id}"));
        state
            .planner_tasks
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
            .ok_or_else(|| ClientError::not_found("Planner task", task_id))
    }

    async fn get_planner_task_details(&self, task_id: &str) -> ClientResult<PlannerTaskDetails> {
        let mut state = self.state();
        state.calls.push(format!("get_planner_task_details:{task_id}"));
        if state.fail_details {
            return Err(ClientError::api_error(500, "details unavailable"));
        }
        state
            .planner_details
            .get(task_id)
            .cloned()
            .ok_or_else(|| ClientError::not_found("Planner task details", task_id))
    }

    async fn list_my_planner_tasks(&self) -> ClientResult<Vec<PlannerTask>> {
        let mut state = self.state();
        state.calls.push("list_my_planner_tasks".to_string());
        Ok(state.planner_tasks.clone())
    }

    async fn update_planner_task(
        &self,
        task_id: &str,
        etag: &str,
        patch: &PlannerTaskPatch,
    ) -> ClientResult<()> {
        let mut state = self.state();
        state.calls.push(format!("update_planner_task:{task_id}"));
        if state.fail_planner_update {
            return Err(ClientError::api_error(412, "Precondition Failed"));
        }
        state
            .planner_updates
            .push((task_id.to_string(), etag.to_string(), patch.clone()));
        let task = state
            .planner_tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| ClientError::not_found("Planner task", task_id))?;
        if let Some(percent) = patch.percent_complete {
            task.percent_complete = percent;
        }
        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        Ok(())
    }

    async fn list_todo_lists(&self) -> ClientResult<Vec<TodoTaskList>> {
        let mut state = self.state();
        state.calls.push("list_todo_lists".to_string());
        if state.fail_list_lists {
            return Err(ClientError::api_error(503, "Service Unavailable"));
        }
        Ok(state.lists.clone())
    }

    async fn list_todo_tasks(
        &self,
        list_id: &str,
        query: &TodoTaskQuery,
    ) -> ClientResult<Vec<TodoTask>> {
        let mut state = self.state();
        state.calls.push(format!("list_todo_tasks:{list_id}"));
        if state.failing_lists.contains(list_id) {
            return Err(ClientError::api_error(500, "list query failed"));
        }
        if !state.has_list(list_id) {
            return Err(ClientError::not_found("To-Do list", list_id));
        }
        let tasks = state.todo_tasks.get(list_id).cloned().unwrap_or_default();
        let mut matching: Vec<TodoTask> = tasks.into_iter().filter(|t| query.matches(t)).collect();
        if let Some(top) = query.top {
            matching.truncate(top as usize);
        }
        Ok(matching)
    }

    async fn get_todo_task(&self, list_id: &str, task_id: &str) -> ClientResult<TodoTask> {
        let mut state = self.state();
        state.calls.push(format!("get_todo_task:{task_id}"));
        state
            .todo_tasks
            .get(list_id)
            .and_then(|tasks| tasks.iter().find(|t| t.id == task_id))
            .cloned()
            .ok_or_else(|| ClientError::not_found("To-Do task", task_id))
    }

    async fn create_todo_task(
        &self,
        list_id: &str,
        draft: &TodoTaskDraft,
    ) -> ClientResult<TodoTask> {
        let mut state = self.state();
        state.calls.push(format!("create_todo_task:{list_id}"));
        if !state.has_list(list_id) {
            return Err(ClientError::not_found("To-Do list", list_id));
        }
        let task = TodoTask {
            id: state.next_id("todo"),
            title: draft.title.clone(),
            body: draft.body.clone(),
            importance: draft.importance,
            status: draft.status,
            due_date_time: draft.due_date_time.clone(),
            ..Default::default()
        };
        state
            .todo_tasks
            .entry(list_id.to_string())
            .or_default()
            .push(task.clone());
        Ok(task)
    }

    async fn update_todo_task(
        &self,
        list_id: &str,
        task_id: &str,
        patch: &TodoTaskPatch,
    ) -> ClientResult<TodoTask> {
        let mut state = self.state();
        state.calls.push(format!("update_todo_task:{task_id}"));
        let task = state
            .todo_tasks
            .get_mut(list_id)
            .and_then(|tasks| tasks.iter_mut().find(|t| t.id == task_id))
            .ok_or_else(|| ClientError::not_found("To-Do task", task_id))?;
        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(importance) = patch.importance {
            task.importance = importance;
        }
        Ok(task.clone())
    }

    async fn create_checklist_item(
        &self,
        _list_id: &str,
        task_id: &str,
        item: &ChecklistItemDraft,
    ) -> ClientResult<TodoChecklistItem> {
        let mut state = self.state();
        state
            .calls
            .push(format!("create_checklist_item:{}", item.display_name));
        if state.failing_checklist_titles.contains(&item.display_name) {
            return Err(ClientError::api_error(400, "Invalid checklist item"));
        }
        let created = TodoChecklistItem {
            id: state.next_id("step"),
            display_name: item.display_name.clone(),
            is_checked: item.is_checked,
            ..Default::default()
        };
        state
            .checklist_items
            .entry(task_id.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }
}
