//! Title search across To-Do lists.
//!
//! Lists are searched one at a time in priority order using a server-side
//! keyword filter. The first exact title match ends the search; everything
//! else seen along the way is reported as a partial match.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use graph_tasks_client::models::{TodoTask, TodoTaskList};
use graph_tasks_client::{ClientError, ClientResult, TaskApi, TaskSettings, TodoTaskQuery};

use crate::responses::TaskProjection;

const MIN_KEYWORD_CHARS: usize = 3;
const FALLBACK_KEYWORD_CHARS: usize = 20;

static NON_WORD: OnceLock<Regex> = OnceLock::new();

/// Anything that is not an ASCII word character or whitespace.
fn non_word() -> &'static Regex {
    NON_WORD.get_or_init(|| {
        Regex::new(r"[^A-Za-z0-9_\s]").expect("Invalid regex pattern - this is a compile-time constant")
    })
}

/// Derive the server-side search keyword from a task title.
///
/// Drops `#` marks and punctuation, then takes the first token longer than
/// three characters. Falls back to the first 20 characters of the raw title.
/// This is a heuristic and can pick a poor keyword for some titles.
pub fn extract_keyword(title: &str) -> String {
    let untagged = title.replace('#', "");
    let cleaned = non_word().replace_all(&untagged, "");
    cleaned
        .split_whitespace()
        .find(|token| token.chars().count() > MIN_KEYWORD_CHARS)
        .map(str::to_string)
        .unwrap_or_else(|| title.chars().take(FALLBACK_KEYWORD_CHARS).collect())
}

/// Order lists by the first priority substring their display name contains.
///
/// Matching is case-sensitive; unmatched lists go last; ties keep input order.
pub fn prioritize_lists(mut lists: Vec<TodoTaskList>, priority: &[String]) -> Vec<TodoTaskList> {
    lists.sort_by_key(|list| {
        priority
            .iter()
            .position(|needle| list.display_name.contains(needle.as_str()))
            .unwrap_or(priority.len())
    });
    lists
}

/// Parameters of a title search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindRequest {
    pub title: String,
    /// Restrict the search to this list.
    pub list_id: Option<String>,
    pub include_completed: bool,
}

impl FindRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            list_id: None,
            include_completed: false,
        }
    }
}

/// An exact match with the list it was found in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundTask {
    pub task: TodoTask,
    pub list_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_name: Option<String>,
}

/// Search result: one exact match, some partial matches, or nothing.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "matchType", rename_all = "camelCase")]
pub enum FindOutcome {
    Exact(FoundTask),
    #[serde(rename_all = "camelCase")]
    Partial {
        count: usize,
        matches: Vec<TaskProjection>,
    },
    #[serde(rename = "none", rename_all = "camelCase")]
    NoMatch {
        search_keyword: String,
        lists_searched: usize,
        message: String,
    },
}

/// Finds To-Do tasks by title.
#[derive(Debug, Clone)]
pub struct TaskFinder {
    api: Arc<dyn TaskApi>,
    settings: TaskSettings,
}

impl TaskFinder {
    pub fn new(api: Arc<dyn TaskApi>, settings: TaskSettings) -> Self {
        Self { api, settings }
    }

    pub async fn find(&self, request: &FindRequest) -> ClientResult<FindOutcome> {
        if request.title.trim().is_empty() {
            return Err(ClientError::InvalidInput("title must not be empty".to_string()));
        }
        let keyword = extract_keyword(&request.title);
        debug!(title = %request.title, keyword = %keyword, "Searching To-Do lists");

        let lists = self.lists_to_search(request.list_id.as_deref()).await?;
        let query = TodoTaskQuery {
            title_contains: Some(keyword.clone()),
            exclude_completed: !request.include_completed,
            top: None,
        };

        let mut partial = Vec::new();
        let mut searched = 0;
        for (list_id, list_name) in lists {
            searched += 1;
            let tasks = match self.api.list_todo_tasks(&list_id, &query).await {
                Ok(tasks) => tasks,
                Err(e) => {
                    warn!(list_id = %list_id, error = %e, "Skipping list that could not be searched");
                    continue;
                }
            };

            let mut exact = None;
            for task in tasks {
                if exact.is_none() && task.title == request.title {
                    exact = Some(task);
                } else {
                    partial.push(TaskProjection::new(&task, &list_id));
                }
            }
            if let Some(task) = exact {
                debug!(list_id = %list_id, task_id = %task.id, "Exact title match");
                return Ok(FindOutcome::Exact(FoundTask {
                    task,
                    list_id,
                    list_name,
                }));
            }
        }

        if partial.is_empty() {
            return Ok(FindOutcome::NoMatch {
                message: format!(
                    "No tasks matching '{}' found in {} list(s)",
                    keyword, searched
                ),
                search_keyword: keyword,
                lists_searched: searched,
            });
        }
        Ok(FindOutcome::Partial {
            count: partial.len(),
            matches: partial,
        })
    }

    /// `(list id, display name)` pairs in search order.
    async fn lists_to_search(
        &self,
        explicit: Option<&str>,
    ) -> ClientResult<Vec<(String, Option<String>)>> {
        if let Some(id) = explicit.map(str::trim).filter(|id| !id.is_empty()) {
            return Ok(vec![(id.to_string(), None)]);
        }
        let lists = self.api.list_todo_lists().await?;
        Ok(prioritize_lists(lists, &self.settings.list_priority)
            .into_iter()
            .map(|list| (list.id, Some(list.display_name)))
            .collect())
    }
}
