//! reqwest-backed Microsoft Graph client.
//!
//! Every call is a single authenticated request. List endpoints follow
//! `@odata.nextLink` sequentially until the collection is exhausted or the
//! requested `$top` is reached. Nothing is retried here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::api::{TaskApi, TodoTaskQuery};
use crate::auth::TokenSource;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    ChecklistItemDraft, PlannerTask, PlannerTaskDetails, PlannerTaskPatch, TodoChecklistItem,
    TodoTask, TodoTaskDraft, TodoTaskList, TodoTaskPatch,
};

/// OData collection page.
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    #[serde(rename = "@odata.nextLink", default)]
    next_link: Option<String>,
}

/// Graph error envelope: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// What a request addresses, for NotFound reporting.
#[derive(Debug, Clone, Copy)]
struct Target<'a> {
    resource: &'static str,
    id: &'a str,
}

/// Authenticated Graph client for Planner and To-Do endpoints.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: TokenSource,
}

impl GraphClient {
    /// Build a client from resolved configuration.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::new(
            &config.base_url,
            config.token_source()?,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Build a client against an explicit base URL.
    pub fn new(base_url: &str, tokens: TokenSource, timeout: Duration) -> ClientResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            ClientError::config_error(format!("Invalid Graph base URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::config_error(format!(
                "Graph base URL '{}' cannot carry a path",
                base_url
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("graph-tasks/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    /// Same client, authenticating every request with `token`.
    fn with_token(&self, token: String) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            tokens: TokenSource::Static(token),
        }
    }

    /// Base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn request(&self, method: Method, url: Url) -> ClientResult<RequestBuilder> {
        let token = self.tokens.access_token().await?;
        debug!(%method, %url, "Graph request");
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    /// Send a request and map non-success statuses onto the error taxonomy.
    async fn execute(
        &self,
        request: RequestBuilder,
        target: Target<'_>,
    ) -> ClientResult<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::not_found(target.resource, target.id));
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) if !envelope.error.message.is_empty() => {
                format!("{}: {}", envelope.error.code, envelope.error.message)
            }
            _ if !body.trim().is_empty() => body,
            _ => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        Err(ClientError::api_error(status.as_u16(), message))
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, target: Target<'_>) -> ClientResult<T> {
        let request = self.request(Method::GET, url).await?;
        let response = self.execute(request, target).await?;
        Self::parse(response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &B,
        target: Target<'_>,
    ) -> ClientResult<T> {
        let request = self.request(method, url).await?.json(body);
        let response = self.execute(request, target).await?;
        Self::parse(response).await
    }

    /// GET pages of a collection until it is exhausted or `limit` items are collected.
    async fn get_collection<T: DeserializeOwned>(
        &self,
        url: Url,
        target: Target<'_>,
        limit: Option<usize>,
    ) -> ClientResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(url);
        while let Some(url) = next.take() {
            let page: Page<T> = self.get_json(url, target).await?;
            items.extend(page.value);
            if let Some(limit) = limit.filter(|&limit| items.len() >= limit) {
                items.truncate(limit);
                break;
            }
            if let Some(link) = page.next_link {
                let url = Url::parse(&link).map_err(|e| {
                    ClientError::api_error(502, format!("Invalid @odata.nextLink '{}': {}", link, e))
                })?;
                next = Some(url);
            }
        }
        Ok(items)
    }
}

#[async_trait]
impl TaskApi for GraphClient {
    async fn session(&self) -> ClientResult<Arc<dyn TaskApi>> {
        let token = self.tokens.access_token().await?;
        debug!("Resolved access token for session");
        Ok(Arc::new(self.with_token(token)))
    }

    async fn get_planner_task(&self, task_id: &str) -> ClientResult<PlannerTask> {
        let url = self.endpoint(&["planner", "tasks", task_id]);
        self.get_json(
            url,
            Target {
                resource: "Planner task",
                id: task_id,
            },
        )
        .await
    }

    async fn get_planner_task_details(&self, task_id: &str) -> ClientResult<PlannerTaskDetails> {
        let url = self.endpoint(&["planner", "tasks", task_id, "details"]);
        self.get_json(
            url,
            Target {
                resource: "Planner task details",
                id: task_id,
            },
        )
        .await
    }

    async fn list_my_planner_tasks(&self) -> ClientResult<Vec<PlannerTask>> {
        let url = self.endpoint(&["me", "planner", "tasks"]);
        self.get_collection(
            url,
            Target {
                resource: "Planner tasks",
                id: "me",
            },
            None,
        )
        .await
    }

    async fn update_planner_task(
        &self,
        task_id: &str,
        etag: &str,
        patch: &PlannerTaskPatch,
    ) -> ClientResult<()> {
        let url = self.endpoint(&["planner", "tasks", task_id]);
        let request = self
            .request(Method::PATCH, url)
            .await?
            .header(reqwest::header::IF_MATCH, etag)
            .json(patch);
        self.execute(
            request,
            Target {
                resource: "Planner task",
                id: task_id,
            },
        )
        .await?;
        Ok(())
    }

    async fn list_todo_lists(&self) -> ClientResult<Vec<TodoTaskList>> {
        let url = self.endpoint(&["me", "todo", "lists"]);
        self.get_collection(
            url,
            Target {
                resource: "To-Do lists",
                id: "me",
            },
            None,
        )
        .await
    }

    async fn list_todo_tasks(
        &self,
        list_id: &str,
        query: &TodoTaskQuery,
    ) -> ClientResult<Vec<TodoTask>> {
        let mut url = self.endpoint(&["me", "todo", "lists", list_id, "tasks"]);
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(filter) = query.odata_filter() {
                pairs.append_pair("$filter", &filter);
            }
            if let Some(top) = query.top {
                pairs.append_pair("$top", &top.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        self.get_collection(
            url,
            Target {
                resource: "To-Do list",
                id: list_id,
            },
            query.top.map(|top| top as usize),
        )
        .await
    }

    async fn get_todo_task(&self, list_id: &str, task_id: &str) -> ClientResult<TodoTask> {
        let url = self.endpoint(&["me", "todo", "lists", list_id, "tasks", task_id]);
        self.get_json(
            url,
            Target {
                resource: "To-Do task",
                id: task_id,
            },
        )
        .await
    }

    async fn create_todo_task(
        &self,
        list_id: &str,
        draft: &TodoTaskDraft,
    ) -> ClientResult<TodoTask> {
        let url = self.endpoint(&["me", "todo", "lists", list_id, "tasks"]);
        self.send_json(
            Method::POST,
            url,
            draft,
            Target {
                resource: "To-Do list",
                id: list_id,
            },
        )
        .await
    }

    async fn update_todo_task(
        &self,
        list_id: &str,
        task_id: &str,
        patch: &TodoTaskPatch,
    ) -> ClientResult<TodoTask> {
        let url = self.endpoint(&["me", "todo", "lists", list_id, "tasks", task_id]);
        self.send_json(
            Method::PATCH,
            url,
            patch,
            Target {
                resource: "To-Do task",
                id: task_id,
            },
        )
        .await
    }

    async fn create_checklist_item(
        &self,
        list_id: &str,
        task_id: &str,
        item: &ChecklistItemDraft,
    ) -> ClientResult<TodoChecklistItem> {
        let url = self.endpoint(&[
            "me",
            "todo",
            "lists",
            list_id,
            "tasks",
            task_id,
            "checklistItems",
        ]);
        self.send_json(
            Method::POST,
            url,
            item,
            Target {
                resource: "To-Do task",
                id: task_id,
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> GraphClient {
        GraphClient::new(
            base,
            TokenSource::Static("t".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let c = client("https://graph.microsoft.com/v1.0/");
        let url = c.endpoint(&["planner", "tasks", "abc"]);
        assert_eq!(url.as_str(), "https://graph.microsoft.com/v1.0/planner/tasks/abc");
    }

    #[test]
    fn test_endpoint_percent_encodes_ids() {
        let c = client("https://graph.microsoft.com/v1.0");
        let url = c.endpoint(&["me", "todo", "lists", "AAMk/x=="]);
        assert_eq!(
            url.as_str(),
            "https://graph.microsoft.com/v1.0/me/todo/lists/AAMk%2Fx=="
        );
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let err = GraphClient::new(
            "not a url",
            TokenSource::Static("t".to_string()),
            Duration::from_secs(5),
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::ConfigError(_)));
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let err = GraphClient::from_config(&ClientConfig::default()).unwrap_err();
        assert!(matches!(err, ClientError::ConfigError(_)));
    }
}
