//! Transport tests for `GraphClient` against a mock Graph endpoint.

use std::time::Duration;

use graph_tasks_client::models::{
    ChecklistItemDraft, Importance, PlannerTaskPatch, TaskStatus, TodoTaskDraft,
};
use graph_tasks_client::{ClientError, GraphClient, TaskApi, TodoTaskQuery, TokenSource};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GraphClient {
    GraphClient::new(
        &format!("{}/v1.0", server.uri()),
        TokenSource::Static("test-token".to_string()),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_get_planner_task_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/planner/tasks/task-1"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@odata.etag": "W/\"etag-1\"",
            "id": "task-1",
            "title": "Tapped Hole",
            "planId": "plan-1",
            "priority": 1,
            "percentComplete": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let task = client_for(&server).get_planner_task("task-1").await.unwrap();
    assert_eq!(task.title, "Tapped Hole");
    assert_eq!(task.etag.as_deref(), Some("W/\"etag-1\""));
}

#[tokio::test]
async fn test_404_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/planner/tasks/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": "NotFound", "message": "The requested item is not found." }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_planner_task("missing")
        .await
        .unwrap_err();
    match err {
        ClientError::NotFound { resource, id } => {
            assert_eq!(resource, "Planner task");
            assert_eq!(id, "missing");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_envelope_becomes_api_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me/todo/lists"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": "BadRequest", "message": "Invalid filter clause" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).list_todo_lists().await.unwrap_err();
    match err {
        ClientError::ApiError { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "BadRequest: Invalid filter clause");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_plain_error_body_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me/todo/lists"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_todo_lists().await.unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(err.to_string(), "API error: 503 - upstream unavailable");
}

#[tokio::test]
async fn test_malformed_json_is_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/planner/tasks/task-1/details"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{not json", "application/json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_planner_task_details("task-1")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::SerializationError(_)));
    assert_eq!(err.error_code(), "parse_error");
}

#[tokio::test]
async fn test_list_todo_tasks_sends_odata_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me/todo/lists/list-1/tasks"))
        .and(query_param(
            "$filter",
            "contains(title,'O''Brien') and status ne 'completed'",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                { "id": "t1", "title": "Call O'Brien", "status": "notStarted", "importance": "normal" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = TodoTaskQuery {
        title_contains: Some("O'Brien".to_string()),
        exclude_completed: true,
        top: None,
    };
    let tasks = client_for(&server)
        .list_todo_tasks("list-1", &query)
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Call O'Brien");
}

#[tokio::test]
async fn test_collections_follow_next_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me/todo/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [ { "id": "l1", "displayName": "Tasks", "wellknownListName": "defaultList" } ],
            "@odata.nextLink": format!("{}/v1.0/me/todo/lists/page-2", server.uri())
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me/todo/lists/page-2"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [ { "id": "l2", "displayName": "Planner Imports" } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let lists = client_for(&server).list_todo_lists().await.unwrap();
    let ids: Vec<&str> = lists.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["l1", "l2"]);
    assert!(lists[0].is_default());
}

#[tokio::test]
async fn test_list_todo_tasks_top_stops_paging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me/todo/lists/list-1/tasks"))
        .and(query_param("$top", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                { "id": "t1", "title": "Deburr", "status": "notStarted" },
                { "id": "t2", "title": "Anodize", "status": "notStarted" },
                { "id": "t3", "title": "Inspect", "status": "notStarted" }
            ],
            "@odata.nextLink": format!("{}/v1.0/me/todo/lists/list-1/tasks/page-2", server.uri())
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me/todo/lists/list-1/tasks/page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [ { "id": "t4", "title": "Ship", "status": "notStarted" } ]
        })))
        .expect(0)
        .mount(&server)
        .await;

    let query = TodoTaskQuery {
        top: Some(2),
        ..Default::default()
    };
    let tasks = client_for(&server)
        .list_todo_tasks("list-1", &query)
        .await
        .unwrap();
    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2"]);
}

#[tokio::test]
async fn test_list_todo_tasks_without_top_reads_all_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me/todo/lists/list-1/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [ { "id": "t1", "title": "Deburr", "status": "notStarted" } ],
            "@odata.nextLink": format!("{}/v1.0/me/todo/lists/list-1/tasks/page-2", server.uri())
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me/todo/lists/list-1/tasks/page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [ { "id": "t2", "title": "Ship", "status": "notStarted" } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = client_for(&server)
        .list_todo_tasks("list-1", &TodoTaskQuery::default())
        .await
        .unwrap();
    assert_eq!(tasks.len(), 2);
}

#[tokio::test]
async fn test_update_planner_task_sends_if_match() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/v1.0/planner/tasks/task-1"))
        .and(header("if-match", "W/\"etag-1\""))
        .and(body_json(json!({ "percentComplete": 100 })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let patch = PlannerTaskPatch {
        percent_complete: Some(100),
        ..Default::default()
    };
    client_for(&server)
        .update_planner_task("task-1", "W/\"etag-1\"", &patch)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_todo_task_posts_draft() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.0/me/todo/lists/list-1/tasks"))
        .and(body_json(json!({
            "title": "[Planner] Tapped Hole",
            "importance": "high",
            "status": "completed"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "todo-1",
            "title": "[Planner] Tapped Hole",
            "importance": "high",
            "status": "completed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let draft = TodoTaskDraft {
        title: "[Planner] Tapped Hole".to_string(),
        importance: Importance::High,
        status: TaskStatus::Completed,
        ..Default::default()
    };
    let created = client_for(&server)
        .create_todo_task("list-1", &draft)
        .await
        .unwrap();
    assert_eq!(created.id, "todo-1");
    assert_eq!(created.status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_create_checklist_item() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.0/me/todo/lists/list-1/tasks/todo-1/checklistItems"))
        .and(body_json(json!({ "displayName": "Deburr", "isChecked": true })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "step-1",
            "displayName": "Deburr",
            "isChecked": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let item = ChecklistItemDraft {
        display_name: "Deburr".to_string(),
        is_checked: true,
    };
    let created = client_for(&server)
        .create_checklist_item("list-1", "todo-1", &item)
        .await
        .unwrap();
    assert_eq!(created.id, "step-1");
}

#[cfg(unix)]
#[tokio::test]
async fn test_session_runs_token_command_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me/todo/lists"))
        .and(header("authorization", "Bearer command-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .expect(3)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let runs = dir.path().join("token-runs");
    let tokens = TokenSource::Command {
        program: "sh".to_string(),
        args: vec![
            "-c".to_string(),
            "echo run >> \"$0\"; echo command-token".to_string(),
            runs.display().to_string(),
        ],
    };
    let client = GraphClient::new(
        &format!("{}/v1.0", server.uri()),
        tokens,
        Duration::from_secs(5),
    )
    .unwrap();
    let run_count = || std::fs::read_to_string(&runs).unwrap().lines().count();

    let session = client.session().await.unwrap();
    session.list_todo_lists().await.unwrap();
    session.list_todo_lists().await.unwrap();
    assert_eq!(run_count(), 1);

    client.session().await.unwrap().list_todo_lists().await.unwrap();
    assert_eq!(run_count(), 2);
}
