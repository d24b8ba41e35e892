//! Microsoft Graph Planner and To-Do resource types.
//!
//! Field names follow Graph's camelCase wire format. Every resource keeps an
//! `extra` bag for properties this crate does not model, so responses survive
//! a round-trip without losing data the live API adds over time.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Unmodelled properties of a Graph resource.
pub type ExtraFields = Map<String, Value>;

// ── Planner ──

/// A Planner task (`/planner/tasks/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerTask {
    /// Concurrency token required by PATCH requests.
    #[serde(rename = "@odata.etag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub plan_id: String,
    #[serde(default)]
    pub bucket_id: Option<String>,
    /// 0-10 priority scale; Planner's UI uses 1 (urgent), 3 (important), 5 (medium), 9 (low).
    #[serde(default = "default_planner_priority")]
    pub priority: i32,
    #[serde(default)]
    pub percent_complete: i32,
    #[serde(default)]
    pub due_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assignments: Map<String, Value>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

fn default_planner_priority() -> i32 {
    5
}

/// Details of a Planner task (`/planner/tasks/{id}/details`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerTaskDetails {
    #[serde(rename = "@odata.etag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable_checklist")]
    pub checklist: Checklist,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A single checklist entry on a Planner task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerChecklistItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub is_checked: bool,
    /// Opaque, lexicographically sortable position string.
    #[serde(default)]
    pub order_hint: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A checklist item paired with its Planner-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistEntry {
    pub id: String,
    pub item: PlannerChecklistItem,
}

/// Planner checklist in the order the API returned it.
///
/// Graph encodes the checklist as a JSON object keyed by item id. The entries
/// are kept as a sequence so that iteration order is the wire order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Checklist(pub Vec<ChecklistEntry>);

impl Checklist {
    pub fn entries(&self) -> &[ChecklistEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Checklist {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChecklistVisitor;

        impl<'de> Visitor<'de> for ChecklistVisitor {
            type Value = Checklist;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of checklist item id to checklist item")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((id, item)) = map.next_entry::<String, PlannerChecklistItem>()? {
                    entries.push(ChecklistEntry { id, item });
                }
                Ok(Checklist(entries))
            }
        }

        deserializer.deserialize_map(ChecklistVisitor)
    }
}

impl Serialize for Checklist {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.id, &entry.item)?;
        }
        map.end()
    }
}

fn nullable_checklist<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Checklist, D::Error> {
    Ok(Option::<Checklist>::deserialize(deserializer)?.unwrap_or_default())
}

/// PATCH body for a Planner task. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerTaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

// ── To-Do ──

/// To-Do task importance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Importance {
    Low,
    #[default]
    Normal,
    High,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// To-Do task status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    WaitingOnOthers,
    Deferred,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "notStarted",
            Self::InProgress => "inProgress",
            Self::Completed => "completed",
            Self::WaitingOnOthers => "waitingOnOthers",
            Self::Deferred => "deferred",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content type of an item body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyType {
    #[default]
    Text,
    Html,
}

/// Rich text body of a To-Do task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub content_type: BodyType,
}

/// Graph's structured date-time: a local timestamp plus a time zone name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeTimeZone {
    pub date_time: String,
    pub time_zone: String,
}

/// A To-Do task (`/me/todo/lists/{listId}/tasks/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoTask {
    #[serde(rename = "@odata.etag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<ItemBody>,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date_time: Option<DateTimeTimeZone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date_time: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Marker Graph uses to flag built-in To-Do lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WellknownListName {
    #[default]
    None,
    DefaultList,
    FlaggedEmails,
    UnknownFutureValue,
}

/// A To-Do task list (`/me/todo/lists/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoTaskList {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub wellknown_list_name: WellknownListName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_owner: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_shared: Option<bool>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl TodoTaskList {
    /// Whether Graph flags this list as the user's default ("Tasks") list.
    pub fn is_default(&self) -> bool {
        self.wellknown_list_name == WellknownListName::DefaultList
    }
}

/// Insert body for a To-Do task.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoTaskDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<ItemBody>,
    pub importance: Importance,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date_time: Option<DateTimeTimeZone>,
}

/// PATCH body for a To-Do task. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoTaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importance: Option<Importance>,
}

/// Insert body for a To-Do checklist item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemDraft {
    pub display_name: String,
    pub is_checked: bool,
}

/// A checklist item (step) on a To-Do task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoChecklistItem {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub is_checked: bool,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planner_task_from_graph_json() {
        let task: PlannerTask = serde_json::from_value(serde_json::json!({
            "@odata.etag": "W/\"JzEtVGFzayAgQEBA\"",
            "id": "task-1",
            "title": "Tapped Hole",
            "planId": "plan-1",
            "bucketId": null,
            "priority": 1,
            "percentComplete": 50,
            "dueDateTime": "2024-03-01T17:00:00Z",
            "createdDateTime": "2024-01-15T10:30:00.1234567Z",
            "assignments": {},
            "hasDescription": true
        }))
        .unwrap();

        assert_eq!(task.etag.as_deref(), Some("W/\"JzEtVGFzayAgQEBA\""));
        assert_eq!(task.priority, 1);
        assert_eq!(task.percent_complete, 50);
        assert!(task.bucket_id.is_none());
        assert!(task.due_date_time.is_some());
        assert_eq!(task.extra.get("hasDescription"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_planner_task_priority_defaults_to_medium() {
        let task: PlannerTask =
            serde_json::from_value(serde_json::json!({ "id": "t", "title": "x" })).unwrap();
        assert_eq!(task.priority, 5);
        assert_eq!(task.percent_complete, 0);
    }

    #[test]
    fn test_checklist_preserves_wire_order() {
        let details: PlannerTaskDetails = serde_json::from_str(
            r#"{
                "id": "task-1",
                "description": "notes",
                "checklist": {
                    "zz": { "title": "first", "isChecked": false, "orderHint": "8585" },
                    "aa": { "title": "second", "isChecked": true, "orderHint": "8584" }
                }
            }"#,
        )
        .unwrap();

        let ids: Vec<&str> = details
            .checklist
            .entries()
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["zz", "aa"]);
        assert!(details.checklist.entries()[1].item.is_checked);
    }

    #[test]
    fn test_null_checklist_is_empty() {
        let details: PlannerTaskDetails =
            serde_json::from_str(r#"{ "id": "t", "checklist": null }"#).unwrap();
        assert!(details.checklist.is_empty());

        let details: PlannerTaskDetails = serde_json::from_str(r#"{ "id": "t" }"#).unwrap();
        assert!(details.checklist.is_empty());
    }

    #[test]
    fn test_todo_task_keeps_unknown_fields() {
        let task: TodoTask = serde_json::from_value(serde_json::json!({
            "id": "todo-1",
            "title": "Write report",
            "importance": "high",
            "status": "inProgress",
            "isReminderOn": false,
            "dueDateTime": { "dateTime": "2024-03-01T00:00:00.0000000", "timeZone": "UTC" }
        }))
        .unwrap();

        assert_eq!(task.importance, Importance::High);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.due_date_time.as_ref().unwrap().time_zone, "UTC");

        let back = serde_json::to_value(&task).unwrap();
        assert_eq!(back["isReminderOn"], false);
        assert_eq!(back["status"], "inProgress");
    }

    #[test]
    fn test_draft_skips_absent_fields() {
        let draft = TodoTaskDraft {
            title: "t".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "title": "t", "importance": "normal", "status": "notStarted" })
        );
    }

    #[test]
    fn test_default_list_detection() {
        let list: TodoTaskList = serde_json::from_value(serde_json::json!({
            "id": "l1",
            "displayName": "Tasks",
            "wellknownListName": "defaultList"
        }))
        .unwrap();
        assert!(list.is_default());
    }
}
