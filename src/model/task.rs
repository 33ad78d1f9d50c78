use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use strum_macros::EnumIter;
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, Display,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Task status; each value is one column of the project board.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    sqlx::Type,
    Display,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

#[derive(Debug, sqlx::FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub employee_id: Option<i64>,
    pub project_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assignee_name: Option<String>,
}

/// Column list matching [`TaskRow`]; expects `tasks t LEFT JOIN employees e`.
pub const TASK_ROW_COLUMNS: &str = r#"
    t.id, t.title, t.description, t.priority, t.status, t.employee_id,
    t.project_id, t.created_at, t.updated_at,
    e.name AS assignee_name
"#;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Assignee {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Jane Doe")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": 7,
        "title": "Draft landing page copy",
        "description": null,
        "priority": "HIGH",
        "status": "IN_PROGRESS",
        "employeeId": 1,
        "assignedTo": { "id": 1, "name": "Jane Doe" },
        "projectId": 3,
        "createdAt": "2026-09-02T10:00:00Z",
        "updatedAt": "2026-09-04T16:30:00Z"
    })
)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub employee_id: Option<i64>,
    pub assigned_to: Option<Assignee>,
    pub project_id: i64,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        let assigned_to = match (row.employee_id, row.assignee_name) {
            (Some(id), Some(name)) => Some(Assignee { id, name }),
            _ => None,
        };

        Task {
            id: row.id,
            title: row.title,
            description: row.description,
            priority: row.priority,
            status: row.status,
            employee_id: row.employee_id,
            assigned_to,
            project_id: row.project_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
