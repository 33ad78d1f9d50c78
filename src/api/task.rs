use crate::{
    api::employee::fetch_employee,
    api::project::fetch_project,
    error::{ApiError, ApiResult},
    model::task::{TASK_ROW_COLUMNS, Task, TaskPriority, TaskRow, TaskStatus},
    utils::db_utils::SqlUpdate,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    #[schema(example = "Draft landing page copy")]
    pub title: String,
    #[schema(example = "First pass, no images")]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    /// Assignee, optional
    #[schema(example = 1)]
    pub employee_id: Option<i64>,
    #[schema(example = 3)]
    pub project_id: i64,
}

/// Partial update of a task. For the nullable fields an absent key keeps
/// the stored value and an explicit `null` clears it.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatchTask {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
    /// Moving a card to another board column
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<i64>)]
    pub employee_id: Option<Option<i64>>,
}

/// Marks a key as present, so `null` becomes `Some(None)`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_title(title: &str) -> ApiResult<()> {
    if title.trim().is_empty() {
        return Err(ApiError::bad_request("Task title is required"));
    }
    Ok(())
}

/// Only existing employees can be assigned; a missing one is a client error
/// here, not a missing route resource.
async fn ensure_assignee(pool: &SqlitePool, employee_id: i64) -> ApiResult<()> {
    match fetch_employee(pool, employee_id).await {
        Ok(_) => Ok(()),
        Err(ApiError::NotFound(_)) => Err(ApiError::bad_request("Assignee not found")),
        Err(e) => Err(e),
    }
}

pub(crate) async fn fetch_task<'e>(executor: impl SqliteExecutor<'e>, task_id: i64) -> ApiResult<Task> {
    let sql = format!(
        r#"
        SELECT {TASK_ROW_COLUMNS}
        FROM tasks t
        LEFT JOIN employees e ON e.id = t.employee_id
        WHERE t.id = ?
        "#
    );

    sqlx::query_as::<_, TaskRow>(&sql)
        .bind(task_id)
        .fetch_optional(executor)
        .await
        .map_err(ApiError::database("Failed to fetch task"))?
        .map(Task::from)
        .ok_or_else(|| ApiError::not_found("Task not found"))
}

pub(crate) async fn fetch_project_tasks<'e>(
    executor: impl SqliteExecutor<'e>,
    project_id: i64,
) -> ApiResult<Vec<Task>> {
    let sql = format!(
        r#"
        SELECT {TASK_ROW_COLUMNS}
        FROM tasks t
        LEFT JOIN employees e ON e.id = t.employee_id
        WHERE t.project_id = ?
        ORDER BY t.created_at ASC, t.id ASC
        "#
    );

    let rows = sqlx::query_as::<_, TaskRow>(&sql)
        .bind(project_id)
        .fetch_all(executor)
        .await
        .map_err(ApiError::database("Failed to fetch tasks"))?;

    Ok(rows.into_iter().map(Task::from).collect())
}

/// Create Task
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTask,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Invalid payload or unknown assignee"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "error": "Failed to create task"
        }))
    ),
    tag = "Task"
)]
pub async fn create_task(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateTask>,
) -> ApiResult<impl Responder> {
    validate_title(&payload.title)?;
    fetch_project(pool.get_ref(), payload.project_id).await?;
    if let Some(employee_id) = payload.employee_id {
        ensure_assignee(pool.get_ref(), employee_id).await?;
    }

    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO tasks
        (title, description, priority, status, employee_id, project_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.title.trim())
    .bind(payload.description.as_deref())
    .bind(payload.priority)
    .bind(payload.status)
    .bind(payload.employee_id)
    .bind(payload.project_id)
    .bind(now)
    .bind(now)
    .execute(pool.get_ref())
    .await
    .map_err(ApiError::database("Failed to create task"))?;

    let task = fetch_task(pool.get_ref(), result.last_insert_rowid()).await?;
    info!(task_id = task.id, project_id = task.project_id, "Task created");

    Ok(HttpResponse::Created().json(task))
}

/// Update Task
#[utoipa::path(
    patch,
    path = "/api/tasks/{task_id}",
    params(
        ("task_id", Path, description = "Task ID")
    ),
    request_body = PatchTask,
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 400, description = "Empty patch, blank title or unknown assignee"),
        (status = 404, description = "Task not found", body = Object, example = json!({
            "error": "Task not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Task"
)]
pub async fn update_task(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    body: web::Json<PatchTask>,
) -> ApiResult<impl Responder> {
    let task_id = path.into_inner();
    let patch = body.into_inner();

    // An unknown task wins over an unknown assignee.
    fetch_task(pool.get_ref(), task_id).await?;

    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if let Some(Some(employee_id)) = patch.employee_id {
        ensure_assignee(pool.get_ref(), employee_id).await?;
    }

    let update = SqlUpdate::new("tasks")
        .set_if("title", patch.title.map(|t| t.trim().to_string()))
        .set_if("description", patch.description)
        .set_if("priority", patch.priority.map(|p| p.to_string()))
        .set_if("status", patch.status.map(|s| s.to_string()))
        .set_if("employee_id", patch.employee_id);

    if update.is_empty() {
        return Err(ApiError::bad_request("No fields provided for update"));
    }

    let affected = update
        .set("updated_at", Utc::now())
        .execute(pool.get_ref(), "id", task_id)
        .await
        .map_err(ApiError::database("Failed to update task"))?;

    if affected == 0 {
        return Err(ApiError::not_found("Task not found"));
    }

    let task = fetch_task(pool.get_ref(), task_id).await?;
    info!(task_id, status = %task.status, "Task updated");

    Ok(HttpResponse::Ok().json(task))
}

/// Delete Task
#[utoipa::path(
    delete,
    path = "/api/tasks/{task_id}",
    params(
        ("task_id", Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task not found", body = Object, example = json!({
            "error": "Task not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Task"
)]
pub async fn delete_task(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> ApiResult<impl Responder> {
    let task_id = path.into_inner();

    let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(task_id)
        .execute(pool.get_ref())
        .await
        .map_err(ApiError::database("Failed to delete task"))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Task not found"));
    }

    info!(task_id, "Task deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_null_assignee_are_distinct() {
        let absent: PatchTask = serde_json::from_str(r#"{"status": "COMPLETED"}"#).unwrap();
        assert_eq!(absent.employee_id, None);
        assert_eq!(absent.status, Some(TaskStatus::Completed));

        let cleared: PatchTask = serde_json::from_str(r#"{"employeeId": null}"#).unwrap();
        assert_eq!(cleared.employee_id, Some(None));

        let assigned: PatchTask = serde_json::from_str(r#"{"employeeId": 5}"#).unwrap();
        assert_eq!(assigned.employee_id, Some(Some(5)));
    }

    #[test]
    fn create_defaults_to_medium_todo() {
        let task: CreateTask =
            serde_json::from_str(r#"{"title": "Write tests", "projectId": 1}"#).unwrap();
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.employee_id, None);
    }

    #[test]
    fn blank_titles_are_rejected() {
        assert!(validate_title("   ").is_err());
        assert!(validate_title("Ship").is_ok());
    }
}
