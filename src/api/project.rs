use crate::{
    api::task::fetch_project_tasks,
    error::{ApiError, ApiResult},
    model::project::{Lifecycle, Project, ProjectStatus},
    model::task::{Task, TaskStatus},
    utils::db_utils::SqlUpdate,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteExecutor, SqlitePool};
use strum::IntoEnumIterator;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

/// Status as sent by clients. `deleted` is accepted for compatibility and
/// only moves the project's lifecycle; it is never stored as a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusInput {
    Active,
    Completed,
    Overdue,
    Deleted,
}

impl StatusInput {
    /// `None` for the status means "keep the stored one".
    pub fn split(self) -> (Option<ProjectStatus>, Lifecycle) {
        match self {
            StatusInput::Active => (Some(ProjectStatus::Active), Lifecycle::Live),
            StatusInput::Completed => (Some(ProjectStatus::Completed), Lifecycle::Live),
            StatusInput::Overdue => (Some(ProjectStatus::Overdue), Lifecycle::Live),
            StatusInput::Deleted => (None, Lifecycle::Deleted),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    #[schema(example = "Website relaunch")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "New marketing site")]
    pub description: String,
    #[schema(example = "2026-09-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-12-15", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    #[schema(example = "Website relaunch")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[schema(example = "2026-09-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-12-15", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub status: StatusInput,
}

fn validate_fields(name: &str, start_date: NaiveDate, end_date: NaiveDate) -> ApiResult<()> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request("Project name is required"));
    }
    if end_date < start_date {
        return Err(ApiError::bad_request(
            "Project end date must not be before its start date",
        ));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProjectListQuery {
    /// Also list projects that were deleted
    pub include_deleted: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    #[schema(example = 12)]
    pub task_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBoard {
    pub project_id: i64,
    pub columns: Vec<BoardColumn>,
}

impl ProjectBoard {
    /// Groups tasks into one column per status, in board order. Empty
    /// columns are kept.
    pub fn from_tasks(project_id: i64, tasks: Vec<Task>) -> Self {
        let mut columns: Vec<BoardColumn> = TaskStatus::iter()
            .map(|status| BoardColumn {
                status,
                tasks: Vec::new(),
            })
            .collect();

        for task in tasks {
            if let Some(column) = columns.iter_mut().find(|c| c.status == task.status) {
                column.tasks.push(task);
            }
        }

        ProjectBoard {
            project_id,
            columns,
        }
    }
}

pub(crate) async fn fetch_project<'e>(
    executor: impl SqliteExecutor<'e>,
    project_id: i64,
) -> ApiResult<Project> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ?")
        .bind(project_id)
        .fetch_optional(executor)
        .await
        .map_err(ApiError::database("Error fetching project"))?
        .ok_or_else(|| ApiError::not_found("Project not found"))
}

/// List projects
#[utoipa::path(
    get,
    path = "/api/projects",
    params(ProjectListQuery),
    responses(
        (status = 200, description = "Projects, newest first", body = [Project]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Project"
)]
pub async fn list_projects(
    pool: web::Data<SqlitePool>,
    query: web::Query<ProjectListQuery>,
) -> ApiResult<impl Responder> {
    let include_deleted = query.include_deleted.unwrap_or(false);

    let sql = if include_deleted {
        "SELECT * FROM projects ORDER BY created_at DESC, id DESC"
    } else {
        "SELECT * FROM projects WHERE lifecycle = 'live' ORDER BY created_at DESC, id DESC"
    };
    debug!(include_deleted, "Fetching projects");

    let projects = sqlx::query_as::<_, Project>(sql)
        .fetch_all(pool.get_ref())
        .await
        .map_err(ApiError::database("Error fetching projects"))?;

    Ok(HttpResponse::Ok().json(projects))
}

/// Create project
#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProject,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Invalid payload"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Project"
)]
pub async fn create_project(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateProject>,
) -> ApiResult<impl Responder> {
    validate_fields(&payload.name, payload.start_date, payload.end_date)?;

    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO projects
        (name, description, start_date, end_date, status, lifecycle, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.name.trim())
    .bind(payload.description.as_str())
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.status.unwrap_or_default())
    .bind(Lifecycle::Live)
    .bind(now)
    .bind(now)
    .execute(pool.get_ref())
    .await
    .map_err(ApiError::database("Error creating project"))?;

    let project = fetch_project(pool.get_ref(), result.last_insert_rowid()).await?;
    info!(project_id = project.id, "Project created");

    Ok(HttpResponse::Created().json(project))
}

/// Get project with its task count
#[utoipa::path(
    get,
    path = "/api/projects/{project_id}",
    params(
        ("project_id", Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project found", body = ProjectDetail),
        (status = 404, description = "Project not found", body = Object, example = json!({
            "error": "Project not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Project"
)]
pub async fn get_project(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> ApiResult<impl Responder> {
    let project_id = path.into_inner();
    let project = fetch_project(pool.get_ref(), project_id).await?;

    let task_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE project_id = ?")
        .bind(project_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(ApiError::database("Error fetching project"))?;

    Ok(HttpResponse::Ok().json(ProjectDetail {
        project,
        task_count,
    }))
}

/// Update project
#[utoipa::path(
    put,
    path = "/api/projects/{project_id}",
    params(
        ("project_id", Path, description = "Project ID")
    ),
    request_body = UpdateProject,
    responses(
        (status = 200, description = "Project updated", body = Project),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Project"
)]
pub async fn update_project(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    body: web::Json<UpdateProject>,
) -> ApiResult<impl Responder> {
    let project_id = path.into_inner();
    validate_fields(&body.name, body.start_date, body.end_date)?;

    let (status, lifecycle) = body.status.split();

    let affected = SqlUpdate::new("projects")
        .set("name", body.name.trim())
        .set("description", body.description.as_str())
        .set("start_date", body.start_date)
        .set("end_date", body.end_date)
        .set_if("status", status.map(|s| s.to_string()))
        .set("lifecycle", lifecycle.to_string())
        .set("updated_at", Utc::now())
        .execute(pool.get_ref(), "id", project_id)
        .await
        .map_err(ApiError::database("Error updating project"))?;

    if affected == 0 {
        return Err(ApiError::not_found("Project not found"));
    }

    let project = fetch_project(pool.get_ref(), project_id).await?;
    info!(project_id, status = %project.status, lifecycle = %project.lifecycle, "Project updated");

    Ok(HttpResponse::Ok().json(project))
}

/// Delete project. The row is kept with `lifecycle = deleted`.
#[utoipa::path(
    delete,
    path = "/api/projects/{project_id}",
    params(
        ("project_id", Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project deleted", body = Project),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Project"
)]
pub async fn delete_project(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> ApiResult<impl Responder> {
    let project_id = path.into_inner();

    let affected = SqlUpdate::new("projects")
        .set("lifecycle", Lifecycle::Deleted.to_string())
        .set("updated_at", Utc::now())
        .execute(pool.get_ref(), "id", project_id)
        .await
        .map_err(ApiError::database("Error deleting project"))?;

    if affected == 0 {
        return Err(ApiError::not_found("Project not found"));
    }

    let project = fetch_project(pool.get_ref(), project_id).await?;
    info!(project_id, "Project deleted");

    Ok(HttpResponse::Ok().json(project))
}

/// List the tasks of a project
#[utoipa::path(
    get,
    path = "/api/projects/{project_id}/tasks",
    params(
        ("project_id", Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Tasks with their assignee", body = [Task]),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "error": "Failed to fetch tasks"
        }))
    ),
    tag = "Project"
)]
pub async fn list_project_tasks(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> ApiResult<impl Responder> {
    let project_id = path.into_inner();
    fetch_project(pool.get_ref(), project_id).await?;

    let tasks = fetch_project_tasks(pool.get_ref(), project_id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Kanban board of a project, one column per task status
#[utoipa::path(
    get,
    path = "/api/projects/{project_id}/board",
    params(
        ("project_id", Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Board columns TODO, IN_PROGRESS, COMPLETED", body = ProjectBoard),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Project"
)]
pub async fn project_board(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> ApiResult<impl Responder> {
    let project_id = path.into_inner();
    fetch_project(pool.get_ref(), project_id).await?;

    let tasks = fetch_project_tasks(pool.get_ref(), project_id).await?;
    Ok(HttpResponse::Ok().json(ProjectBoard::from_tasks(project_id, tasks)))
}
