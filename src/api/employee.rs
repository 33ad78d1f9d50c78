use crate::{
    error::{ApiError, ApiResult},
    model::employee::Employee,
    utils::db_utils::{SqlFilter, SqlUpdate, SqlValue, bind_query_as, escape_like},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

/// Body of `POST /employees` and `PUT /employees/{id}`; PUT overwrites
/// every field.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayload {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "2024-01-15", format = "date", value_type = String)]
    pub joining_date: NaiveDate,
    #[schema(example = 52000.0)]
    pub base_salary: f64,
}

impl EmployeePayload {
    fn validate(&self) -> ApiResult<()> {
        if self.name.trim().is_empty() {
            return Err(ApiError::bad_request("Employee name is required"));
        }
        if !self.base_salary.is_finite() || self.base_salary < 0.0 {
            return Err(ApiError::bad_request(
                "Base salary must be a non-negative number",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    /// Case-insensitive substring of the name
    #[schema(example = "jane")]
    pub name: Option<String>,
    #[schema(example = 30000.0)]
    pub min_salary: Option<f64>,
    #[schema(example = 90000.0)]
    pub max_salary: Option<f64>,
    /// Earliest joining date, inclusive
    #[schema(example = "2024-01-01", format = "date", value_type = Option<String>)]
    #[param(value_type = Option<String>)]
    pub joined_from: Option<NaiveDate>,
    /// Latest joining date, inclusive
    #[schema(example = "2024-12-31", format = "date", value_type = Option<String>)]
    #[param(value_type = Option<String>)]
    pub joined_to: Option<NaiveDate>,
}

impl EmployeeQuery {
    fn to_filter(&self) -> ApiResult<SqlFilter> {
        if let (Some(min), Some(max)) = (self.min_salary, self.max_salary) {
            if min > max {
                return Err(ApiError::bad_request(
                    "minSalary must not exceed maxSalary",
                ));
            }
        }
        if let (Some(from), Some(to)) = (self.joined_from, self.joined_to) {
            if from > to {
                return Err(ApiError::bad_request(
                    "joinedFrom must not be after joinedTo",
                ));
            }
        }

        let mut filter = SqlFilter::new();
        filter.push("is_active = 1");

        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            let like = format!("%{}%", escape_like(&name_key(name)));
            filter.push_with(r"name_key LIKE ? ESCAPE '\'", [SqlValue::Text(like)]);
        }
        if let Some(min) = self.min_salary {
            filter.push_with("base_salary >= ?", [SqlValue::F64(min)]);
        }
        if let Some(max) = self.max_salary {
            filter.push_with("base_salary <= ?", [SqlValue::F64(max)]);
        }
        if let Some(from) = self.joined_from {
            filter.push_with("joining_date >= ?", [SqlValue::Date(from)]);
        }
        if let Some(to) = self.joined_to {
            filter.push_with("joining_date <= ?", [SqlValue::Date(to)]);
        }

        Ok(filter)
    }
}

/// Search form of a name, stored next to it in `name_key`.
fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

pub(crate) async fn fetch_employee<'e>(
    executor: impl SqliteExecutor<'e>,
    employee_id: i64,
) -> ApiResult<Employee> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(executor)
        .await
        .map_err(ApiError::database("Error fetching employee"))?
        .ok_or_else(|| ApiError::not_found("Employee not found"))
}

/// List active employees
#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Active employees, newest first", body = [Employee]),
        (status = 400, description = "Invalid filter combination"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    pool: web::Data<SqlitePool>,
    query: web::Query<EmployeeQuery>,
) -> ApiResult<impl Responder> {
    let filter = query.to_filter()?;

    let sql = format!(
        "SELECT * FROM employees {} ORDER BY created_at DESC, id DESC",
        filter.where_clause()
    );
    debug!(sql = %sql, bindings = ?filter.values(), "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&sql);
    for value in filter.into_values() {
        data_query = bind_query_as(data_query, value);
    }

    let employees = data_query
        .fetch_all(pool.get_ref())
        .await
        .map_err(ApiError::database("Error fetching employees"))?;

    Ok(HttpResponse::Ok().json(employees))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = EmployeePayload,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Invalid payload", body = Object, example = json!({
            "error": "Employee name is required"
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "error": "Error creating employee"
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<SqlitePool>,
    payload: web::Json<EmployeePayload>,
) -> ApiResult<impl Responder> {
    payload.validate()?;

    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO employees
        (name, name_key, joining_date, base_salary, is_active, created_at, updated_at)
        VALUES (?, ?, ?, ?, 1, ?, ?)
        "#,
    )
    .bind(payload.name.trim())
    .bind(name_key(&payload.name))
    .bind(payload.joining_date)
    .bind(payload.base_salary)
    .bind(now)
    .bind(now)
    .execute(pool.get_ref())
    .await
    .map_err(ApiError::database("Error creating employee"))?;

    let employee = fetch_employee(pool.get_ref(), result.last_insert_rowid()).await?;
    info!(employee_id = employee.id, "Employee created");

    Ok(HttpResponse::Created().json(employee))
}

/// Get Employee by ID, including removed employees
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> ApiResult<impl Responder> {
    let employee = fetch_employee(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = EmployeePayload,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    body: web::Json<EmployeePayload>,
) -> ApiResult<impl Responder> {
    let employee_id = path.into_inner();
    body.validate()?;

    let affected = SqlUpdate::new("employees")
        .set("name", body.name.trim())
        .set("name_key", name_key(&body.name))
        .set("joining_date", body.joining_date)
        .set("base_salary", body.base_salary)
        .set("updated_at", Utc::now())
        .execute(pool.get_ref(), "id", employee_id)
        .await
        .map_err(ApiError::database("Error updating employee"))?;

    if affected == 0 {
        return Err(ApiError::not_found("Employee not found"));
    }

    let employee = fetch_employee(pool.get_ref(), employee_id).await?;
    info!(employee_id, "Employee updated");

    Ok(HttpResponse::Ok().json(employee))
}

/// Remove Employee. The row is kept with `isActive = false`.
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee deactivated", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "Employee not found"
        })),
        (status = 500, description = "Internal server error", body = Object)
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> ApiResult<impl Responder> {
    let employee_id = path.into_inner();

    let affected = SqlUpdate::new("employees")
        .set("is_active", false)
        .set("updated_at", Utc::now())
        .execute(pool.get_ref(), "id", employee_id)
        .await
        .map_err(ApiError::database("Error deleting employee"))?;

    if affected == 0 {
        return Err(ApiError::not_found("Employee not found"));
    }

    let employee = fetch_employee(pool.get_ref(), employee_id).await?;
    info!(employee_id, "Employee deactivated");

    Ok(HttpResponse::Ok().json(employee))
}
