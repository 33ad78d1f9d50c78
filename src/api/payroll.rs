use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{ApiError, ApiResult},
    model::salary::{SALARY_ROW_COLUMNS, Salary, SalaryRow, payable_amount},
    utils::period::{PayrollPeriod, PayrollPlan},
};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PayrollQuery {
    /// Zero-based month, 0 = January
    #[schema(example = 9, minimum = 0, maximum = 11)]
    pub month: Option<u32>,

    /// Defaults to the current year
    #[schema(example = 2026)]
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSalary {
    #[schema(example = 10)]
    pub salary_id: i64,

    #[schema(example = 1500.0)]
    pub bonus: f64,

    #[schema(example = 300.0)]
    pub deductions: f64,
}

impl UpdateSalary {
    fn validate(&self) -> ApiResult<()> {
        for (field, value) in [("bonus", self.bonus), ("deductions", self.deductions)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ApiError::bad_request(format!(
                    "{field} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayrollResponse {
    pub salaries: Vec<Salary>,

    /// `false` for months that have already closed
    #[schema(example = true)]
    pub is_editable: bool,
}

async fn fetch_salaries<'e>(
    executor: impl SqliteExecutor<'e>,
    period: PayrollPeriod,
) -> ApiResult<Vec<Salary>> {
    let sql = format!(
        r#"
        SELECT {SALARY_ROW_COLUMNS}
        FROM salaries s
        JOIN employees e ON e.id = s.employee_id
        WHERE s.month >= ? AND s.month < ?
        ORDER BY e.name ASC, s.id ASC
        "#
    );

    let rows = sqlx::query_as::<_, SalaryRow>(&sql)
        .bind(period.first_day())
        .bind(period.end_exclusive())
        .fetch_all(executor)
        .await
        .map_err(ApiError::database("Failed to fetch payroll data"))?;

    Ok(rows.into_iter().map(Salary::from).collect())
}

async fn fetch_salary<'e>(executor: impl SqliteExecutor<'e>, salary_id: i64) -> ApiResult<Salary> {
    let sql = format!(
        r#"
        SELECT {SALARY_ROW_COLUMNS}
        FROM salaries s
        JOIN employees e ON e.id = s.employee_id
        WHERE s.id = ?
        "#
    );

    sqlx::query_as::<_, SalaryRow>(&sql)
        .bind(salary_id)
        .fetch_optional(executor)
        .await
        .map_err(ApiError::database("Failed to fetch salary"))?
        .map(Salary::from)
        .ok_or_else(|| ApiError::not_found("Salary record not found"))
}

/// Opens a month: one row per active employee, snapshotting the current
/// base salary. Rows that already exist for an employee are left alone.
///
/// The insert must stay the first statement of the transaction: a read
/// first would make concurrent openers fail the lock upgrade with BUSY.
async fn generate_salaries(pool: &SqlitePool, period: PayrollPeriod) -> ApiResult<Vec<Salary>> {
    let mut tx = pool
        .begin()
        .await
        .map_err(ApiError::database("Failed to generate payroll"))?;

    let now = Utc::now();
    let created = sqlx::query(
        r#"
        INSERT OR IGNORE INTO salaries
        (employee_id, base_salary, bonus, deductions, payable_amount, month, created_at, updated_at)
        SELECT id, base_salary, 0, 0, base_salary, ?, ?, ?
        FROM employees
        WHERE is_active = 1
        "#,
    )
    .bind(period.first_day())
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(ApiError::database("Failed to generate payroll"))?
    .rows_affected();

    let salaries = fetch_salaries(&mut *tx, period).await?;

    tx.commit()
        .await
        .map_err(ApiError::database("Failed to generate payroll"))?;

    info!(
        month = %period.first_day(),
        rows = salaries.len(),
        created,
        "Payroll month opened"
    );

    Ok(salaries)
}

/// Get or open the payroll of a month
#[utoipa::path(
    get,
    path = "/api/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, description = "Salary rows of the month", body = PayrollResponse),
        (status = 400, description = "Month missing or out of range, or year out of range", body = Object, example = json!({
            "error": "Month is required"
        })),
        (status = 404, description = "Past month without payroll data", body = Object, example = json!({
            "error": "No payroll data exists for this month"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Payroll"
)]
pub async fn get_payroll(
    pool: web::Data<SqlitePool>,
    query: web::Query<PayrollQuery>,
) -> ApiResult<impl Responder> {
    let month = query
        .month
        .ok_or_else(|| ApiError::bad_request("Month is required"))?;

    if month > 11 {
        return Err(ApiError::bad_request("Month must be between 0 and 11"));
    }

    let today = Local::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let period = PayrollPeriod::from_month_index(year, month)
        .ok_or_else(|| ApiError::bad_request(format!("Year {year} is out of range")))?;

    let existing = fetch_salaries(pool.get_ref(), period).await?;
    let plan = PayrollPlan::decide(period, today, existing.len());
    debug!(month = %period.first_day(), existing = existing.len(), ?plan, "Payroll request");

    let response = match plan {
        PayrollPlan::Missing => {
            return Err(ApiError::not_found("No payroll data exists for this month"));
        }
        PayrollPlan::Existing { editable } => PayrollResponse {
            salaries: existing,
            is_editable: editable,
        },
        PayrollPlan::Generate => PayrollResponse {
            salaries: generate_salaries(pool.get_ref(), period).await?,
            is_editable: true,
        },
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Update bonus and deductions of one salary row
#[utoipa::path(
    put,
    path = "/api/payroll",
    request_body = UpdateSalary,
    responses(
        (status = 200, description = "Salary updated", body = Salary),
        (status = 400, description = "Invalid amounts"),
        (status = 404, description = "Salary record not found", body = Object, example = json!({
            "error": "Salary record not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Payroll"
)]
pub async fn update_salary(
    pool: web::Data<SqlitePool>,
    body: web::Json<UpdateSalary>,
) -> ApiResult<impl Responder> {
    body.validate()?;
    let salary_id = body.salary_id;

    let base_salary: f64 = sqlx::query_scalar("SELECT base_salary FROM salaries WHERE id = ?")
        .bind(salary_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ApiError::database("Failed to update salary"))?
        .ok_or_else(|| ApiError::not_found("Salary record not found"))?;

    let payable = payable_amount(base_salary, body.bonus, body.deductions);

    sqlx::query(
        r#"
        UPDATE salaries
        SET bonus = ?, deductions = ?, payable_amount = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(body.bonus)
    .bind(body.deductions)
    .bind(payable)
    .bind(Utc::now())
    .bind(salary_id)
    .execute(pool.get_ref())
    .await
    .map_err(ApiError::database("Failed to update salary"))?;

    let salary = fetch_salary(pool.get_ref(), salary_id).await?;
    info!(salary_id, payable_amount = payable, "Salary updated");

    Ok(HttpResponse::Ok().json(salary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_or_non_finite_amounts_are_rejected() {
        let update = |bonus, deductions| UpdateSalary {
            salary_id: 1,
            bonus,
            deductions,
        };

        assert!(update(100.0, 50.0).validate().is_ok());
        assert!(update(-1.0, 0.0).validate().is_err());
        assert!(update(0.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn update_body_uses_camel_case() {
        let body: UpdateSalary =
            serde_json::from_str(r#"{"salaryId": 4, "bonus": 10, "deductions": 2.5}"#).unwrap();
        assert_eq!(body.salary_id, 4);
        assert_eq!(body.deductions, 2.5);
    }
}
