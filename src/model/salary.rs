use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::employee::Employee;

/// Net pay for one month.
pub fn payable_amount(base_salary: f64, bonus: f64, deductions: f64) -> f64 {
    base_salary + bonus - deductions
}

/// A salary row joined with its employee, as read from the database.
///
/// `base_salary` is the snapshot taken when the month was opened, while
/// `employee_base_salary` is the employee's live salary.
#[derive(Debug, sqlx::FromRow)]
pub struct SalaryRow {
    pub id: i64,
    pub employee_id: i64,
    pub base_salary: f64,
    pub bonus: f64,
    pub deductions: f64,
    pub payable_amount: f64,
    pub month: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub employee_name: String,
    pub employee_joining_date: NaiveDate,
    pub employee_base_salary: f64,
    pub employee_is_active: bool,
    pub employee_created_at: DateTime<Utc>,
    pub employee_updated_at: DateTime<Utc>,
}

/// Column list matching [`SalaryRow`]; expects `salaries s JOIN employees e`.
pub const SALARY_ROW_COLUMNS: &str = r#"
    s.id, s.employee_id, s.base_salary, s.bonus, s.deductions, s.payable_amount,
    s.month, s.created_at, s.updated_at,
    e.name AS employee_name,
    e.joining_date AS employee_joining_date,
    e.base_salary AS employee_base_salary,
    e.is_active AS employee_is_active,
    e.created_at AS employee_created_at,
    e.updated_at AS employee_updated_at
"#;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Salary {
    #[schema(example = 10)]
    pub id: i64,

    #[schema(example = 1)]
    pub employee_id: i64,

    #[schema(example = 52000.0)]
    pub base_salary: f64,

    #[schema(example = 1500.0)]
    pub bonus: f64,

    #[schema(example = 300.0)]
    pub deductions: f64,

    #[schema(example = 53200.0)]
    pub payable_amount: f64,

    /// First day of the payroll month.
    #[schema(example = "2026-10-01", value_type = String, format = "date")]
    pub month: NaiveDate,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,

    pub employee: Employee,
}

impl From<SalaryRow> for Salary {
    fn from(row: SalaryRow) -> Self {
        Salary {
            id: row.id,
            employee_id: row.employee_id,
            base_salary: row.base_salary,
            bonus: row.bonus,
            deductions: row.deductions,
            payable_amount: row.payable_amount,
            month: row.month,
            created_at: row.created_at,
            updated_at: row.updated_at,
            employee: Employee {
                id: row.employee_id,
                name: row.employee_name,
                joining_date: row.employee_joining_date,
                base_salary: row.employee_base_salary,
                is_active: row.employee_is_active,
                created_at: row.employee_created_at,
                updated_at: row.employee_updated_at,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payable_amount_adds_bonus_and_subtracts_deductions() {
        assert_eq!(payable_amount(50000.0, 2500.0, 1000.0), 51500.0);
        assert_eq!(payable_amount(50000.0, 0.0, 0.0), 50000.0);
    }

    #[test]
    fn payable_amount_may_go_negative() {
        assert_eq!(payable_amount(1000.0, 0.0, 1500.0), -500.0);
    }
}
