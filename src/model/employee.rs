use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": 1,
        "name": "Jane Doe",
        "joiningDate": "2024-01-15",
        "baseSalary": 52000.0,
        "isActive": true,
        "createdAt": "2024-01-15T09:00:00Z",
        "updatedAt": "2024-01-15T09:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "Jane Doe")]
    pub name: String,

    #[schema(example = "2024-01-15", value_type = String, format = "date")]
    pub joining_date: NaiveDate,

    #[schema(example = 52000.0)]
    pub base_salary: f64,

    /// `false` once the employee has been removed; the row is kept.
    #[schema(example = true)]
    pub is_active: bool,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}
