use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Workflow status of a project.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, Display,
    EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    Overdue,
}

/// Whether the project is still listed. Removal only flips this tag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, Display,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Lifecycle {
    #[default]
    Live,
    Deleted,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": 3,
        "name": "Website relaunch",
        "description": "New marketing site",
        "startDate": "2026-09-01",
        "endDate": "2026-12-15",
        "status": "active",
        "lifecycle": "live",
        "createdAt": "2026-09-01T08:00:00Z",
        "updatedAt": "2026-09-01T08:00:00Z"
    })
)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: String,

    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,

    pub status: ProjectStatus,
    pub lifecycle: Lifecycle,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}
