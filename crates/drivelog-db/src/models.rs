use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One driving session as shown on the summary page: lookup references already
/// resolved to their labels. `road_types` is filled in a second pass since it
/// comes from the join table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExperienceRecord {
    pub id: i64,
    pub drive_datetime: DateTime<Utc>,
    pub km: f64,
    pub notes: String,
    pub weather: String,
    pub traffic: String,
    pub supervisor: String,
    #[sqlx(default)]
    pub road_types: Vec<String>,
}

/// A row of any of the four lookup tables (supervisor names are aliased to
/// `label` in the query).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LookupRow {
    pub id: i64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DistanceByLabel {
    pub label: String,
    pub total_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DrivesByLabel {
    pub label: String,
    pub drive_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MonthlyDistance {
    pub month: String,
    pub total_km: f64,
}

/// Headline numbers for the stats page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overview {
    pub total_km: f64,
    pub total_drives: i64,
    pub avg_km: f64,
}
