use axum::{extract::State, Json};
use serde::Serialize;

use super::{db_failure, ApiError};
use crate::state::AppState;
use drivelog_db::{DistanceByLabel, DrivesByLabel, MonthlyDistance};

const LOAD_FAILED: &str = "Failed to load statistics. Please try again.";

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_km: f64,
    pub total_drives: i64,
    pub avg_km: f64,
    pub by_weather: Vec<DistanceByLabel>,
    pub by_road_type: Vec<DrivesByLabel>,
    pub by_month: Vec<MonthlyDistance>,
}

pub async fn get_statistics(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, ApiError> {
    let overview = state
        .db
        .overview()
        .await
        .map_err(|e| db_failure(e, LOAD_FAILED))?;

    let by_weather = state
        .db
        .distance_by_weather()
        .await
        .map_err(|e| db_failure(e, LOAD_FAILED))?;

    let by_road_type = state
        .db
        .drives_by_road_type()
        .await
        .map_err(|e| db_failure(e, LOAD_FAILED))?;

    let by_month = state
        .db
        .distance_by_month()
        .await
        .map_err(|e| db_failure(e, LOAD_FAILED))?;

    Ok(Json(StatsResponse {
        total_km: overview.total_km,
        total_drives: overview.total_drives,
        avg_km: overview.avg_km,
        by_weather,
        by_road_type,
        by_month,
    }))
}
