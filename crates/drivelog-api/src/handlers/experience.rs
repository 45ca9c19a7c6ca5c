use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{core_error, db_failure, error, validation_error, ApiError};
use crate::state::AppState;
use drivelog_core::{DateRange, DrivingExperience, NewExperience};
use drivelog_db::{Error as DbError, ExperienceRecord};

#[derive(Debug, Deserialize)]
pub struct ListFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// A list row: the raw id never leaves the server, only its token.
#[derive(Debug, Serialize)]
pub struct ExperienceResponse {
    pub token: String,
    pub drive_datetime: String,
    pub km: f64,
    pub notes: String,
    pub weather: String,
    pub traffic: String,
    pub supervisor: String,
    pub road_types: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub experiences: Vec<ExperienceResponse>,
    pub total_km: f64,
}

/// Edit-form shape: raw lookup ids so a client can preselect dropdowns.
#[derive(Debug, Serialize)]
pub struct ExperienceDetailResponse {
    pub token: String,
    pub drive_datetime: String,
    pub km: f64,
    pub notes: String,
    pub weather_id: i64,
    pub traffic_id: i64,
    pub supervisor_id: i64,
    pub road_type_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub token: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn record_to_response(record: ExperienceRecord, token: String) -> ExperienceResponse {
    ExperienceResponse {
        token,
        drive_datetime: record.drive_datetime.to_rfc3339(),
        km: record.km,
        notes: record.notes,
        weather: record.weather,
        traffic: record.traffic,
        supervisor: record.supervisor,
        road_types: record.road_types,
    }
}

fn detail_to_response(exp: DrivingExperience, token: String) -> ExperienceDetailResponse {
    ExperienceDetailResponse {
        token,
        drive_datetime: exp.drive_datetime.to_rfc3339(),
        km: exp.km,
        notes: exp.notes,
        weather_id: exp.weather_id,
        traffic_id: exp.traffic_id,
        supervisor_id: exp.supervisor_id,
        road_type_ids: exp.road_type_ids,
    }
}

/// List experiences, optionally filtered by an inclusive date range,
/// together with the total distance over the same range.
pub async fn list_experiences(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let range = DateRange::new(filter.start_date, filter.end_date);

    let records = state
        .db
        .list_experiences(&range)
        .await
        .map_err(|e| db_failure(e, "Failed to load driving experiences. Please try again."))?;

    let total_km = state
        .db
        .total_distance(&range)
        .await
        .map_err(|e| db_failure(e, "Failed to load driving experiences. Please try again."))?;

    let mut experiences = Vec::with_capacity(records.len());
    for record in records {
        let token = state.tokens.issue(&state.codec, record.id).await;
        experiences.push(record_to_response(record, token));
    }

    Ok(Json(SummaryResponse {
        experiences,
        total_km,
    }))
}

/// Create a new experience. Validation errors come back as a list before
/// anything is written.
pub async fn create_experience(
    State(state): State<AppState>,
    Json(payload): Json<NewExperience>,
) -> Result<Json<SavedResponse>, ApiError> {
    payload.check().map_err(core_error)?;

    match state.db.insert_experience(&payload).await {
        Ok(id) => {
            let token = state.tokens.issue(&state.codec, id).await;
            Ok(Json(SavedResponse {
                token,
                message: "Driving experience added successfully!".to_string(),
            }))
        }
        Err(DbError::MissingReference) => Err(validation_error(vec![
            "One of the selected options no longer exists.".to_string(),
        ])),
        Err(e) => Err(db_failure(
            e,
            "Failed to save driving experience. Please try again.",
        )),
    }
}

/// Get one experience by token, in edit-form shape.
pub async fn get_experience(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ExperienceDetailResponse>, ApiError> {
    let id = state
        .tokens
        .resolve(&state.codec, &token)
        .await
        .map_err(core_error)?;

    match state.db.get_experience(id).await {
        Ok(Some(exp)) => Ok(Json(detail_to_response(exp, token))),
        Ok(None) => Err(error(
            StatusCode::NOT_FOUND,
            "Driving experience not found.",
        )),
        Err(e) => Err(db_failure(
            e,
            "Failed to load driving experience. Please try again.",
        )),
    }
}

/// Replace an experience, including its full road-type set.
pub async fn update_experience(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<NewExperience>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = state
        .tokens
        .resolve(&state.codec, &token)
        .await
        .map_err(core_error)?;

    payload.check().map_err(core_error)?;

    match state.db.update_experience(id, &payload).await {
        Ok(()) => Ok(Json(MessageResponse {
            message: "Driving experience updated successfully!".to_string(),
        })),
        Err(DbError::ExperienceNotFound(_)) => Err(error(
            StatusCode::NOT_FOUND,
            "Driving experience not found.",
        )),
        Err(DbError::MissingReference) => Err(validation_error(vec![
            "One of the selected options no longer exists.".to_string(),
        ])),
        Err(e) => Err(db_failure(
            e,
            "Failed to update driving experience. Please try again.",
        )),
    }
}

/// Delete an experience by token.
pub async fn delete_experience(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = state
        .tokens
        .resolve(&state.codec, &token)
        .await
        .map_err(core_error)?;

    match state.db.delete_experience(id).await {
        Ok(()) => {
            state.tokens.forget(&token).await;
            Ok(Json(MessageResponse {
                message: "Driving experience deleted successfully!".to_string(),
            }))
        }
        Err(DbError::ExperienceNotFound(_)) => Err(error(
            StatusCode::NOT_FOUND,
            "Driving experience not found.",
        )),
        Err(e) => Err(db_failure(
            e,
            "Failed to delete driving experience. Please try again.",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_record_mapping_keeps_labels_and_hides_id() {
        let record = ExperienceRecord {
            id: 17,
            drive_datetime: Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap(),
            km: 8.4,
            notes: "rush hour".to_string(),
            weather: "Rain".to_string(),
            traffic: "Heavy".to_string(),
            supervisor: "Alex".to_string(),
            road_types: vec!["City".to_string(), "Highway".to_string()],
        };

        let response = record_to_response(record, "tok".to_string());
        assert_eq!(response.token, "tok");
        assert_eq!(response.drive_datetime, "2025-06-01T18:00:00+00:00");
        assert_eq!(response.road_types.len(), 2);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["weather"], "Rain");
    }

    #[test]
    fn test_detail_mapping_exposes_lookup_ids() {
        let exp = DrivingExperience {
            id: 3,
            drive_datetime: Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap(),
            km: 8.4,
            notes: String::new(),
            weather_id: 1,
            traffic_id: 2,
            supervisor_id: 3,
            road_type_ids: vec![4, 5],
        };

        let response = detail_to_response(exp, "tok".to_string());
        assert_eq!(response.weather_id, 1);
        assert_eq!(response.road_type_ids, vec![4, 5]);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("id").is_none());
    }
}
