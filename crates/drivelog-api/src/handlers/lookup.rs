use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{db_failure, error, ApiError};
use crate::state::AppState;
use drivelog_core::LookupKind;
use drivelog_db::{Error as DbError, LookupRow};

/// Everything a client needs to render the add/edit form dropdowns.
#[derive(Debug, Serialize)]
pub struct LookupsResponse {
    pub weather: Vec<LookupRow>,
    pub traffic: Vec<LookupRow>,
    pub road_types: Vec<LookupRow>,
    pub supervisors: Vec<LookupRow>,
}

#[derive(Debug, Deserialize)]
pub struct AddLookupRequest {
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct AddedLookupResponse {
    pub id: i64,
    pub label: String,
    pub message: String,
}

pub async fn list_lookups(
    State(state): State<AppState>,
) -> Result<Json<LookupsResponse>, ApiError> {
    async fn load(state: &AppState, kind: LookupKind) -> Result<Vec<LookupRow>, ApiError> {
        state
            .db
            .list_lookup(kind)
            .await
            .map_err(|e| db_failure(e, "Failed to load form options. Please try again."))
    }

    Ok(Json(LookupsResponse {
        weather: load(&state, LookupKind::Weather).await?,
        traffic: load(&state, LookupKind::Traffic).await?,
        road_types: load(&state, LookupKind::RoadType).await?,
        supervisors: load(&state, LookupKind::Supervisor).await?,
    }))
}

/// Append one row to a lookup table. Lookups are append-only: there is no
/// update or delete counterpart.
pub async fn add_lookup(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(payload): Json<AddLookupRequest>,
) -> Result<(StatusCode, Json<AddedLookupResponse>), ApiError> {
    let kind: LookupKind = kind
        .parse()
        .map_err(|e: String| error(StatusCode::NOT_FOUND, e))?;

    let label = payload.label.trim();
    if label.is_empty() {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("{} label cannot be empty.", kind),
        ));
    }

    match state.db.add_lookup(kind, label).await {
        Ok(row) => {
            let message = format!("'{}' added successfully!", row.label);
            Ok((
                StatusCode::CREATED,
                Json(AddedLookupResponse {
                    id: row.id,
                    label: row.label,
                    message,
                }),
            ))
        }
        Err(DbError::DuplicateLabel(label)) => Err(error(
            StatusCode::CONFLICT,
            format!("'{}' already exists.", label),
        )),
        Err(e) => Err(db_failure(e, "Failed to add entry. Please try again.")),
    }
}
