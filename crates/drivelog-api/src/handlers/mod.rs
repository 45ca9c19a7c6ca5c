use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

pub mod experience;
pub mod health;
pub mod lookup;
pub mod stats;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            errors: None,
        }),
    )
}

/// Validation failures: every violated rule at once, nothing written.
pub fn validation_error(errors: Vec<String>) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse {
            error: "Please correct the following errors:".to_string(),
            errors: Some(errors),
        }),
    )
}

/// Database failures are logged in full but surfaced generically.
pub fn db_failure(e: drivelog_db::Error, message: &str) -> ApiError {
    tracing::error!("Database operation failed: {}", e);
    error(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// Domain failures from drivelog-core, mapped to their HTTP shape.
pub fn core_error(e: drivelog_core::Error) -> ApiError {
    match e {
        drivelog_core::Error::InvalidToken => {
            error(StatusCode::NOT_FOUND, "Invalid driving experience ID.")
        }
        drivelog_core::Error::Validation(errors) => validation_error(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_token_maps_to_not_found() {
        let (status, body) = core_error(drivelog_core::Error::InvalidToken);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Invalid driving experience ID.");
        assert!(body.errors.is_none());
    }

    #[test]
    fn test_validation_maps_to_unprocessable_with_list() {
        let messages = vec!["Please select at least one road type.".to_string()];
        let (status, body) = core_error(drivelog_core::Error::Validation(messages.clone()));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.errors.as_deref(), Some(messages.as_slice()));
    }
}
