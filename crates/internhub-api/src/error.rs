use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use internhub_db::StoreError;
use internhub_types::api::MessageBody;
use thiserror::Error;
use tracing::{error, warn};

/// Every way a request can fail. Each variant maps to one status code and
/// always renders as `{"message": ...}`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input, or a status outside the review set.
    #[error("{0}")]
    Validation(String),
    #[error("Invalid email or password.")]
    InvalidCredentials,
    /// Authenticated action refused, e.g. wrong current password.
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    /// A uniqueness rule rejected the write.
    #[error("{0}")]
    Conflict(String),
    /// Logged in full, reported to the client without detail.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Internal(detail) => {
                error!("Internal error: {}", detail);
                "Database error.".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(MessageBody::new(message))).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(format!("{} not found.", capitalize(what))),
            StoreError::Conflict(detail) => {
                warn!("Unique constraint rejected write: {}", detail);
                AppError::Conflict("Record already exists.".into())
            }
            StoreError::Invalid(detail) => {
                warn!("Store rejected data: {}", detail);
                AppError::Validation("Invalid data provided.".into())
            }
            other @ (StoreError::Sqlite(_) | StoreError::Poisoned(_)) => AppError::Internal(other.to_string()),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_land_in_the_right_bucket() {
        let cases = [
            (StoreError::NotFound("internship"), StatusCode::NOT_FOUND),
            (StoreError::Conflict("UNIQUE".into()), StatusCode::CONFLICT),
            (StoreError::Invalid("CHECK".into()), StatusCode::BAD_REQUEST),
            (StoreError::Poisoned("lock".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (store, expected) in cases {
            assert_eq!(AppError::from(store).status(), expected);
        }
    }

    #[test]
    fn not_found_message_names_the_record() {
        let err = AppError::from(StoreError::NotFound("application"));
        assert_eq!(err.to_string(), "Application not found.");
    }

    #[test]
    fn internal_detail_is_not_rendered() {
        let response = AppError::Internal("disk I/O error at page 7".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
