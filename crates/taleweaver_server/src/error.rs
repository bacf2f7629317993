//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use taleweaver_error::{
    CompletionErrorKind, StorageErrorKind, StoryErrorKind, TaleweaverError, TaleweaverErrorKind,
};

/// A [`TaleweaverError`] rendered as `{"error": "..."}` with a mapped status.
#[derive(Debug, derive_more::Display, derive_more::From)]
pub struct ApiError(TaleweaverError);

impl ApiError {
    /// The wrapped error.
    pub fn inner(&self) -> &TaleweaverError {
        &self.0
    }

    /// Status code for the error kind.
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            TaleweaverErrorKind::Auth(_) => StatusCode::UNAUTHORIZED,
            TaleweaverErrorKind::Validation(_) | TaleweaverErrorKind::Json(_) => {
                StatusCode::BAD_REQUEST
            }
            TaleweaverErrorKind::Story(e) => match e.kind {
                StoryErrorKind::TurnOutOfRange { .. } => StatusCode::NOT_FOUND,
                StoryErrorKind::NotAiTurn(_) | StoryErrorKind::NotPlayerTurn(_) => {
                    StatusCode::BAD_REQUEST
                }
                StoryErrorKind::ActorUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            TaleweaverErrorKind::Storage(e) => match e.kind {
                StorageErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            TaleweaverErrorKind::Completion(e) => match e.kind {
                CompletionErrorKind::MissingApiKey(_) => StatusCode::INTERNAL_SERVER_ERROR,
                CompletionErrorKind::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            },
            TaleweaverErrorKind::Config(_) | TaleweaverErrorKind::Builder(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message without source locations.
    pub fn message(&self) -> String {
        match self.0.kind() {
            TaleweaverErrorKind::Auth(e) => e.kind.to_string(),
            TaleweaverErrorKind::Validation(e) => e.message.clone(),
            TaleweaverErrorKind::Json(e) => e.kind.to_string(),
            TaleweaverErrorKind::Story(e) => e.kind.to_string(),
            TaleweaverErrorKind::Storage(e) => e.kind.to_string(),
            TaleweaverErrorKind::Completion(e) => e.kind.to_string(),
            TaleweaverErrorKind::Config(e) => e.message.clone(),
            TaleweaverErrorKind::Builder(e) => e.kind().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.0, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self.0, "Request rejected");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taleweaver_error::{
        AuthError, AuthErrorKind, CompletionError, JsonError, JsonErrorKind, StorageError,
        StoryError, ValidationError,
    };

    fn status_of(err: impl Into<TaleweaverError>) -> StatusCode {
        ApiError::from(err.into()).status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(AuthError::new(AuthErrorKind::MissingCredential)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(ValidationError::new("Title is required")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(JsonError::new(JsonErrorKind::MissingContentType)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(StorageError::new(StorageErrorKind::NotFound("story x".into()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(StoryError::new(StoryErrorKind::TurnOutOfRange { index: 4, len: 2 })),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CompletionError::new(CompletionErrorKind::MissingApiKey(
                "OPENAI_API_KEY".into()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(CompletionError::new(CompletionErrorKind::Http {
                status_code: 429,
                message: "slow down".into()
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(CompletionError::new(CompletionErrorKind::Timeout(60_000))),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_message_omits_source_location() {
        let err = ApiError::from(TaleweaverError::from(ValidationError::new(
            "Player action is required",
        )));
        assert_eq!(err.message(), "Player action is required");
    }
}
