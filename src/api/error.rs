use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::DomainError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Domain failure rendered as `{"error": ...}` with a matching status.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            DomainError::ExternalService(_)
            | DomainError::Unavailable(_)
            | DomainError::EmptyEmbedding
            | DomainError::NotFound(_) => StatusCode::BAD_GATEWAY,
            DomainError::Internal(_)
            | DomainError::Parse(_)
            | DomainError::Pdf(_)
            | DomainError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.0, "request failed");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError(DomainError::validation("empty")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(DomainError::timeout("ollama")).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError(DomainError::unavailable("qdrant")).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError(DomainError::internal("poisoned")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
