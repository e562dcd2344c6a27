use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use ticketing_core::Error;

/// Handler error: renders `{"error": ...}` for every failure.
#[derive(Debug)]
pub enum ApiError {
    Service(Error),
    /// Id segment that is not an integer. There is no such resource.
    MalformedPath(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(Error::Validation(_) | Error::Conflict(_)) => StatusCode::BAD_REQUEST,
            Self::Service(Error::NotFound { .. }) | Self::MalformedPath(_) => StatusCode::NOT_FOUND,
            Self::Service(Error::Config(_) | Error::Storage(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Service(e) if e.is_client_error() => e.to_string(),
            Self::Service(e) => {
                tracing::error!(error = %e, "request failed");
                "Internal server error.".to_string()
            }
            Self::MalformedPath(detail) => {
                tracing::debug!(%detail, "rejected path");
                "Resource not found.".to_string()
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self::Service(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Service(Error::validation(format!(
            "Invalid JSON body: {}",
            rejection.body_text()
        )))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::MalformedPath(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}
