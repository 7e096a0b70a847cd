use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use job_board_core::DecodeError;

use crate::service::ServiceError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// JSON error response of the form `{"error": "..."}`.
#[derive(Debug)]
pub struct ProblemResponse {
    status: StatusCode,
    body: ErrorBody,
}

impl ProblemResponse {
    pub fn new<S: Into<String>>(status: StatusCode, detail: S) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: detail.into(),
            },
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[cfg(test)]
    pub fn detail(&self) -> &str {
        &self.body.error
    }
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<DecodeError> for ProblemResponse {
    fn from(err: DecodeError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err.to_string())
    }
}

impl From<ServiceError> for ProblemResponse {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::Validation(_) | ServiceError::DuplicateApplication => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::CompanyNotFound | ServiceError::JobNotFound => StatusCode::NOT_FOUND,
            ServiceError::Unexpected(detail) => {
                error!(stage = "api", error = %detail, "unexpected failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}
