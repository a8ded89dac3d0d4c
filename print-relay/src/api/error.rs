//! REST error mapping
//!
//! | Error | Status |
//! |-------|--------|
//! | [`ApiError::Job`] | 500 |
//! | [`ApiError::NotFound`] | 404 |
//! | [`ApiError::BadRequest`] | 400 |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use super::handlers::PrintResponse;
use crate::error::JobError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{source}")]
    Job {
        job_id: String,
        #[source]
        source: JobError,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, job_id) = match &self {
            ApiError::Job { job_id, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, Some(job_id.clone()))
            }
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, None),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
        };

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = PrintResponse {
            success: false,
            message: self.to_string(),
            job_id,
        };
        (status, Json(body)).into_response()
    }
}
