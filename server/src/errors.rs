//! Mapping of failures to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use coinledger_common::LedgerError;

use crate::dto::ValidationError;
use crate::state::ServiceState;

/// Failure of an HTTP request.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request rejected before reaching the ledger.
    #[error("Validation failed")]
    Validation(ValidationError),

    /// Ledger refused or failed the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Service is not in a state that accepts mutations.
    #[error("Service is {0:?}")]
    Unavailable(ServiceState),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(body) => (StatusCode::BAD_REQUEST, Json(body)).into_response(),
            ApiError::Ledger(e) if e.is_domain_rejection() => {
                (StatusCode::BAD_REQUEST, e.to_string()).into_response()
            }
            ApiError::Ledger(e) => {
                error!(error = %e, code = e.error_code(), "Ledger operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
            ApiError::Unavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string()).into_response()
            }
        }
    }
}
