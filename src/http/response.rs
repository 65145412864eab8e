//! Error responses.
//!
//! Every failure is rendered as `{"detail": ..., "error_code": ...}` with a
//! status derived from the error variant.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::BankError;
use crate::http::types::ErrorBody;

/// HTTP-facing error.
#[derive(Debug)]
pub enum ApiError {
    Bank(BankError),
    /// Malformed JSON body or query string.
    BadRequest(String),
}

impl From<BankError> for ApiError {
    fn from(err: BankError) -> Self {
        ApiError::Bank(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Status code for a bank error.
pub fn status_for(err: &BankError) -> StatusCode {
    match err {
        BankError::InvalidName(_)
        | BankError::InvalidAmount(_)
        | BankError::InsufficientBalance { .. }
        | BankError::UnknownToken(_)
        | BankError::InvalidTransaction(_) => StatusCode::BAD_REQUEST,
        BankError::AccountNotFound(_) => StatusCode::NOT_FOUND,
        BankError::DuplicateAccount(_) => StatusCode::CONFLICT,
        BankError::Chain(_) => StatusCode::BAD_GATEWAY,
        BankError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
        BankError::DatabaseTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        BankError::Configuration(_) | BankError::Decryption(_) | BankError::Encryption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Bank(err) => {
                let status = status_for(&err);
                if status.is_server_error() {
                    tracing::error!(error = %err, code = err.code(), "Request failed");
                } else {
                    tracing::debug!(error = %err, code = err.code(), "Request rejected");
                }
                let body = ErrorBody::new(err.to_string(), err.code()).with_tx_hash(err.tx_hash());
                (status, body)
            }
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new(detail, "invalid_request"),
            ),
        };
        (status, Json(body)).into_response()
    }
}
