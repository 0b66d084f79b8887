use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;

use crate::schemas::ErrorBody;
use crate::store::StoreError;

/// Everything a handler can fail with. Each variant carries what the uniform
/// `{ message }` error body needs; nothing propagates past the handler
/// boundary as a crash.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Aggregated required-field / enum violations; the message already
    /// names every violated path.
    #[error("{0}")]
    Validation(String),
    #[error("Invalid email")]
    InvalidEmail,
    /// Unique-constraint collision on the named field.
    #[error("{0} already exists")]
    Duplicate(&'static str),
    /// Structurally malformed identifier, checked before any lookup.
    #[error("Invalid {0} ID")]
    InvalidId(&'static str),
    #[error("Cannot find {0}")]
    NotFound(&'static str),
    /// Nested read against a collection that is not a child of the owner.
    #[error("Cannot find resource")]
    UnknownChild,
    /// PATCH carried a disallowed or null-valued key; nothing was applied.
    #[error("Invalid updates")]
    InvalidUpdates(Vec<String>),
    /// Query filter used a key outside the resource allow-list.
    #[error("Invalid query parameters")]
    InvalidQuery(&'static [&'static str]),
    /// `unique` filter matched more than one document.
    #[error("Duplicate values exist")]
    DuplicateValues,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) | ApiError::UnknownChild => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = ErrorBody {
            message: self.to_string(),
            invalid_updates: None,
            allowed_query_params: None,
        };
        match &self {
            ApiError::InvalidUpdates(fields) => {
                body.invalid_updates = Some(fields.clone());
            }
            ApiError::InvalidQuery(allowed) => {
                body.allowed_query_params =
                    Some(allowed.iter().map(|param| param.to_string()).collect());
            }
            _ => {}
        }
        (self.status(), Json(body)).into_response()
    }
}
