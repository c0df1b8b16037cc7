use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use projman_core::error::CoreError;
use projman_core::validation::FieldViolation;

use crate::response::ApiResponse;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Renders as the uniform [`ApiResponse`] envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error. The message is logged, never returned.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self {
            AppError::Core(core) => match core {
                CoreError::InvalidInput(msg) => simple(StatusCode::BAD_REQUEST, msg.clone()),
                CoreError::NotFound { .. } | CoreError::NoneFound { .. } => {
                    simple(StatusCode::NOT_FOUND, core.to_string())
                }
                CoreError::Validation { entity, violations } => validation(entity, violations),
                CoreError::Unauthorized(msg) => simple(StatusCode::UNAUTHORIZED, msg.clone()),
                CoreError::Conflict(msg) => simple(StatusCode::CONFLICT, msg.clone()),
                CoreError::Unexpected { context, source } => {
                    tracing::error!(error = %source, context = %context, "Unexpected core error");
                    internal()
                }
                CoreError::Store(err) => {
                    tracing::error!(error = %err, "Store error");
                    internal()
                }
            },
            AppError::BadRequest(msg) => simple(StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        body.into_response()
    }
}

fn simple(status: StatusCode, message: String) -> ApiResponse<()> {
    ApiResponse::error(status, message.clone(), vec![message], BTreeMap::new())
}

fn internal() -> ApiResponse<()> {
    simple(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
}

/// Every violation goes to `errors`; `validationErrors` keeps the first
/// message per field.
fn validation(entity: &str, violations: &[FieldViolation]) -> ApiResponse<()> {
    let mut by_field = BTreeMap::new();
    for v in violations {
        by_field
            .entry(v.field.clone())
            .or_insert_with(|| v.message.clone());
    }
    let errors = violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect();

    ApiResponse::error(
        StatusCode::BAD_REQUEST,
        format!("Validation failed for {entity}"),
        errors,
        by_field,
    )
}
