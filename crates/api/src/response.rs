//! Uniform response envelope for API handlers.
//!
//! Every response, success or failure, has the shape
//! `{ "data", "status", "message", "errors": [], "validationErrors": {} }`.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    /// Numeric HTTP status, repeated in the body.
    pub status: u16,
    pub message: String,
    pub errors: Vec<String>,
    pub validation_errors: BTreeMap<String, String>,
}

fn reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown").to_string()
}

impl<T: Serialize> ApiResponse<T> {
    fn with_status(status: StatusCode, data: Option<T>, message: String) -> Self {
        Self {
            data,
            status: status.as_u16(),
            message,
            errors: Vec::new(),
            validation_errors: BTreeMap::new(),
        }
    }

    /// `200 OK` carrying `data`.
    pub fn ok(data: T) -> Self {
        Self::with_status(StatusCode::OK, Some(data), reason(StatusCode::OK))
    }

    /// `201 Created` carrying `data`.
    pub fn created(data: T) -> Self {
        Self::with_status(StatusCode::CREATED, Some(data), reason(StatusCode::CREATED))
    }
}

impl ApiResponse<()> {
    /// A body without data, e.g. after a delete.
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self::with_status(status, None, message.into())
    }

    /// An error body. `errors` and `validation_errors` may be empty.
    pub fn error(
        status: StatusCode,
        message: impl Into<String>,
        errors: Vec<String>,
        validation_errors: BTreeMap<String, String>,
    ) -> Self {
        Self {
            errors,
            validation_errors,
            ..Self::message(status, message)
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["status"], 200);
        assert_eq!(json["message"], "OK");
        assert_eq!(json["errors"], serde_json::json!([]));
        assert_eq!(json["validationErrors"], serde_json::json!({}));
    }

    #[test]
    fn message_envelope_has_null_data() {
        let json =
            serde_json::to_value(ApiResponse::message(StatusCode::OK, "Project deleted")).unwrap();
        assert!(json["data"].is_null());
        assert_eq!(json["message"], "Project deleted");
    }
}
