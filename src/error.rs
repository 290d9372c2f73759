//! HTTP-facing error taxonomy.
//!
//! Every handler failure ends up as an [`ApiError`]. Internal details are
//! logged and never reach the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Body of 401 and 422 responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: u16,
    pub reason: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Body of 404 and 500 responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Client data failed validation; 422 with the offending field
    #[error("{message} ({location})")]
    Validation { message: String, location: String },

    /// Malformed request answered in plain text; 400
    #[error("{0}")]
    BadRequest(String),

    /// Missing, malformed or expired credentials; 401
    #[error("{0}")]
    Authentication(String),

    /// Unknown route or record; 404
    #[error("Not Found")]
    NotFound,

    /// Anything unclassified; 500 with a generic body
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn missing_field(field: &str) -> Self {
        ApiError::Validation {
            message: "Missing field".to_string(),
            location: field.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation { message, location } => {
                let body = ErrorResponse {
                    code: status.as_u16(),
                    reason: "ValidationError".to_string(),
                    message,
                    location: Some(location),
                };
                (status, Json(body)).into_response()
            }
            ApiError::BadRequest(message) => {
                tracing::warn!("{}", message);
                (status, message).into_response()
            }
            ApiError::Authentication(message) => {
                let body = ErrorResponse {
                    code: status.as_u16(),
                    reason: "AuthenticationError".to_string(),
                    message,
                    location: None,
                };
                (status, Json(body)).into_response()
            }
            ApiError::NotFound => {
                let body = MessageResponse {
                    code: None,
                    message: "Not Found".to_string(),
                };
                (status, Json(body)).into_response()
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                let body = MessageResponse {
                    code: Some(status.as_u16()),
                    message: INTERNAL_ERROR_MESSAGE.to_string(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    async fn body_of(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let response = ApiError::missing_field("note").into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: serde_json::Value = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(body["code"], 422);
        assert_eq!(body["reason"], "ValidationError");
        assert_eq!(body["message"], "Missing field");
        assert_eq!(body["location"], "note");
    }

    #[tokio::test]
    async fn test_bad_request_is_plain_text() {
        let response = ApiError::BadRequest("Missing `amount` in request body".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/plain"));

        let body = body_of(response).await;
        assert_eq!(body, b"Missing `amount` in request body");
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response =
            ApiError::Internal("connection refused: 10.0.0.3:5432".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
        assert!(!body.to_string().contains("10.0.0.3"));
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "Not Found" }));
    }

    #[tokio::test]
    async fn test_authentication_error_body() {
        let response = ApiError::Authentication("Token has expired".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(body["reason"], "AuthenticationError");
        assert_eq!(body["message"], "Token has expired");
        assert!(body.get("location").is_none());
    }
}
