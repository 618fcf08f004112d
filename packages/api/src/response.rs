// ABOUTME: Shared API response types and error handling
// ABOUTME: Provides consistent response format across all API endpoints

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
};
use serde::Serialize;

use leadhub_leads::StorageError;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Convert storage errors to HTTP responses
pub fn storage_error_response(error: StorageError) -> axum::response::Response {
    let (status, message) = match &error {
        StorageError::NotFound => (StatusCode::NOT_FOUND, error.to_string()),
        StorageError::Database(_) | StorageError::Sqlx(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Database error".to_string(),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        ),
    };

    (status, ResponseJson(ApiResponse::<()>::error(message))).into_response()
}

/// Shorthand for a 400 with the standard envelope
pub fn bad_request(message: impl Into<String>) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        ResponseJson(ApiResponse::<()>::error(message.into())),
    )
        .into_response()
}
