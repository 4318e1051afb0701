use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use village_db::catalog::CatalogError;
use village_media::StorageError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Everything a handler can fail with, mapped to a status code at the edge.
#[derive(Debug)]
pub enum ApiError {
    Catalog(CatalogError),
    Storage(StorageError),
    Multipart(MultipartError),
    BadRequest(String),
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        ApiError::Catalog(e)
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Storage(e)
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::Multipart(e)
    }
}

impl ApiError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            ApiError::Catalog(CatalogError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg),
            ApiError::Catalog(CatalogError::Conflict(msg)) => (StatusCode::CONFLICT, msg),
            ApiError::Catalog(CatalogError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Catalog(CatalogError::Database(e)) => {
                tracing::error!("DB error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            ApiError::Storage(StorageError::InvalidImage(msg)) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to store file".to_string(),
                )
            }
            // Keeps 413 for oversized bodies
            ApiError::Multipart(e) => (e.status(), e.body_text()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_message();
        (status, Json(ErrorResponse { error })).into_response()
    }
}
