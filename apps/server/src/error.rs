use std::io::Error as IoError;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error("{0:#}")]
    Startup(#[from] anyhow::Error),
}

/// Errors surfaced by the JSON API as status codes with a small body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid query: {0}")]
    Query(String),
    #[error("database error")]
    Database(#[from] anyhow::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Query(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Database(e) = self {
            tracing::error!("API database error: {e:#}");
        }

        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
