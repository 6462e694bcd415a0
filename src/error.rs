use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::services::catalog::CatalogError;
use crate::storage::StoreError;

/// Problems with a product submission. The display text is what the
/// add-product form flashes back to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Fill all fields")]
    MissingField,
    #[error("Name is too long (max {max} characters)")]
    NameTooLong { max: usize },
    #[error("Invalid image format")]
    InvalidImageType,
    #[error("Invalid price")]
    InvalidPrice,
    #[error("Invalid category")]
    InvalidCategory,
    #[error("Invalid size")]
    InvalidSize,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Storage(e) => Self::Storage(e),
            CatalogError::Io(e) => Self::Io(e),
            // handlers recover validation errors before they get here
            CatalogError::Validation(e) => Self::BadRequest(e.to_string()),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    status: u16,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Storage(_) | Self::Io(_) | Self::Template(_) | Self::Session(_) => {
                tracing::error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let page = ErrorTemplate {
            status: status.as_u16(),
            message,
        };
        match page.render() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (status, "Internal server error").into_response()
            }
        }
    }
}
