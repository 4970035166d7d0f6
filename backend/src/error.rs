use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type InventoryResult<T> = Result<T, InventoryError>;

impl From<JsonRejection> for InventoryError {
    fn from(rejection: JsonRejection) -> Self {
        InventoryError::Validation(rejection.body_text())
    }
}

impl InventoryError {
    pub fn status(&self) -> StatusCode {
        match self {
            InventoryError::Auth(_) => StatusCode::UNAUTHORIZED,
            InventoryError::Validation(_) => StatusCode::BAD_REQUEST,
            InventoryError::NotFound(_) => StatusCode::NOT_FOUND,
            InventoryError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for InventoryError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            InventoryError::Auth(msg)
            | InventoryError::Validation(msg)
            | InventoryError::NotFound(msg) => msg,
            InventoryError::MethodNotAllowed => self.to_string(),
            InventoryError::Database(ref e) => {
                tracing::error!("Database Error: {:?}", e);
                "Database operation failed".to_string()
            }
            InventoryError::Internal(ref msg) => {
                tracing::error!("Internal Error: {}", msg);
                "Internal server error".to_string()
            }
            _ => {
                tracing::error!("Unhandled Error: {:?}", self);
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
