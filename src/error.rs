use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::models::ParseEnumError;

#[derive(Error, Debug)]
pub enum SalonError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Appointment not found: {0}")]
    AppointmentNotFound(i32),

    #[error("Product not found: {0}")]
    ProductNotFound(i32),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i32 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type SalonResult<T> = Result<T, SalonError>;

impl SalonError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        SalonError::NotFound { entity, id }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        SalonError::Validation(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            SalonError::AppointmentNotFound(_)
            | SalonError::ProductNotFound(_)
            | SalonError::NotFound { .. } => StatusCode::NOT_FOUND,
            SalonError::Validation(_) => StatusCode::BAD_REQUEST,
            SalonError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            SalonError::Mail(_) => StatusCode::BAD_GATEWAY,
            SalonError::Database(_)
            | SalonError::Migration(_)
            | SalonError::Io(_)
            | SalonError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ParseEnumError> for SalonError {
    fn from(err: ParseEnumError) -> Self {
        SalonError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for SalonError {
    fn from(rejection: JsonRejection) -> Self {
        SalonError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for SalonError {
    fn from(rejection: PathRejection) -> Self {
        SalonError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for SalonError {
    fn from(rejection: QueryRejection) -> Self {
        SalonError::Validation(rejection.body_text())
    }
}

impl IntoResponse for SalonError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal error: {:?}", self);
            "Something went wrong on our side.".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
