use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database not found at {0}")]
    DatabaseMissing(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("background task failed: {0}")]
    Task(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> Status {
        match self {
            AppError::NotFound(_) => Status::NotFound,
            AppError::InvalidInput(_) => Status::BadRequest,
            AppError::DatabaseMissing(_) => Status::ServiceUnavailable,
            AppError::Database(_) | AppError::Json(_) | AppError::Task(_) => {
                Status::InternalServerError
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status.code >= 500 {
            tracing::error!(uri = %req.uri(), error = %self, "request failed");
        } else {
            tracing::debug!(uri = %req.uri(), error = %self, "request rejected");
        }

        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).respond_to(req)
    }
}
