use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::{Display, Error};
use serde_json::json;
use tracing::error;

/// Error returned by every handler, rendered as `{"error": "..."}`.
#[derive(Debug, Display, Error)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    BadRequest(#[error(not(source))] String),

    #[display(fmt = "{}", _0)]
    NotFound(#[error(not(source))] String),

    /// The message is what the client sees; the cause only goes to the log.
    #[display(fmt = "{}", message)]
    Database {
        message: &'static str,
        #[error(source)]
        source: sqlx::Error,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    /// Wraps a sqlx failure, logging it the moment it is raised.
    pub fn database(message: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| {
            match &source {
                sqlx::Error::Database(db_err) => {
                    error!(error = %db_err, code = ?db_err.code(), "Database error: {message}");
                }
                other => {
                    error!(error = %other, "Unexpected error: {message}");
                }
            }
            ApiError::Database { message, source }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string()
        }))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
