use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shopfront_common::response::Envelope;
use thiserror::Error;

/// Failures raised by a catalog store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not build database pool: {0}")]
    Setup(#[from] deadpool_postgres::CreatePoolError),

    #[error("database pool unavailable: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("database query failed: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("stored row is malformed: {0}")]
    Corrupt(String),

    #[error("record rejected: {0}")]
    Invalid(String),
}

/// Errors a handler can return. Rendered as a failure [`Envelope`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Path(#[from] PathRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Pool(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Path(e) => e.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::NotFound(_) => self.to_string(),
            ApiError::Path(e) => e.body_text(),
            ApiError::Store(e) => {
                tracing::error!(error = %e, "catalog store failure");
                "Something went wrong".to_string()
            }
        };
        let body: Envelope<()> = Envelope::failure(status.as_u16(), message);
        (status, Json(body)).into_response()
    }
}
