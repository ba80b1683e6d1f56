use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors a handler can surface to the client. Every variant renders as
/// `{"error": "<message>"}` with the matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Creation payload is missing one of the required fields.
    #[error("Faltan datos requeridos: clave_ine, curp, IDpersona")]
    MissingFields,

    /// No row matched the requested id or CURP.
    #[error("{0}")]
    NotFound(&'static str),

    /// Any connectivity, query, or constraint failure from MySQL. The
    /// underlying driver message is exposed to the client as-is.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFields => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Database(err) => tracing::error!("database error: {err}"),
            ApiError::MissingFields | ApiError::NotFound(_) => {
                tracing::debug!("client error: {}", self)
            }
        }

        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
