use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use datum_backend::BackendError;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("no token provided")]
    MissingToken,

    #[error("the reserved tenant \"_\" cannot be addressed directly")]
    ReservedTenant,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,

    #[error("method {0} not allowed")]
    MethodNotAllowed(axum::http::Method),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ReservedTenant => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Backend(e) => match e {
                BackendError::Document(_) | BackendError::InvalidAliasTarget(_) => {
                    StatusCode::BAD_REQUEST
                }
                BackendError::Codec(datum_backend::CodecError::InvalidKeyId(_)) => {
                    StatusCode::BAD_REQUEST
                }
                BackendError::CorruptAliasMapping { .. } => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, "request failed");
        } else {
            debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, format!("{self}\n")).into_response()
    }
}
