use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request body or path could not be decoded.
    #[error("{0}")]
    MalformedRequest(String),

    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("email is already registered")]
    EmailTaken,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("incorrect email or password")]
    IncorrectEmailOrPassword,

    /// The record does not exist or is not reachable from the requesting user.
    #[error("not found")]
    NotFound,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("session error: {0}")]
    Session(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) | Self::InvalidInput(_) | Self::EmailTaken => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::NotAuthenticated | Self::IncorrectEmailOrPassword => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Config(_)
            | Self::Session(_)
            | Self::Sqlx(_)
            | Self::Migrate(_)
            | Self::TaskJoin(_)
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
            "internal server error".to_owned()
        } else {
            self.to_string()
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Self::MalformedRequest(rejection.body_text())
    }
}

impl From<axum_login::Error<crate::authentication::Backend>> for Error {
    fn from(err: axum_login::Error<crate::authentication::Backend>) -> Self {
        match err {
            axum_login::Error::Backend(err) => err,
            axum_login::Error::Session(err) => Self::Session(err.to_string()),
        }
    }
}
