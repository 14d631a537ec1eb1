use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use scrip_minter::MintError;
use serde::Serialize;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// Malformed transport input, rejected before it reaches the engine.
    BadRequest(String),
    Mint(MintError),
}

impl From<MintError> for AppError {
    fn from(err: MintError) -> Self {
        AppError::Mint(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Mint(MintError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            AppError::Mint(err @ MintError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            AppError::Mint(MintError::Storage(message)) => {
                // The underlying error is diagnostic material, not
                // something to hand to API clients.
                error!(%message, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage failure".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}
