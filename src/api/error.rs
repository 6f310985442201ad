use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{error::Error, warning};

impl Error {
    /// Status code the frontend sees for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidParameter(_) | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized | Error::ProviderFetchFailed { status: 401 } => {
                StatusCode::UNAUTHORIZED
            }
            Error::NoMatchingTracks => StatusCode::NOT_FOUND,
            Error::ProviderFetchFailed { .. } | Error::Transport(_) | Error::MalformedResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
            Error::Config(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            warning!("Request failed: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
