//! HTTP mapping for `IntelError`. Every error body is `{"detail": "..."}`.

use crate::error::IntelError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl IntelError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IntelError::NotFound(_) => StatusCode::NOT_FOUND,
            IntelError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            IntelError::Generation(_) => StatusCode::BAD_GATEWAY,
            IntelError::Computation(_)
            | IntelError::Configuration(_)
            | IntelError::Database(_)
            | IntelError::Serialization(_)
            | IntelError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for IntelError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::warn!("request failed ({status}): {self}");
        } else {
            log::info!("request rejected ({status}): {self}");
        }
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for IntelError {
    fn from(rejection: JsonRejection) -> Self {
        IntelError::InvalidRequest(rejection.body_text())
    }
}
