use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use referent_core::ReferentError;
use tracing::{error, warn};

/// A pipeline failure rendered as the JSON error payload.
#[derive(Debug)]
pub struct ApiError(pub ReferentError);

impl From<ReferentError> for ApiError {
    fn from(err: ReferentError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ReferentError::InvalidInput(rejection.body_text()))
    }
}

/// Upstream status when it is a client or server error, else 502.
fn relay(status: Option<u16>) -> StatusCode {
    status
        .and_then(|s| StatusCode::from_u16(s).ok())
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

pub fn status_for(err: &ReferentError) -> StatusCode {
    match err {
        ReferentError::InvalidInput(_) | ReferentError::InvalidUrl(_) | ReferentError::ExtractionEmpty => {
            StatusCode::BAD_REQUEST
        }
        ReferentError::FetchFailed { status, .. } | ReferentError::UpstreamService { status, .. } => relay(*status),
        ReferentError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        ReferentError::Configuration(_)
        | ReferentError::MarkupError(_)
        | ReferentError::FileNotFound(_)
        | ReferentError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let info = self.0.info();

        if status.is_server_error() {
            error!(status = status.as_u16(), kind = %info.kind, error = %info.message, "request failed");
        } else {
            warn!(status = status.as_u16(), kind = %info.kind, error = %info.message, "request rejected");
        }

        (status, Json(info)).into_response()
    }
}
