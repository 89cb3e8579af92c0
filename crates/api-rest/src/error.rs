//! Mapping of core errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rx_core::RxError;
use serde::Serialize;
use utoipa::ToSchema;

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorRes {
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError(pub RxError);

impl From<RxError> for ApiError {
    fn from(err: RxError) -> Self {
        Self(err)
    }
}

impl From<rx_core::GatewayError> for ApiError {
    fn from(err: rx_core::GatewayError) -> Self {
        Self(RxError::Gateway(err))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RxError::Unauthenticated => StatusCode::UNAUTHORIZED,
            RxError::NotFound { .. } | RxError::TemplateNotFound(_) => StatusCode::NOT_FOUND,
            RxError::SessionClosed => StatusCode::CONFLICT,
            RxError::Gateway(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.0.to_string();
        if status.is_server_error() {
            tracing::error!(%status, %message, "request failed");
        } else {
            tracing::warn!(%status, %message, "request rejected");
        }
        (status, Json(ErrorRes { message })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
