mod routes;
mod viz;

pub use routes::create_router;
pub use viz::GRAPH_VIZ_HTML;

use crate::config::ConfiguredPalette;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use carnet_client::USER_HEADER;
use carnet_core::{CarnetError, Dimensions, Journal, UserId};
use serde::Serialize;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub journal: Journal,
    pub palette: Arc<ConfiguredPalette>,
    /// Drawing area used when a graph request gives no size.
    pub default_dimensions: Dimensions,
    pub start_time: std::time::Instant,
}

/// JSON response wrapper
#[derive(Serialize)]
pub struct JsonResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> JsonResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> JsonResponse<()> {
        JsonResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Error type for HTTP handlers. Journal errors pick their own status.
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!(msg.into()),
        }
    }
}

fn status_for(error: &anyhow::Error) -> StatusCode {
    match error.downcast_ref::<CarnetError>() {
        Some(CarnetError::EntryNotFound(_)) | Some(CarnetError::LinkNotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        Some(CarnetError::Validation(_)) | Some(CarnetError::InvalidLink { .. }) => {
            StatusCode::BAD_REQUEST
        }
        Some(CarnetError::Forbidden(_)) => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed: {:#}", self.error);
        }
        (
            self.status,
            Json(JsonResponse::<()>::err(self.error.to_string())),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        Self {
            status: status_for(&error),
            error,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// The acting user, read from the `x-carnet-user` header. Authentication
/// happens upstream; this only scopes the request.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_HEADER)
            .ok_or_else(|| AppError::bad_request(format!("Missing {} header", USER_HEADER)))?
            .to_str()
            .map_err(|_| AppError::bad_request(format!("Invalid {} header", USER_HEADER)))?;
        let user = uuid::Uuid::parse_str(raw.trim())
            .map_err(|e| AppError::bad_request(format!("Invalid {} header: {}", USER_HEADER, e)))?;
        Ok(CurrentUser(user))
    }
}
