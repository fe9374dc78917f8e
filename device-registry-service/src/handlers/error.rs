use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use device_registry_core::RegistryError;
use serde_json::json;

/// Wraps [`RegistryError`] so this crate can implement [`IntoResponse`] for
/// it (the trait and the type both live outside this crate).
///
/// Maps the resolver's error taxonomy (spec §7) to HTTP status the way
/// `feature-flags`'s `FlagError` maps onto `StatusCode`.
pub struct ApiError(pub RegistryError);

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RegistryError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            RegistryError::NotFound => StatusCode::NOT_FOUND,
            RegistryError::PreconditionFailed => StatusCode::CONFLICT,
            RegistryError::Internal { cause } => {
                tracing::debug!(error = %cause, "store-layer failure");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
