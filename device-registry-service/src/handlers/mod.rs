mod error;
mod operations;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, put};
use axum::Router;
use device_registry_core::{Resolver, StoreFacade};
use device_registry_health::HealthRegistry;

pub struct AppState<S> {
    pub resolver: Resolver<S>,
    pub readiness: HealthRegistry,
}

async fn readiness<S: StoreFacade + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> device_registry_health::HealthStatus {
    state.readiness.get_status().await
}

/// The subsystem has no liveness check of its own (spec §4.4): it is
/// liveness-equivalent to the process hosting it, so this just confirms the
/// HTTP server is answering requests.
async fn liveness() -> &'static str {
    "ok"
}

pub fn app<S: StoreFacade + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route(
            "/tenants/:tenant/devices/:device/gateway",
            put(operations::put_gateway::<S>).get(operations::get_gateway::<S>),
        )
        .route(
            "/tenants/:tenant/devices/:device/adapter-instance",
            put(operations::put_adapter_instance::<S>)
                .delete(operations::delete_adapter_instance::<S>),
        )
        .route(
            "/tenants/:tenant/devices/:device/adapter-instances",
            get(operations::get_adapter_instances::<S>),
        )
        .route("/_readiness", get(readiness::<S>))
        .route("/_liveness", get(liveness))
        .with_state(state)
}
