use std::sync::Arc;

use device_registry_core::{Resolver, StoreHealthProbe};
use device_registry_health::HealthRegistry;
use device_registry_service::config::Config;
use device_registry_service::handlers::{self, AppState};
use device_registry_store_etcd::EtcdStore;
use envconfig::Envconfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::init_from_env().expect("failed to load configuration from env");

    let store = EtcdStore::connect(config.etcd_endpoints(), config.etcd_key_prefix.clone())
        .await
        .expect("failed to connect to etcd");
    let store = Arc::new(store);

    let readiness = HealthRegistry::new("readiness");
    readiness.register(
        "remote-cache-connection",
        config.health_check_timeout_ms,
        Arc::new(StoreHealthProbe::new(store.clone())),
    );

    let resolver = Resolver::with_threshold(store, config.gateway_query_threshold);
    let state = Arc::new(AppState { resolver, readiness });

    let app = handlers::app(state).layer(tower_http::trace::TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind())
        .await
        .expect("failed to bind listener");
    tracing::info!(addr = %config.bind(), "device-registry-service listening");
    axum::serve(listener, app)
        .await
        .expect("http server exited with an error");
}
