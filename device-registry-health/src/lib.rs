//! A pull-based health-probe registry (spec §4.4): components register a
//! name, a timeout, and a [`HealthProbe`], and the registry invokes each
//! probe (bounded by its own timeout) only when status is queried, folding
//! the results per a configurable [`HealthStrategy`].
//!
//! This is the mirror image of the push-based `HealthRegistry` elsewhere in
//! this codebase, where components report their own status on a schedule;
//! here the registry does the asking, because `checkAvailability` (spec
//! §4.2) is itself a pull operation with no notion of "recently healthy".

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use device_registry_core::HealthProbe;
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComponentStatus {
    Healthy { stats: HashMap<String, String> },
    Unhealthy { reason: String },
    TimedOut,
}

impl ComponentStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ComponentStatus::Healthy { .. })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum HealthStrategy {
    /// All registered components must be healthy.
    All,
    /// At least one registered component must be healthy.
    Any,
}

impl std::str::FromStr for HealthStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_ref() {
            "all" => Ok(HealthStrategy::All),
            "any" => Ok(HealthStrategy::Any),
            _ => Err(format!("unknown health strategy: {s}, must be ALL or ANY")),
        }
    }
}

#[derive(Debug)]
pub struct HealthStatus {
    pub healthy: bool,
    pub components: HashMap<String, ComponentStatus>,
}

impl IntoResponse for HealthStatus {
    fn into_response(self) -> Response {
        let body = format!("{self:?}");
        match self.healthy {
            true => (StatusCode::OK, body),
            false => (StatusCode::SERVICE_UNAVAILABLE, body),
        }
        .into_response()
    }
}

struct RegisteredProbe {
    timeout: Duration,
    probe: Arc<dyn HealthProbe>,
}

/// Registry of named probes, each invoked under its own timeout when
/// [`HealthRegistry::get_status`] is called. Each readiness/liveness check
/// in `device-registry-service` should hold its own registry instance, the
/// way the push-based registry recommends one instance per k8s probe.
#[derive(Clone)]
pub struct HealthRegistry {
    name: String,
    strategy: HealthStrategy,
    probes: Arc<RwLock<HashMap<String, RegisteredProbe>>>,
}

impl HealthRegistry {
    pub fn new(name: &str) -> Self {
        Self::new_with_strategy(name, HealthStrategy::All)
    }

    pub fn new_with_strategy(name: &str, strategy: HealthStrategy) -> Self {
        Self {
            name: name.to_owned(),
            strategy,
            probes: Default::default(),
        }
    }

    /// Registers `probe` under `name`, to be invoked with an upper bound of
    /// `timeout_ms` whenever status is queried. Spec §4.4's
    /// `remote-cache-connection` readiness check is registered this way,
    /// with `timeout_ms = 1000` and a [`device_registry_core::StoreHealthProbe`].
    pub fn register(&self, name: impl Into<String>, timeout_ms: u64, probe: Arc<dyn HealthProbe>) {
        let mut probes = self.probes.write().expect("poisoned HealthRegistry lock");
        probes.insert(
            name.into(),
            RegisteredProbe {
                timeout: Duration::from_millis(timeout_ms),
                probe,
            },
        );
    }

    /// Invokes every registered probe under its own timeout and folds the
    /// results per `self.strategy`. Can be used directly as an axum handler
    /// via `IntoResponse` (`HealthStatus` implements it).
    pub async fn get_status(&self) -> HealthStatus {
        let snapshot: Vec<(String, Duration, Arc<dyn HealthProbe>)> = {
            let probes = self.probes.read().expect("poisoned HealthRegistry lock");
            probes
                .iter()
                .map(|(name, registered)| (name.clone(), registered.timeout, registered.probe.clone()))
                .collect()
        };

        let mut components = HashMap::with_capacity(snapshot.len());
        for (name, timeout, probe) in snapshot {
            let status = match tokio::time::timeout(timeout, probe.probe()).await {
                Ok(Ok(stats)) => ComponentStatus::Healthy { stats: stats.0.into_iter().collect() },
                Ok(Err(reason)) => ComponentStatus::Unhealthy { reason },
                Err(_) => ComponentStatus::TimedOut,
            };
            components.insert(name, status);
        }

        let healthy = match self.strategy {
            HealthStrategy::All => {
                !components.is_empty() && components.values().all(ComponentStatus::is_healthy)
            }
            HealthStrategy::Any => components.values().any(ComponentStatus::is_healthy),
        };

        match healthy {
            true => info!("{} health check ok", self.name),
            false => warn!("{} health check failed: {:?}", self.name, components),
        }
        HealthStatus { healthy, components }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use device_registry_core::BackendStats;

    struct AlwaysHealthy;
    #[async_trait]
    impl HealthProbe for AlwaysHealthy {
        async fn probe(&self) -> Result<BackendStats, String> {
            Ok(BackendStats::default())
        }
    }

    struct AlwaysFails;
    #[async_trait]
    impl HealthProbe for AlwaysFails {
        async fn probe(&self) -> Result<BackendStats, String> {
            Err("connection refused".to_string())
        }
    }

    struct NeverResponds;
    #[async_trait]
    impl HealthProbe for NeverResponds {
        async fn probe(&self) -> Result<BackendStats, String> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn healthy_when_no_probes_registered_is_false_for_all_strategy() {
        let registry = HealthRegistry::new("test");
        let status = registry.get_status().await;
        assert!(!status.healthy);
    }

    #[tokio::test]
    async fn all_strategy_requires_every_probe_healthy() {
        let registry = HealthRegistry::new("test");
        registry.register("ok", 1000, Arc::new(AlwaysHealthy));
        registry.register("bad", 1000, Arc::new(AlwaysFails));
        let status = registry.get_status().await;
        assert!(!status.healthy);
        assert!(status.components["ok"].is_healthy());
        assert!(!status.components["bad"].is_healthy());
    }

    #[tokio::test]
    async fn any_strategy_requires_one_probe_healthy() {
        let registry = HealthRegistry::new_with_strategy("test", HealthStrategy::Any);
        registry.register("ok", 1000, Arc::new(AlwaysHealthy));
        registry.register("bad", 1000, Arc::new(AlwaysFails));
        let status = registry.get_status().await;
        assert!(status.healthy);
    }

    #[tokio::test]
    async fn probe_exceeding_its_timeout_is_reported_timed_out() {
        let registry = HealthRegistry::new("test");
        registry.register("slow", 10, Arc::new(NeverResponds));
        let status = registry.get_status().await;
        assert!(!status.healthy);
        assert_eq!(status.components["slow"], ComponentStatus::TimedOut);
    }
}
