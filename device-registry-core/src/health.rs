//! The collaborator interface a health-probe registry consumes (spec §4.4,
//! §6). `device-registry-core` defines the trait and a ready-made adapter
//! over any [`StoreFacade`]; `device-registry-health` defines the registry
//! that calls `register(name, timeoutMs, probe)` and invokes probes under a
//! timeout when status is queried.

use std::sync::Arc;

use async_trait::async_trait;

use crate::store::{BackendStats, StoreFacade};

/// Something that can be asked "are you reachable right now", returning
/// opaque statistics on success or a human-readable reason on failure.
///
/// The registry that holds probes (`device-registry-health`) is generic
/// over this trait so it never needs to know about etcd, or any other
/// concrete backend.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self) -> Result<BackendStats, String>;
}

/// Adapts any [`StoreFacade`]'s `checkAvailability` into a [`HealthProbe`].
/// This is the `remote-cache-connection` probe named in spec §4.4.
pub struct StoreHealthProbe<S>(pub Arc<S>);

impl<S> StoreHealthProbe<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self(store)
    }
}

#[async_trait]
impl<S: StoreFacade> HealthProbe for StoreHealthProbe<S> {
    async fn probe(&self) -> Result<BackendStats, String> {
        self.0.check_availability().await.map_err(|err| err.to_string())
    }
}
