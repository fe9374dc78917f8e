//! The narrow capability interface the resolver programs against (spec
//! §4.2). Any backend that can offer these six operations is acceptable;
//! `device-registry-store-etcd` is the reference implementation.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use thiserror::Error;

/// An opaque, equality-comparable version token returned alongside a value
/// by [`StoreFacade::get_with_version`] and consumed by
/// [`StoreFacade::remove_with_version`] for CAS-style removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version(pub i64);

/// Opaque backend-level statistics returned by a successful availability
/// probe. Callers should treat the contents as metadata for display, not as
/// something to branch on.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct BackendStats(pub BTreeMap<String, String>);

/// A store-layer failure: transport, timeout, or serialization error from
/// the backend. Never surfaced past the resolver boundary, see
/// [`crate::error::RegistryError::Internal`].
#[derive(Error, Debug)]
#[error("store backend error: {0}")]
pub struct StoreError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

impl StoreError {
    pub fn new(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(cause))
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Thin capability interface over the remote key/value store (spec §4.2).
///
/// All operations are asynchronous. Implementations must surface only
/// [`StoreError`] on backend/transport failure; absence of a key is
/// represented in the return type (`None`, or simply missing from
/// `get_all`'s result map), not as an error.
#[async_trait]
pub trait StoreFacade: Send + Sync {
    /// Unconditional upsert.
    async fn put(&self, key: String, value: String) -> StoreResult<()>;

    /// Current value, or `None` if absent.
    async fn get(&self, key: String) -> StoreResult<Option<String>>;

    /// A mapping from each *present* key to its value. Absent keys are
    /// simply not in the result; this must not fail merely because some
    /// keys are absent.
    async fn get_all(&self, keys: HashSet<String>) -> StoreResult<HashMap<String, String>>;

    /// Current value and version, or `None` if absent.
    async fn get_with_version(&self, key: String) -> StoreResult<Option<(String, Version)>>;

    /// Atomically removes the entry iff its current version equals
    /// `version`. Returns `false` when the entry was modified or removed
    /// concurrently (i.e. the version no longer matches), not an error.
    async fn remove_with_version(&self, key: String, version: Version) -> StoreResult<bool>;

    /// Readiness probe used by the `remote-cache-connection` health check
    /// (spec §4.4).
    async fn check_availability(&self) -> StoreResult<BackendStats>;
}
