//! An in-memory `StoreFacade` with call recording, in the style of
//! `common/redis`'s `MockRedisClient`. Used by `device-registry-core`'s and
//! `device-registry-service`'s tests so the call-counting property in spec
//! §8 S7 is directly assertable without a live etcd cluster.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use device_registry_core::{BackendStats, StoreError, StoreFacade, StoreResult, Version};

#[derive(Debug, Clone)]
pub enum MockStoreCall {
    Put(String),
    Get(String),
    GetAll(Vec<String>),
    GetWithVersion(String),
    RemoveWithVersion(String),
    CheckAvailability,
}

#[derive(Default)]
struct Entry {
    value: String,
    version: i64,
}

/// Mutable shared state, cloned cheaply via `Arc` the way `EtcdStore` wraps
/// an etcd `Client`.
#[derive(Clone, Default)]
pub struct MockStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    calls: Arc<Mutex<Vec<MockStoreCall>>>,
    availability_failure: Arc<Mutex<Option<String>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a key directly, bypassing call recording. Use in test setup.
    pub fn seed(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut entries = self.entries.lock().unwrap();
        let key = key.into();
        let version = entries.get(&key).map(|e| e.version + 1).unwrap_or(1);
        entries.insert(key, Entry { value: value.into(), version });
    }

    /// Makes `check_availability` fail with the given reason until cleared.
    pub fn fail_availability(&self, reason: impl Into<String>) {
        *self.availability_failure.lock().unwrap() = Some(reason.into());
    }

    pub fn calls(&self) -> Vec<MockStoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: MockStoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl StoreFacade for MockStore {
    async fn put(&self, key: String, value: String) -> StoreResult<()> {
        self.record(MockStoreCall::Put(key.clone()));
        let mut entries = self.entries.lock().unwrap();
        let version = entries.get(&key).map(|e| e.version + 1).unwrap_or(1);
        entries.insert(key, Entry { value, version });
        Ok(())
    }

    async fn get(&self, key: String) -> StoreResult<Option<String>> {
        self.record(MockStoreCall::Get(key.clone()));
        Ok(self.entries.lock().unwrap().get(&key).map(|e| e.value.clone()))
    }

    async fn get_all(&self, keys: HashSet<String>) -> StoreResult<HashMap<String, String>> {
        let mut sorted: Vec<String> = keys.iter().cloned().collect();
        sorted.sort();
        self.record(MockStoreCall::GetAll(sorted));
        let entries = self.entries.lock().unwrap();
        Ok(keys
            .into_iter()
            .filter_map(|k| entries.get(&k).map(|e| (k, e.value.clone())))
            .collect())
    }

    async fn get_with_version(&self, key: String) -> StoreResult<Option<(String, Version)>> {
        self.record(MockStoreCall::GetWithVersion(key.clone()));
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(&key)
            .map(|e| (e.value.clone(), Version(e.version))))
    }

    async fn remove_with_version(&self, key: String, version: Version) -> StoreResult<bool> {
        self.record(MockStoreCall::RemoveWithVersion(key.clone()));
        let mut entries = self.entries.lock().unwrap();
        match entries.get(&key) {
            Some(entry) if entry.version == version.0 => {
                entries.remove(&key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn check_availability(&self) -> StoreResult<BackendStats> {
        self.record(MockStoreCall::CheckAvailability);
        if let Some(reason) = self.availability_failure.lock().unwrap().clone() {
            return Err(StoreError::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                reason,
            )));
        }
        let mut stats = std::collections::BTreeMap::new();
        stats.insert("backend".to_string(), "mock".to_string());
        Ok(BackendStats(stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn records_calls_in_order() {
        let store = MockStore::new();
        store.seed("ai@@T1@@dev-1", "adapter-A");
        store.get("ai@@T1@@dev-1".to_string()).await.unwrap();
        store
            .get_all(HashSet::from(["ai@@T1@@dev-1".to_string()]))
            .await
            .unwrap();
        assert_eq!(store.call_count(), 2);
    }

    #[tokio::test]
    async fn availability_can_be_forced_to_fail() {
        let store = MockStore::new();
        store.fail_availability("connection refused");
        assert!(store.check_availability().await.is_err());
    }
}
