use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use etcd_client::{Client, Compare, CompareOp, Txn, TxnOp, TxnOpResponse};

use device_registry_core::{BackendStats, StoreFacade, StoreResult, Version};

use crate::error::Error;

/// `StoreFacade` over etcd. All logical keys produced by
/// `device_registry_core::codec` are namespaced under `key_prefix` so a
/// single etcd cluster can host multiple deployments.
#[derive(Clone)]
pub struct EtcdStore {
    client: Client,
    key_prefix: String,
    endpoints: Vec<String>,
}

impl EtcdStore {
    pub async fn connect(
        endpoints: Vec<String>,
        key_prefix: impl Into<String>,
    ) -> Result<Self, Error> {
        let client = Client::connect(&endpoints, None).await?;
        Ok(Self {
            client,
            key_prefix: key_prefix.into(),
            endpoints,
        })
    }

    #[cfg(test)]
    pub fn from_client(client: Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
            endpoints: Vec::new(),
        }
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }
}

fn decode(key: &str, value: &[u8]) -> Result<String, Error> {
    std::str::from_utf8(value)
        .map(str::to_string)
        .map_err(|_| Error::InvalidUtf8 {
            key: key.to_string(),
        })
}

#[async_trait]
impl StoreFacade for EtcdStore {
    async fn put(&self, key: String, value: String) -> StoreResult<()> {
        self.client
            .clone()
            .put(self.prefixed(&key), value, None)
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    async fn get(&self, key: String) -> StoreResult<Option<String>> {
        let resp = self
            .client
            .clone()
            .get(self.prefixed(&key), None)
            .await
            .map_err(Error::from)?;
        match resp.kvs().first() {
            Some(kv) => Ok(Some(decode(&key, kv.value())?)),
            None => Ok(None),
        }
    }

    /// A single etcd transaction carrying one `Get` op per key, so that the
    /// resolver's multi-key lookups (spec §5: "multi-key reads use a single
    /// `getAll`") translate to a single network round trip here too, rather
    /// than `keys.len()` sequential gets.
    async fn get_all(&self, keys: HashSet<String>) -> StoreResult<HashMap<String, String>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let ordered: Vec<String> = keys.into_iter().collect();
        let ops: Vec<TxnOp> = ordered
            .iter()
            .map(|key| TxnOp::get(self.prefixed(key), None))
            .collect();
        let resp = self
            .client
            .clone()
            .txn(Txn::new().and_then(ops))
            .await
            .map_err(Error::from)?;

        let mut result = HashMap::with_capacity(ordered.len());
        for (key, op_resp) in ordered.into_iter().zip(resp.op_responses()) {
            if let TxnOpResponse::Get(get_resp) = op_resp {
                if let Some(kv) = get_resp.kvs().first() {
                    result.insert(key.clone(), decode(&key, kv.value())?);
                }
            }
        }
        Ok(result)
    }

    async fn get_with_version(&self, key: String) -> StoreResult<Option<(String, Version)>> {
        let resp = self
            .client
            .clone()
            .get(self.prefixed(&key), None)
            .await
            .map_err(Error::from)?;
        match resp.kvs().first() {
            Some(kv) => Ok(Some((decode(&key, kv.value())?, Version(kv.version())))),
            None => Ok(None),
        }
    }

    async fn remove_with_version(&self, key: String, version: Version) -> StoreResult<bool> {
        let prefixed = self.prefixed(&key);
        let txn = Txn::new()
            .when(vec![Compare::version(
                prefixed.clone(),
                CompareOp::Equal,
                version.0,
            )])
            .and_then(vec![TxnOp::delete(prefixed, None)]);
        let resp = self.client.clone().txn(txn).await.map_err(Error::from)?;
        if !resp.succeeded() {
            tracing::debug!(key = %key, "remove_with_version lost the compare, entry changed concurrently");
        }
        Ok(resp.succeeded())
    }

    /// Backs the `remote-cache-connection` readiness probe (spec §4.4): a
    /// single round-trip `get` against the namespace prefix, timed out by
    /// the caller (`device-registry-health`), not here.
    async fn check_availability(&self) -> StoreResult<BackendStats> {
        let probe_key = self.prefixed("__health_probe__");
        let started = std::time::Instant::now();
        self.client
            .clone()
            .get(probe_key, None)
            .await
            .map_err(Error::from)?;

        let mut stats = BTreeMap::new();
        stats.insert("endpoints".to_string(), self.endpoints.join(","));
        stats.insert(
            "probe_latency_ms".to_string(),
            started.elapsed().as_millis().to_string(),
        );
        Ok(BackendStats(stats))
    }
}
