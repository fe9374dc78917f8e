//! The four public operations and the device→adapter-instance selection
//! algorithm (spec §4.3). This is the only stateful-across-calls operation
//! in the crate (via the store's version token, in
//! [`Resolver::remove_command_handling_adapter_instance`]); every other
//! operation is stateless at this layer.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::Instrument;

use crate::codec;
use crate::error::{RegistryError, Result};
use crate::ids::{AdapterInstanceId, DeviceId, GatewayId, TenantId};
use crate::result::{AdapterInstanceEntry, AdapterInstancesResult, GatewayResult};
use crate::store::StoreFacade;

/// Default threshold at which [`Resolver::get_command_handling_adapter_instances`]
/// switches from the query-all-first strategy to the last-known-first
/// strategy. Fixed at 3 by the spec; exposed here as a constructor
/// parameter so deployments can tune it without forking the algorithm.
pub const DEFAULT_GATEWAY_QUERY_THRESHOLD: usize = 3;

pub struct Resolver<S> {
    store: Arc<S>,
    gateway_query_threshold: usize,
}

impl<S: StoreFacade> Resolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_threshold(store, DEFAULT_GATEWAY_QUERY_THRESHOLD)
    }

    pub fn with_threshold(store: Arc<S>, gateway_query_threshold: usize) -> Self {
        Self {
            store,
            gateway_query_threshold,
        }
    }

    /// Writes `gatewayKey(tenant, device) -> gatewayId`. Last-writer-wins,
    /// no version tracking.
    pub async fn set_last_known_gateway_for_device(
        &self,
        tenant: &TenantId,
        device: &DeviceId,
        gateway_id: &GatewayId,
        span: &tracing::Span,
    ) -> Result<()> {
        async {
            let key = codec::gateway_key(tenant, device)?;
            self.store
                .put(key, gateway_id.as_str().to_string())
                .await
                .map_err(RegistryError::internal)
        }
        .instrument(span.clone())
        .await
    }

    /// Reads `gatewayKey(tenant, device)`.
    pub async fn get_last_known_gateway_for_device(
        &self,
        tenant: &TenantId,
        device: &DeviceId,
        span: &tracing::Span,
    ) -> Result<GatewayResult> {
        async {
            let key = codec::gateway_key(tenant, device)?;
            let value = self.store.get(key).await.map_err(RegistryError::internal)?;
            value
                .map(|gateway_id| GatewayResult { gateway_id })
                .ok_or(RegistryError::NotFound)
        }
        .instrument(span.clone())
        .await
    }

    /// Unconditional put on `adapterKey(tenant, device)`.
    pub async fn set_command_handling_adapter_instance(
        &self,
        tenant: &TenantId,
        device: &DeviceId,
        adapter_instance_id: &AdapterInstanceId,
        span: &tracing::Span,
    ) -> Result<()> {
        async {
            let key = codec::adapter_key(tenant, device)?;
            self.store
                .put(key, adapter_instance_id.as_str().to_string())
                .await
                .map_err(RegistryError::internal)
        }
        .instrument(span.clone())
        .await
    }

    /// CAS remove: the only optimistic-concurrency point in the core.
    /// Succeeds only if the stored value still equals `adapter_instance_id`
    /// both at read time and at remove time.
    pub async fn remove_command_handling_adapter_instance(
        &self,
        tenant: &TenantId,
        device: &DeviceId,
        adapter_instance_id: &AdapterInstanceId,
        span: &tracing::Span,
    ) -> Result<()> {
        async {
            let key = codec::adapter_key(tenant, device)?;
            let current = self
                .store
                .get_with_version(key.clone())
                .await
                .map_err(RegistryError::internal)?;
            let (value, version) = current.ok_or(RegistryError::NotFound)?;
            if value != adapter_instance_id.as_str() {
                return Err(RegistryError::PreconditionFailed);
            }
            let removed = self
                .store
                .remove_with_version(key, version)
                .await
                .map_err(RegistryError::internal)?;
            if removed {
                Ok(())
            } else {
                // Entry was concurrently updated between the read and the remove.
                Err(RegistryError::PreconditionFailed)
            }
        }
        .instrument(span.clone())
        .await
    }

    /// The central algorithm: resolves which adapter instance(s) currently
    /// handle commands for `device`, considering the gateways it may be
    /// reached through. Dispatches on `via_gateways.len()` (spec §4.3).
    pub async fn get_command_handling_adapter_instances(
        &self,
        tenant: &TenantId,
        device: &DeviceId,
        via_gateways: &[GatewayId],
        span: &tracing::Span,
    ) -> Result<AdapterInstancesResult> {
        async {
            if via_gateways.is_empty() {
                self.resolve_device_only(tenant, device).await
            } else if via_gateways.len() <= self.gateway_query_threshold {
                self.query_all_then_precedence(tenant, device, via_gateways, true)
                    .await
            } else {
                self.resolve_last_known_first(tenant, device, via_gateways)
                    .await
            }
        }
        .instrument(span.clone())
        .await
    }

    /// Case A: no candidate gateways.
    async fn resolve_device_only(
        &self,
        tenant: &TenantId,
        device: &DeviceId,
    ) -> Result<AdapterInstancesResult> {
        let key = codec::adapter_key(tenant, device)?;
        match self.store.get(key).await.map_err(RegistryError::internal)? {
            Some(instance) => Ok(single_entry(device.as_str(), &instance)),
            None => Err(RegistryError::NotFound),
        }
    }

    /// Case C: large gateway set. Tries to answer from the last-known
    /// gateway alone (one `get` plus a 2-key `get_all`) before falling back
    /// to the full query-all-first strategy.
    async fn resolve_last_known_first(
        &self,
        tenant: &TenantId,
        device: &DeviceId,
        via_gateways: &[GatewayId],
    ) -> Result<AdapterInstancesResult> {
        let gateway_key = codec::gateway_key(tenant, device)?;
        let last_known = self
            .store
            .get(gateway_key)
            .await
            .map_err(RegistryError::internal)?
            .and_then(|raw| GatewayId::new(raw).ok());

        let Some(last_known) = last_known else {
            // No last-known gateway: it cannot help, go straight to the full query.
            return self
                .query_all_then_precedence(tenant, device, via_gateways, false)
                .await;
        };

        if !via_gateways.iter().any(|g| *g == last_known) {
            // Last-known gateway isn't one of the candidates for this device.
            return self
                .query_all_then_precedence(tenant, device, via_gateways, false)
                .await;
        }

        let keys = codec::adapter_keys_pair(tenant, device, &last_known)?;
        let mut found = self
            .store
            .get_all(keys)
            .await
            .map_err(RegistryError::internal)?;

        let device_key = codec::adapter_key(tenant, device)?;
        if let Some(instance) = found.remove(&device_key) {
            return Ok(single_entry(device.as_str(), &instance));
        }
        if !found.is_empty() {
            return Ok(entries_from_map(found));
        }

        // Neither the device nor the last-known gateway had an entry.
        // Fall back to the full query, without re-consulting last-known
        // (we already know it's a dead end).
        self.query_all_then_precedence(tenant, device, via_gateways, false)
            .await
    }

    /// Case B, and the fallback path of Case C: `get_all` over the device's
    /// own key plus every candidate gateway's key, then apply precedence.
    ///
    /// `allow_last_known_disambiguation` controls whether, on finding
    /// multiple gateway entries, this re-reads `gatewayKey` to narrow the
    /// result to a single entry (Case B step 4) or simply returns every
    /// entry found (Case C's fallbacks, which already know the last-known
    /// gateway is unusable or irrelevant).
    async fn query_all_then_precedence(
        &self,
        tenant: &TenantId,
        device: &DeviceId,
        via_gateways: &[GatewayId],
        allow_last_known_disambiguation: bool,
    ) -> Result<AdapterInstancesResult> {
        let keys = codec::adapter_keys_for_device_and_gateways(tenant, device, via_gateways)?;
        let mut found = self
            .store
            .get_all(keys)
            .await
            .map_err(RegistryError::internal)?;

        if found.is_empty() {
            return Err(RegistryError::NotFound);
        }

        let device_key = codec::adapter_key(tenant, device)?;
        if let Some(instance) = found.remove(&device_key) {
            return Ok(single_entry(device.as_str(), &instance));
        }

        if found.len() == 1 {
            return Ok(entries_from_map(found));
        }

        if !allow_last_known_disambiguation {
            return Ok(entries_from_map(found));
        }

        let gateway_key = codec::gateway_key(tenant, device)?;
        let last_known = self
            .store
            .get(gateway_key)
            .await
            .map_err(RegistryError::internal)?
            .and_then(|raw| GatewayId::new(raw).ok());

        let Some(last_known) = last_known else {
            return Ok(entries_from_map(found));
        };
        if !via_gateways.iter().any(|g| *g == last_known) {
            return Ok(entries_from_map(found));
        }

        let last_known_key = codec::adapter_key_for_gateway(tenant, &last_known)?;
        match found.remove(&last_known_key) {
            Some(instance) => Ok(single_entry(last_known.as_str(), &instance)),
            None => Ok(entries_from_map(found)),
        }
    }
}

fn single_entry(id: &str, adapter_instance_id: &str) -> AdapterInstancesResult {
    AdapterInstancesResult {
        adapter_instances: vec![AdapterInstanceEntry {
            device_id: id.to_string(),
            adapter_instance_id: adapter_instance_id.to_string(),
        }],
    }
}

fn entries_from_map(found: HashMap<String, String>) -> AdapterInstancesResult {
    let adapter_instances = found
        .into_iter()
        .filter_map(|(key, adapter_instance_id)| {
            codec::device_id_from_adapter_key(&key).map(|device_id| AdapterInstanceEntry {
                device_id: device_id.as_str().to_string(),
                adapter_instance_id,
            })
        })
        .collect();
    AdapterInstancesResult { adapter_instances }
}
