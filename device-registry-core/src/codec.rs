//! Encodes (tenant, device) pairs into the two disjoint flat key-spaces used
//! by the store: gateway-of-device and adapter-instance-of-device.

use std::collections::HashSet;

use crate::error::RegistryError;
use crate::ids::{DeviceId, GatewayId, TenantId};

/// Separator between key segments. Chosen so that tenant and device ids are
/// not expected to contain it in practice; this codec forbids it outright
/// (see the "SEP collisions" open question in the spec: decoding a device
/// id back out of an adapter key only works if the separator cannot appear
/// inside an id).
pub const SEP: &str = "@@";

const GATEWAY_PREFIX: &str = "gw";
const ADAPTER_PREFIX: &str = "ai";

fn reject_separator(label: &str, value: &str) -> Result<(), RegistryError> {
    if value.contains(SEP) {
        return Err(RegistryError::InvalidArgument(format!(
            "{label} must not contain the key separator {SEP:?}"
        )));
    }
    Ok(())
}

/// `"gw" SEP tenant SEP device"`
pub fn gateway_key(tenant: &TenantId, device: &DeviceId) -> Result<String, RegistryError> {
    reject_separator("tenant", tenant.as_str())?;
    reject_separator("device", device.as_str())?;
    Ok(format!("{GATEWAY_PREFIX}{SEP}{tenant}{SEP}{device}"))
}

/// `"ai" SEP tenant SEP device"`
pub fn adapter_key(tenant: &TenantId, device: &DeviceId) -> Result<String, RegistryError> {
    reject_separator("tenant", tenant.as_str())?;
    reject_separator("device", device.as_str())?;
    Ok(format!("{ADAPTER_PREFIX}{SEP}{tenant}{SEP}{device}"))
}

/// Adapter key for a gateway acting as the device-slot of the mapping (same
/// key shape as `adapter_key`, keyed by the gateway's id instead).
pub fn adapter_key_for_gateway(
    tenant: &TenantId,
    gateway: &GatewayId,
) -> Result<String, RegistryError> {
    reject_separator("tenant", tenant.as_str())?;
    reject_separator("gateway", gateway.as_str())?;
    Ok(format!("{ADAPTER_PREFIX}{SEP}{tenant}{SEP}{gateway}"))
}

/// Two-element set: the adapter keys for `device_a` and `device_b`.
///
/// Used by the large-gateway-set strategy (spec §4.3 Case C) to query just
/// the device's own key plus the last-known gateway's key in one round trip.
pub fn adapter_keys_pair(
    tenant: &TenantId,
    device_a: &DeviceId,
    gateway_b: &GatewayId,
) -> Result<HashSet<String>, RegistryError> {
    let mut set = HashSet::with_capacity(2);
    set.insert(adapter_key(tenant, device_a)?);
    set.insert(adapter_key_for_gateway(tenant, gateway_b)?);
    Ok(set)
}

/// Set of size `gateways.len() + 1`: the device's own adapter key plus one
/// adapter key per candidate gateway.
pub fn adapter_keys_for_device_and_gateways(
    tenant: &TenantId,
    device: &DeviceId,
    gateways: &[GatewayId],
) -> Result<HashSet<String>, RegistryError> {
    let mut set = HashSet::with_capacity(gateways.len() + 1);
    set.insert(adapter_key(tenant, device)?);
    for gateway in gateways {
        set.insert(adapter_key_for_gateway(tenant, gateway)?);
    }
    Ok(set)
}

/// The substring after the last occurrence of [`SEP`] in a key. Works for
/// both device-self adapter keys and gateway adapter keys, since they share
/// the same `"ai" SEP tenant SEP <id>"` shape.
///
/// Only meaningful for keys this codec produced within a single request;
/// tenant ids containing `SEP` are not recoverable this way, which is why
/// this codec rejects `SEP` in tenant/device ids at construction instead of
/// trying to escape it.
pub fn trailing_id(key: &str) -> Option<&str> {
    key.rsplit(SEP).next()
}

/// The substring after the last occurrence of [`SEP`] in an adapter key.
pub fn device_id_from_adapter_key(key: &str) -> Option<DeviceId> {
    DeviceId::new(trailing_id(key)?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant(s: &str) -> TenantId {
        TenantId::new(s).unwrap()
    }
    fn device(s: &str) -> DeviceId {
        DeviceId::new(s).unwrap()
    }
    fn gateway(s: &str) -> GatewayId {
        GatewayId::new(s).unwrap()
    }

    #[test]
    fn gateway_and_adapter_keys_are_disjoint() {
        let t = tenant("T1");
        let d = device("dev-1");
        assert_ne!(gateway_key(&t, &d).unwrap(), adapter_key(&t, &d).unwrap());
    }

    #[test]
    fn round_trips_device_id() {
        let t = tenant("T1");
        let d = device("dev-1");
        let key = adapter_key(&t, &d).unwrap();
        assert_eq!(key, "ai@@T1@@dev-1");
        assert_eq!(device_id_from_adapter_key(&key).unwrap(), d);
    }

    #[test]
    fn rejects_separator_in_ids() {
        let t = tenant("T1");
        let d = DeviceId::new(format!("dev{SEP}evil")).unwrap();
        assert!(matches!(
            adapter_key(&t, &d),
            Err(RegistryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn pair_and_set_helpers_produce_expected_sizes() {
        let t = tenant("T1");
        let d = device("dev-1");
        let g = gateway("gw-1");
        assert_eq!(adapter_keys_pair(&t, &d, &g).unwrap().len(), 2);

        let gateways = vec![gateway("gw-1"), gateway("gw-2"), gateway("gw-3")];
        let keys = adapter_keys_for_device_and_gateways(&t, &d, &gateways).unwrap();
        assert_eq!(keys.len(), 4);
    }
}
