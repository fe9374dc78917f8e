//! Structured results returned by the resolver's public operations (spec §6).

use serde::{Deserialize, Serialize};

/// Result of [`crate::resolver::Resolver::get_last_known_gateway_for_device`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayResult {
    #[serde(rename = "gateway-id")]
    pub gateway_id: String,
}

/// One element of [`AdapterInstancesResult`]. Note that `device_id` holds a
/// gateway's id when the mapping was resolved through a gateway entry:
/// this mirrors the wire contract in spec §6 exactly (the field is always
/// named `device-id` regardless of whether the entry was keyed by the
/// device itself or by one of its gateways).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterInstanceEntry {
    #[serde(rename = "device-id")]
    pub device_id: String,
    #[serde(rename = "adapter-instance-id")]
    pub adapter_instance_id: String,
}

/// Result of [`crate::resolver::Resolver::get_command_handling_adapter_instances`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterInstancesResult {
    #[serde(rename = "adapter-instances")]
    pub adapter_instances: Vec<AdapterInstanceEntry>,
}
