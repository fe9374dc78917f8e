//! Core domain logic for the device connection registry: identifier types,
//! the key-space codec, the store capability interface, wire-format
//! results, and the resolver that implements the selection algorithm.
//!
//! This crate has no knowledge of etcd, HTTP, or health-check wiring; those
//! live in `device-registry-store-etcd`, `device-registry-service`, and
//! `device-registry-health` respectively.

mod codec;
mod error;
mod health;
mod ids;
mod resolver;
mod result;
mod store;

pub use error::{RegistryError, Result};
pub use health::{HealthProbe, StoreHealthProbe};
pub use ids::{AdapterInstanceId, DeviceId, GatewayId, TenantId};
pub use resolver::{Resolver, DEFAULT_GATEWAY_QUERY_THRESHOLD};
pub use result::{AdapterInstanceEntry, AdapterInstancesResult, GatewayResult};
pub use store::{BackendStats, StoreError, StoreFacade, StoreResult, Version};
