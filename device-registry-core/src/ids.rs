use std::fmt;

use crate::error::RegistryError;

/// Opaque, non-empty identifier. Equality is byte-exact.
///
/// `Tenant`, `Device`, `Gateway`, and `AdapterInstance` below are all thin
/// wrappers over this so that the resolver can't accidentally compare a
/// device id against a gateway id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct OpaqueId(String);

impl OpaqueId {
    pub fn new(raw: impl Into<String>) -> Result<Self, RegistryError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(RegistryError::InvalidArgument(
                "identifier must not be empty".to_string(),
            ));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OpaqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! opaque_id_wrapper {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(OpaqueId);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Result<Self, RegistryError> {
                Ok(Self(OpaqueId::new(raw)?))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0 .0
            }
        }
    };
}

opaque_id_wrapper!(TenantId, "Administrative isolation boundary; all keys are scoped by tenant.");
opaque_id_wrapper!(DeviceId, "An end-point that produces telemetry or consumes commands.");
opaque_id_wrapper!(
    GatewayId,
    "A device that relays traffic on behalf of one or more other devices. May equal a `DeviceId` when the device connects directly."
);
opaque_id_wrapper!(
    AdapterInstanceId,
    "A running protocol-adapter process that currently owns command handling for a device."
);
