use thiserror::Error;

/// Resolver-boundary error taxonomy (spec §7).
///
/// No error type from the underlying store is permitted to escape this
/// boundary: every store-layer failure is folded into [`RegistryError::Internal`],
/// with the original cause preserved for logging only.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A required mapping is absent (no gateway recorded, no adapter
    /// instance for a device or any of its gateways, ...).
    #[error("not found")]
    NotFound,

    /// A CAS remove saw a different value than claimed, or lost a race with
    /// a concurrent update.
    #[error("precondition failed")]
    PreconditionFailed,

    /// A required identifier was null/empty. Rejected before any store call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Any store-layer failure: transport, timeout, serialization. The
    /// cause is attached for logging, never surfaced in a structured result.
    #[error("internal error")]
    Internal {
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RegistryError {
    pub fn internal(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        RegistryError::Internal {
            cause: Box::new(cause),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
