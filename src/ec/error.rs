use crate::ec::transport::TransportError;

/// Errors that can occur while talking to the embedded controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EcError {
    /// Register does not support the requested access.
    #[error("register {addr:#06x} does not support this access")]
    Unsupported { addr: u16 },
    /// The EC did not answer, or is asleep while the map is cache-only.
    #[error("embedded controller unavailable")]
    DeviceUnavailable,
    /// Register content or a requested value has no known meaning.
    #[error("invalid register value")]
    Invalid,
    /// Replaying a cached write failed; remaining writes stay queued.
    #[error("failed to replay cached write to {addr:#06x}")]
    SyncFailure { addr: u16 },
    /// Restoring automatic fan control failed after a manual duty write failed.
    #[error("fan rollback to automatic mode failed")]
    RollbackFailed,
}

impl From<TransportError> for EcError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Unreachable => EcError::DeviceUnavailable,
        }
    }
}
