//! Setup-time error taxonomy.

use tether_proto::IdentityError;
use thiserror::Error;

/// Configuration mistakes detected before any network traffic.
///
/// Each aborts the operation that raised it and leaves the device unchanged;
/// none is fatal to the host process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `initialize` was called twice, or a channel was added afterwards.
    #[error("device already initialized")]
    AlreadyInitialized,
    /// The identity failed validation.
    #[error(transparent)]
    Identity(#[from] IdentityError),
    /// The server address has an empty host.
    #[error("server host must not be empty")]
    EmptyServer,
    /// The location id was zero.
    #[error("location id must not be zero")]
    InvalidLocation,
    /// The channel ceiling was reached.
    #[error("channel limit of {max} reached")]
    ChannelLimitExceeded {
        /// The ceiling that was hit.
        max: usize,
    },
}
