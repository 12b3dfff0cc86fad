//! Device identity, location credentials, and server addressing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DEFAULT_PORT, GUID_SIZE, MAC_SIZE};

/// Errors detected while validating a device identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The GUID contained only zero bytes.
    #[error("device GUID must contain at least one non-zero byte")]
    ZeroGuid,
}

/// Immutable identity a device presents at registration.
///
/// Constructed once before [`initialize`] and never changed afterwards.
/// `name` and `software_version` carry sensible defaults and can be
/// overridden with the builder-style setters.
///
/// [`initialize`]: https://docs.rs/tether-core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Globally unique device identifier.
    pub guid: [u8; GUID_SIZE],
    /// Hardware address reported to the network layer.
    pub mac: [u8; MAC_SIZE],
    /// Human-readable device name shown in the cloud console.
    pub name: String,
    /// Software revision string reported at registration.
    pub software_version: String,
}

impl DeviceIdentity {
    /// Creates an identity with the default name and software version.
    pub fn new(guid: [u8; GUID_SIZE], mac: [u8; MAC_SIZE]) -> Self {
        Self {
            guid,
            mac,
            name: "TETHER".to_owned(),
            software_version: "1.0".to_owned(),
        }
    }

    /// Overrides the device name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Overrides the reported software version.
    #[must_use]
    pub fn with_software_version(mut self, version: impl Into<String>) -> Self {
        self.software_version = version.into();
        self
    }

    /// Checks the invariants a registration-capable identity must hold.
    ///
    /// # Errors
    /// Returns [`IdentityError::ZeroGuid`] for an all-zero GUID.
    pub fn validate(&self) -> Result<(), IdentityError> {
        if self.guid.iter().all(|b| *b == 0) {
            return Err(IdentityError::ZeroGuid);
        }
        Ok(())
    }
}

/// Location credentials authorizing a device to register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Identifier of the location the device belongs to. Never zero.
    pub location_id: u32,
    /// Password of that location.
    pub location_password: String,
}

impl Credentials {
    /// Creates credentials for the given location.
    pub fn new(location_id: u32, location_password: impl Into<String>) -> Self {
        Self { location_id, location_password: location_password.into() }
    }
}

/// Address of the cloud endpoint the device connects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAddr {
    /// Host name or IP address.
    pub host: String,
    /// TCP port, [`DEFAULT_PORT`] unless overridden.
    pub port: u16,
}

impl ServerAddr {
    /// Creates an address on the default protocol port.
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into(), port: DEFAULT_PORT }
    }

    /// Overrides the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}
