//! Version-fallback attach
//!
//! Candidates are tried in order; the first one that accepts wins and no later
//! candidate is contacted. There is no backoff: a refused local connection is not
//! a transient fault.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::client::{DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_IO_TIMEOUT_MS, DEFAULT_PORT};
use crate::{Automation, ConnectClient, ConnectError, Result, StkVersion};

/// Something that can open an automation handle for a given application version
pub trait Connector {
    type Handle: Automation;

    fn attach(&self, version: StkVersion) -> Result<Self::Handle>;
}

/// Attach to the first candidate version that accepts
pub fn attach_first<C: Connector>(
    connector: &C,
    candidates: &[StkVersion],
) -> Result<(StkVersion, C::Handle)> {
    let mut tried = Vec::with_capacity(candidates.len());

    for &version in candidates {
        match connector.attach(version) {
            Ok(handle) => {
                info!("Attached to STK {}", version);
                return Ok((version, handle));
            }
            Err(e) => {
                warn!("STK {} not available: {}", version, e);
                tried.push(version);
            }
        }
    }

    Err(ConnectError::NoSupportedVersion { tried })
}

/// Ask the handle for its version and require the expected major version
pub fn verify_version<A: Automation>(handle: &mut A, expected: StkVersion) -> Result<()> {
    let reported = handle.version()?;
    if expected.matches(&reported) {
        Ok(())
    } else {
        Err(ConnectError::VersionMismatch { expected, reported })
    }
}

/// Where a given application version listens for Connect sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub version: StkVersion,
    pub address: String,
}

impl Endpoint {
    pub fn local(version: StkVersion) -> Self {
        Self {
            version,
            address: format!("127.0.0.1:{}", DEFAULT_PORT),
        }
    }
}

/// Opens [`ConnectClient`] sessions and checks the reported version
#[derive(Debug, Clone)]
pub struct TcpConnector {
    endpoints: Vec<Endpoint>,
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl TcpConnector {
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self {
            endpoints,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            io_timeout: Duration::from_millis(DEFAULT_IO_TIMEOUT_MS),
        }
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Versions in endpoint order
    pub fn versions(&self) -> Vec<StkVersion> {
        self.endpoints.iter().map(|e| e.version).collect()
    }
}

impl Connector for TcpConnector {
    type Handle = ConnectClient;

    fn attach(&self, version: StkVersion) -> Result<ConnectClient> {
        let endpoint = self
            .endpoints
            .iter()
            .find(|e| e.version == version)
            .ok_or_else(|| {
                ConnectError::InvalidArgument(format!("no endpoint configured for STK {}", version))
            })?;

        let mut client =
            ConnectClient::connect(&endpoint.address, self.connect_timeout, self.io_timeout)?;
        verify_version(&mut client, version)?;
        Ok(client)
    }
}
