use std::env;
use std::io::{self, Read, Write};
use std::net::TcpStream;

use crate::proto::SectorBuf;

/// Fallback controller address when nothing is configured.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 19876;

/// Environment overrides, read once at boot.
pub const ADDRESS_ENV: &str = "RFS_ADDRESS";
pub const PORT_ENV: &str = "RFS_PORT";

/// Where the storage controller listens.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub address: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self { address: address.into(), port }
    }

    /// Endpoint from the environment, if one was configured there.
    pub fn from_env() -> Option<Self> {
        let address = env::var(ADDRESS_ENV).ok()?;
        let port = env::var(PORT_ENV)
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        Some(Self { address, port })
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS, DEFAULT_PORT)
    }
}

/// The one connection to the storage controller.
///
/// Every call is blocking and synchronous: the register goes out, the
/// response register comes back, payloads ride directly behind their
/// register. A short read or write is a hard failure, never retried.
#[derive(Debug, Default)]
pub struct Transport {
    stream: Option<TcpStream>,
}

impl Transport {
    pub fn new() -> Self {
        Self { stream: None }
    }

    /// Establish the connection. Only the mount path calls this.
    pub fn connect(&mut self, endpoint: &Endpoint) -> io::Result<()> {
        let stream = TcpStream::connect((endpoint.address.as_str(), endpoint.port))?;
        self.stream = Some(stream);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// One register round-trip with optional payloads.
    ///
    /// Registers travel in network byte order. `send` is written after the
    /// request register (write op); `recv` is filled after the response
    /// register (read op).
    pub fn call(
        &mut self,
        register: u64,
        send: Option<&SectorBuf>,
        recv: Option<&mut SectorBuf>,
    ) -> io::Result<u64> {
        let stream = self.stream.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "no controller connection")
        })?;

        stream.write_all(&register.to_be_bytes())?;
        if let Some(payload) = send {
            stream.write_all(payload)?;
        }

        let mut response = [0u8; 8];
        stream.read_exact(&mut response)?;
        if let Some(payload) = recv {
            stream.read_exact(payload)?;
        }
        Ok(u64::from_be_bytes(response))
    }

    /// Drop the connection so no call can reuse a dead stream.
    pub fn disconnect(&mut self) {
        self.stream = None;
    }
}
