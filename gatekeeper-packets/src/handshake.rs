use std::net::IpAddr;
use tokio::time::Instant;

/// Opaque identifier for a connection's origin.
///
/// Equality and hashing are order-independent of how the address was obtained (direct
/// socket peer address or a PROXY-protocol-forwarded address); only the IP participates,
/// matching how [`crate::handshake::Handshake::source`] is used as the admission unit
/// throughout the core (a single IP, not `ip:port`, is what gets rate-limited and blacklisted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceAddress(IpAddr);

impl SourceAddress {
    pub fn new(ip: IpAddr) -> Self {
        Self(ip)
    }

    pub fn ip(&self) -> IpAddr {
        self.0
    }
}

impl From<IpAddr> for SourceAddress {
    fn from(ip: IpAddr) -> Self {
        Self(ip)
    }
}

impl std::fmt::Display for SourceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The initial protocol message identifying a client before encryption/auth, as handed to
/// the admission controller by the protocol layer.
#[derive(Debug, Clone)]
pub struct Handshake {
    pub username: String,
    pub source: SourceAddress,
    pub protocol_version: i32,
    pub arrival: Instant,
}

impl Handshake {
    pub fn new(username: impl Into<String>, source: SourceAddress, protocol_version: i32) -> Self {
        Self {
            username: username.into(),
            source,
            protocol_version,
            arrival: Instant::now(),
        }
    }
}
