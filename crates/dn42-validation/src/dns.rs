//! DNS collaborator used to check WireGuard endpoints.

use std::fmt;
use std::net::IpAddr;

use thiserror::Error;

/// Address record types the endpoint check asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// IPv6 address record.
    Aaaa,
    /// IPv4 address record.
    A,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aaaa => f.write_str("AAAA"),
            Self::A => f.write_str("A"),
        }
    }
}

/// A resolver failure that is not simply "no such record".
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The query timed out.
    #[error("query timed out")]
    Timeout,

    /// The resolver could not talk to any name server.
    #[error("resolver I/O error: {0}")]
    Io(String),

    /// The resolver could not be configured.
    #[error("resolver configuration error: {0}")]
    Config(String),
}

/// Hostname resolution.
///
/// An empty list means the name has no record of that type.
pub trait DnsResolver {
    /// Resolve `host` for one record type.
    fn resolve(&self, host: &str, kind: RecordKind) -> Result<Vec<IpAddr>, ResolveError>;
}

impl<D: DnsResolver + ?Sized> DnsResolver for &D {
    fn resolve(&self, host: &str, kind: RecordKind) -> Result<Vec<IpAddr>, ResolveError> {
        (**self).resolve(host, kind)
    }
}

/// A resolver that knows no names; only IP literal endpoints pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl DnsResolver for NoResolver {
    fn resolve(&self, _host: &str, _kind: RecordKind) -> Result<Vec<IpAddr>, ResolveError> {
        Ok(Vec::new())
    }
}
