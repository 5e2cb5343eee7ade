//! System DNS resolver for endpoint checks.

use std::fmt;
use std::net::IpAddr;

use dn42_validation::{DnsResolver, RecordKind, ResolveError};
use hickory_resolver::Resolver;
use once_cell::unsync::OnceCell;
use tracing::{debug, warn};

use crate::error::classify_resolve;

/// Resolver backed by the host's DNS configuration.
///
/// The underlying resolver is built on first use, so runs without hostname
/// endpoints never read the system configuration.
#[derive(Default)]
pub struct SystemResolver {
    resolver: OnceCell<Resolver>,
}

impl SystemResolver {
    /// Create a resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn resolver(&self) -> Result<&Resolver, ResolveError> {
        self.resolver.get_or_try_init(|| {
            debug!("loading system resolver configuration");
            Resolver::from_system_conf().map_err(|e| ResolveError::Config(e.to_string()))
        })
    }
}

impl fmt::Debug for SystemResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemResolver")
            .field("initialized", &self.resolver.get().is_some())
            .finish()
    }
}

impl DnsResolver for SystemResolver {
    fn resolve(&self, host: &str, kind: RecordKind) -> Result<Vec<IpAddr>, ResolveError> {
        let resolver = self.resolver()?;
        let found = match kind {
            RecordKind::Aaaa => resolver
                .ipv6_lookup(host)
                .map(|lookup| lookup.iter().map(|r| IpAddr::V6(r.0)).collect()),
            RecordKind::A => resolver
                .ipv4_lookup(host)
                .map(|lookup| lookup.iter().map(|r| IpAddr::V4(r.0)).collect()),
        };

        match found {
            Ok(addrs) => Ok(addrs),
            Err(err) => match classify_resolve(&err) {
                Some(failure) => {
                    warn!(host, record = %kind, error = %err, "DNS lookup failed");
                    Err(failure)
                }
                None => {
                    debug!(host, record = %kind, error = %err, "no record");
                    Ok(Vec::new())
                }
            },
        }
    }
}
