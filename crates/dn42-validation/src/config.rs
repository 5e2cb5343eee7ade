//! Allocation blocks the address rules check against.

use std::net::{Ipv4Addr, Ipv6Addr};

use ipnet::{Ipv4Net, Ipv6Net};
use serde::{Deserialize, Serialize};

/// DN42 IPv4 allocation block (172.20.0.0/14).
#[must_use]
pub fn default_ipv4_block() -> Ipv4Net {
    Ipv4Net::new(Ipv4Addr::new(172, 20, 0, 0), 14).unwrap_or_else(|_| unreachable!())
}

/// Unique local IPv6 block (fc00::/7).
#[must_use]
pub fn default_ipv6_block() -> Ipv6Net {
    Ipv6Net::new(Ipv6Addr::new(0xfc00, 0, 0, 0, 0, 0, 0, 0), 7).unwrap_or_else(|_| unreachable!())
}

/// IPv6 link-local scope (fe80::/10).
#[must_use]
pub fn link_local_block() -> Ipv6Net {
    Ipv6Net::new(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0), 10).unwrap_or_else(|_| unreachable!())
}

/// Address ranges peers may use for tunnel addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Block every IPv4 tunnel address must fall within.
    pub ipv4_block: Ipv4Net,
    /// Block every non-link-local IPv6 tunnel address must fall within.
    pub ipv6_block: Ipv6Net,
    /// Link-local scope accepted for IPv6 tunnel addresses.
    pub link_local: Ipv6Net,
}

impl ValidationConfig {
    /// Create a configuration with the DN42 defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ipv4_block: default_ipv4_block(),
            ipv6_block: default_ipv6_block(),
            link_local: link_local_block(),
        }
    }

    /// Replace the IPv4 allocation block.
    #[must_use]
    pub const fn with_ipv4_block(mut self, block: Ipv4Net) -> Self {
        self.ipv4_block = block;
        self
    }

    /// Replace the IPv6 allocation block.
    #[must_use]
    pub const fn with_ipv6_block(mut self, block: Ipv6Net) -> Self {
        self.ipv6_block = block;
        self
    }

    /// Human description of where IPv6 addresses may come from.
    #[must_use]
    pub fn ipv6_allowed(&self) -> String {
        format!("{} or {}", self.link_local, self.ipv6_block)
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::new()
    }
}
