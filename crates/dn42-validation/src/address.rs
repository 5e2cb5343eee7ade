//! Tunnel address validation.
//!
//! Addresses may be written as a bare IP or as a prefix; host bits are
//! allowed in prefixes (`172.20.1.1/24` is accepted and treated as
//! `172.20.1.0/24` for the containment check).

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ValidationConfig;
use crate::error::{ValidationError, ValidationErrorKind};
use crate::record::render;

/// An address family a field or session refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    /// IPv4.
    Ipv4,
    /// IPv6.
    Ipv6,
}

impl AddressFamily {
    /// Both families, in rule order.
    pub const ALL: [Self; 2] = [Self::Ipv4, Self::Ipv6];

    /// The tag used for this family in records (`ipv4` / `ipv6`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
        }
    }

    /// The name used in messages (`IPv4` / `IPv6`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ipv4 => "IPv4",
            Self::Ipv6 => "IPv6",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ipv4" => Ok(Self::Ipv4),
            "ipv6" => Ok(Self::Ipv6),
            other => Err(format!("unknown address family '{other}'")),
        }
    }
}

/// Parse an address or prefix without requiring network alignment.
///
/// A bare address becomes a host prefix (`/32` or `/128`).
#[must_use]
pub fn parse_address_or_prefix(input: &str) -> Option<IpNet> {
    if let Ok(net) = input.parse::<IpNet>() {
        return Some(net);
    }
    input.parse::<IpAddr>().ok().map(IpNet::from)
}

/// Validate a tunnel address against a family and the configured blocks.
///
/// Returns `None` when the address is acceptable.
#[must_use]
pub fn validate_ip(
    config: &ValidationConfig,
    address: &Value,
    family: AddressFamily,
    field: &str,
) -> Option<ValidationError> {
    let written = render(address);
    let Some(net) = address.as_str().and_then(parse_address_or_prefix) else {
        return Some(ValidationError::new(
            field,
            ValidationErrorKind::InvalidAddress { value: written },
        ));
    };

    let wrong_family = || {
        ValidationError::new(
            field,
            ValidationErrorKind::WrongFamily {
                value: written.clone(),
                family,
            },
        )
    };

    match (family, net.trunc()) {
        (AddressFamily::Ipv4, IpNet::V4(v4)) => {
            if config.ipv4_block.contains(&v4) {
                None
            } else {
                Some(ValidationError::new(
                    field,
                    ValidationErrorKind::OutOfBlock {
                        value: written.clone(),
                        allowed: config.ipv4_block.to_string(),
                    },
                ))
            }
        }
        (AddressFamily::Ipv6, IpNet::V6(v6)) => {
            if config.link_local.contains(&v6) || config.ipv6_block.contains(&v6) {
                None
            } else {
                Some(ValidationError::new(
                    field,
                    ValidationErrorKind::OutOfBlock {
                        value: written.clone(),
                        allowed: config.ipv6_allowed(),
                    },
                ))
            }
        }
        _ => Some(wrong_family()),
    }
}
