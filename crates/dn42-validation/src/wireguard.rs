//! WireGuard tunnel descriptor rules.

use std::net::IpAddr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::dns::{DnsResolver, RecordKind};
use crate::error::{CollaboratorError, ValidationError, ValidationErrorKind};
use crate::record::{render, WireGuardDescriptor};

/// Regex for WireGuard public keys: 32 bytes of canonical base64.
///
/// The 43rd character only carries 4 significant bits, so it must be one of
/// the 16 characters whose low 2 bits are zero.
static PUBLIC_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9+/]{42}[AEIMQUYcgkosw480]=$").unwrap_or_else(|_| unreachable!())
});

const FIELD: &str = "wireguard";
const REMOTE_ADDRESS: &str = "wireguard.remote_address";
const REMOTE_PORT: &str = "wireguard.remote_port";
const PUBLIC_KEY: &str = "wireguard.public_key";

/// Whether `key` is a well-formed WireGuard public key.
#[must_use]
pub fn is_public_key(key: &str) -> bool {
    PUBLIC_KEY_REGEX.is_match(key)
}

/// Validate a `wireguard` descriptor.
///
/// A value that is not a mapping yields a single finding. Otherwise every
/// applicable finding is returned. DNS infrastructure failures while
/// resolving `remote_address` are returned as `Err`.
pub fn validate_wireguard<D: DnsResolver + ?Sized>(
    descriptor: &Value,
    dns: &D,
) -> Result<Vec<ValidationError>, CollaboratorError> {
    let Some(wg) = WireGuardDescriptor::from_value(descriptor) else {
        return Ok(vec![ValidationError::new(
            FIELD,
            ValidationErrorKind::NotAMapping {
                value: render(descriptor),
            },
        )]);
    };

    let mut errors = Vec::new();

    if let Some(address) = wg.remote_address() {
        if wg.remote_port().is_none() {
            errors.push(ValidationError::required_with(REMOTE_PORT, "remote_address"));
        }
        if !endpoint_resolves(address, dns)? {
            errors.push(ValidationError::new(
                REMOTE_ADDRESS,
                ValidationErrorKind::Unresolvable,
            ));
        }
    }

    if let Some(port) = wg.remote_port() {
        if wg.remote_address().is_none() {
            errors.push(ValidationError::required_with(REMOTE_ADDRESS, "remote_port"));
        }
        errors.extend(validate_port(port));
    }

    match wg.public_key() {
        None => errors.push(ValidationError::missing_key(PUBLIC_KEY)),
        Some(key) => {
            if !key.as_str().is_some_and(is_public_key) {
                errors.push(ValidationError::new(
                    PUBLIC_KEY,
                    ValidationErrorKind::InvalidPublicKey,
                ));
            }
        }
    }

    Ok(errors)
}

/// Check a `remote_port` value: an integer in 1-65535.
fn validate_port(port: &Value) -> Option<ValidationError> {
    let Some(number) = port.as_number().filter(|n| n.is_i64() || n.is_u64()) else {
        return Some(ValidationError::new(
            REMOTE_PORT,
            ValidationErrorKind::NotAnInteger,
        ));
    };
    match number.as_u64() {
        Some(1..=65535) => None,
        _ => Some(ValidationError::new(
            REMOTE_PORT,
            ValidationErrorKind::PortOutOfRange,
        )),
    }
}

/// Whether an endpoint is an IP literal or has an AAAA or A record.
fn endpoint_resolves<D: DnsResolver + ?Sized>(
    address: &Value,
    dns: &D,
) -> Result<bool, CollaboratorError> {
    let Some(host) = address.as_str() else {
        return Ok(false);
    };
    if host.parse::<IpAddr>().is_ok() {
        return Ok(true);
    }

    for kind in [RecordKind::Aaaa, RecordKind::A] {
        let found = dns
            .resolve(host, kind)
            .map_err(|source| CollaboratorError::Dns {
                host: host.to_string(),
                source,
            })?;
        debug!(host, record = %kind, count = found.len(), "resolved endpoint");
        if !found.is_empty() {
            return Ok(true);
        }
    }
    Ok(false)
}
