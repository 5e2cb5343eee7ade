//! Peer name and ASN rules.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{ValidationError, ValidationErrorKind};
use crate::record::render;
use crate::registry::{AsnCache, AsnRegistry, RegistryError};

/// Pattern peer names must match.
pub const NAME_PATTERN: &str = "^[A-Z][A-Z0-9-_]+$";

/// Regex for valid peer names (uppercase start, then uppercase/digits/`-`/`_`).
static NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9_-]+$").unwrap_or_else(|_| unreachable!()));

/// Validate a peer name.
///
/// Anything other than a string matching [`NAME_PATTERN`] is rejected.
#[must_use]
pub fn validate_name(name: &Value) -> Option<ValidationError> {
    match name.as_str() {
        Some(s) if NAME_REGEX.is_match(s) => None,
        _ => Some(ValidationError::invalid_format(
            "name",
            render(name),
            NAME_PATTERN,
        )),
    }
}

/// Registry token for an ASN (`AS<number>`).
#[must_use]
pub fn asn_token(asn: impl std::fmt::Display) -> String {
    format!("AS{asn}")
}

/// Validate that an ASN is registered.
///
/// The registry snapshot is taken from `cache`, fetching it through
/// `registry` the first time. A registry failure is returned as `Err`, never
/// as a finding.
pub fn validate_asn<R: AsnRegistry + ?Sized>(
    asn: &Value,
    cache: &AsnCache,
    registry: &R,
) -> Result<Option<ValidationError>, RegistryError> {
    let Some(number) = asn.as_number().filter(|n| n.is_i64() || n.is_u64()) else {
        return Ok(Some(ValidationError::new(
            "asn",
            ValidationErrorKind::NotAnInteger,
        )));
    };

    let asns = cache.get_or_fetch(registry)?;
    if asns.contains(&asn_token(number)) {
        Ok(None)
    } else {
        Ok(Some(ValidationError::new(
            "asn",
            ValidationErrorKind::UnregisteredAsn {
                asn: number.to_string(),
            },
        )))
    }
}
