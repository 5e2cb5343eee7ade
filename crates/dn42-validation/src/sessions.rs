//! Session list rules.

use serde_json::Value;

use crate::address::AddressFamily;
use crate::error::{ValidationError, ValidationErrorKind};
use crate::record::{render, PeerField, PeerRecord};

const FIELD: &str = "sessions";

/// Whether a session list value declares `family`.
///
/// Returns `None` if the value is not a list.
#[must_use]
pub fn declares(sessions: &Value, family: AddressFamily) -> Option<bool> {
    sessions
        .as_array()
        .map(|items| items.iter().any(|item| item.as_str() == Some(family.as_str())))
}

/// Validate a `sessions` value against the peer it belongs to.
///
/// A non-list value or a list without any known family yields a single
/// finding. Otherwise each declared family must have its address field
/// present on the peer.
#[must_use]
pub fn validate_sessions(sessions: &Value, peer: &PeerRecord) -> Vec<ValidationError> {
    if !sessions.is_array() {
        return vec![ValidationError::new(
            FIELD,
            ValidationErrorKind::NotAList {
                value: render(sessions),
            },
        )];
    }

    let declared: Vec<AddressFamily> = AddressFamily::ALL
        .into_iter()
        .filter(|family| declares(sessions, *family) == Some(true))
        .collect();

    if declared.is_empty() {
        return vec![ValidationError::new(
            FIELD,
            ValidationErrorKind::NoAddressFamily {
                value: render(sessions),
            },
        )];
    }

    declared
        .into_iter()
        .filter(|family| !peer.has(address_field(*family)))
        .map(|family| {
            ValidationError::new(family.as_str(), ValidationErrorKind::SessionAddressMissing)
        })
        .collect()
}

/// The peer field holding the tunnel address for a family.
#[must_use]
pub const fn address_field(family: AddressFamily) -> PeerField {
    match family {
        AddressFamily::Ipv4 => PeerField::Ipv4,
        AddressFamily::Ipv6 => PeerField::Ipv6,
    }
}
