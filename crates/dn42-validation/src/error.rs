//! Validation findings and collaborator failures.
//!
//! A [`ValidationError`] is a finding about a peer record: it is collected
//! into an ordered list and never used for control flow. A
//! [`CollaboratorError`] is an infrastructure fault (registry or DNS
//! unreachable) and is returned through `Result` to the caller.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::address::AddressFamily;
use crate::dns::ResolveError;
use crate::registry::RegistryError;

/// Broad classification of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// A required field is missing or has the wrong type.
    Structural,
    /// A value does not match its required pattern.
    Format,
    /// A value is outside its allowed range or set (CIDR block, port bounds,
    /// registry membership, DNS resolvability).
    Membership,
    /// A constraint spanning several peers of one router was violated.
    CrossRecord,
}

/// The kind of validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A required top-level field is absent.
    Missing,
    /// Neither this field nor its alternative is present.
    MissingEither {
        /// The alternative field.
        other: String,
    },
    /// A required key inside a nested descriptor is absent.
    MissingKey,
    /// The field must be present because a sibling key is.
    RequiredWith {
        /// The sibling key that makes this one mandatory.
        other: String,
    },
    /// The value is not an integer.
    NotAnInteger,
    /// The value is not exactly `true` or `false`.
    NotBoolean {
        /// Rendered value.
        value: String,
    },
    /// The value is not a list.
    NotAList {
        /// Rendered value.
        value: String,
    },
    /// The value is not a mapping.
    NotAMapping {
        /// Rendered value.
        value: String,
    },
    /// The value does not match the required pattern.
    InvalidFormat {
        /// Rendered value.
        value: String,
        /// The pattern the value must match.
        pattern: String,
    },
    /// The value is not a WireGuard public key.
    InvalidPublicKey,
    /// The value is neither an IP address nor a prefix.
    InvalidAddress {
        /// Rendered value.
        value: String,
    },
    /// The address belongs to the other address family.
    WrongFamily {
        /// Rendered value.
        value: String,
        /// The family the field requires.
        family: AddressFamily,
    },
    /// The address lies outside every allowed block.
    OutOfBlock {
        /// Rendered value.
        value: String,
        /// Human description of the allowed blocks.
        allowed: String,
    },
    /// The port is outside 1-65535.
    PortOutOfRange,
    /// The endpoint is neither an IP literal nor a name with A/AAAA records.
    Unresolvable,
    /// The ASN is not present in the registry.
    UnregisteredAsn {
        /// The ASN as written in the record.
        asn: String,
    },
    /// The session list names no known address family.
    NoAddressFamily {
        /// Rendered value.
        value: String,
    },
    /// A session is declared for this family but the address is absent.
    SessionAddressMissing,
    /// Something this field depends on is missing.
    RequiredFor {
        /// The missing requirement, as written in the message.
        requirement: String,
    },
    /// Something that conflicts with this field is present.
    ForbiddenWith {
        /// The conflicting item, as written in the message.
        item: String,
    },
    /// The address is used by more than one peer of the router.
    Duplicate,
}

/// A single validation finding, attributed to a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the field the finding is about.
    pub field: String,
    /// What is wrong with it.
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    /// Create a "must exist" error for a top-level field.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, ValidationErrorKind::Missing)
    }

    /// Create a "must exist" error for a nested key.
    #[must_use]
    pub fn missing_key(field: impl Into<String>) -> Self {
        Self::new(field, ValidationErrorKind::MissingKey)
    }

    /// Create a "must exist when `other` defined" error.
    #[must_use]
    pub fn required_with(field: impl Into<String>, other: impl Into<String>) -> Self {
        Self::new(
            field,
            ValidationErrorKind::RequiredWith {
                other: other.into(),
            },
        )
    }

    /// Create an "invalid format" error.
    #[must_use]
    pub fn invalid_format(
        field: impl Into<String>,
        value: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        Self::new(
            field,
            ValidationErrorKind::InvalidFormat {
                value: value.into(),
                pattern: pattern.into(),
            },
        )
    }

    /// Create a "not true or false" error.
    #[must_use]
    pub fn not_boolean(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            field,
            ValidationErrorKind::NotBoolean {
                value: value.into(),
            },
        )
    }

    /// Create a "required for" error.
    #[must_use]
    pub fn required_for(field: impl Into<String>, requirement: impl Into<String>) -> Self {
        Self::new(
            field,
            ValidationErrorKind::RequiredFor {
                requirement: requirement.into(),
            },
        )
    }

    /// Create a "must not exist with" error.
    #[must_use]
    pub fn forbidden_with(field: impl Into<String>, item: impl Into<String>) -> Self {
        Self::new(field, ValidationErrorKind::ForbiddenWith { item: item.into() })
    }

    /// Create a per-router duplicate address error.
    #[must_use]
    pub fn duplicate(family: AddressFamily) -> Self {
        Self::new(family.as_str(), ValidationErrorKind::Duplicate)
    }

    /// The taxonomy class of this finding.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        use ValidationErrorKind as K;
        match self.kind {
            K::Missing
            | K::MissingEither { .. }
            | K::MissingKey
            | K::RequiredWith { .. }
            | K::NotAnInteger
            | K::NotBoolean { .. }
            | K::NotAList { .. }
            | K::NotAMapping { .. }
            | K::SessionAddressMissing
            | K::RequiredFor { .. }
            | K::ForbiddenWith { .. } => ErrorClass::Structural,
            K::InvalidFormat { .. } | K::InvalidPublicKey | K::InvalidAddress { .. } => {
                ErrorClass::Format
            }
            K::WrongFamily { .. }
            | K::OutOfBlock { .. }
            | K::PortOutOfRange
            | K::Unresolvable
            | K::UnregisteredAsn { .. }
            | K::NoAddressFamily { .. } => ErrorClass::Membership,
            K::Duplicate => ErrorClass::CrossRecord,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ValidationErrorKind as K;
        let field = &self.field;
        match &self.kind {
            K::Missing => write!(f, "{field} must exist"),
            K::MissingEither { other } => write!(f, "{field} or {other} must exist"),
            K::MissingKey => write!(f, "{field}: must exist"),
            K::RequiredWith { other } => write!(f, "{field}: must exist when {other} defined"),
            K::NotAnInteger => write!(f, "{field}: must be an integer"),
            K::NotBoolean { value } => write!(f, "{value} is not true or false (boolean)"),
            K::NotAList { value } => write!(f, "{field}: '{value}' must be a list"),
            K::NotAMapping { value } => write!(f, "{field}: '{value}' must be type dictionary"),
            K::InvalidFormat { value, pattern } => write!(
                f,
                "{field}: '{value}' is not in a valid format, must match {pattern}"
            ),
            K::InvalidPublicKey => write!(f, "{field}: is not a valid WireGuard public key"),
            K::InvalidAddress { value } => {
                write!(f, "{field}: '{value}' is not a valid IP address or prefix")
            }
            K::WrongFamily { value, family } => {
                write!(f, "{field}: '{value}' is not an {} address", family.label())
            }
            K::OutOfBlock { value, allowed } => {
                write!(f, "{field}: '{value}' is not within {allowed}")
            }
            K::PortOutOfRange => write!(f, "{field}: must be between 0 and 65535"),
            K::Unresolvable => write!(
                f,
                "{field} is not a valid IPv4/IPv6 address or no DNS A/AAAA record found"
            ),
            K::UnregisteredAsn { asn } => {
                write!(f, "{field}: '{asn}' must exist in the DN42 registry")
            }
            K::NoAddressFamily { value } => {
                write!(f, "{field}: '{value}' must include 'ipv4' and/or 'ipv6'")
            }
            K::SessionAddressMissing => write!(f, "{field} required when sessions['{field}']"),
            K::RequiredFor { requirement } => write!(f, "{requirement} required for {field}"),
            K::ForbiddenWith { item } => write!(f, "{item} must not exist with {field}"),
            K::Duplicate => write!(f, "{field} address must be unique per router"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl Serialize for ValidationError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ValidationError", 3)?;
        state.serialize_field("field", &self.field)?;
        state.serialize_field("class", &self.class())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// An infrastructure fault raised by a collaborator.
///
/// Distinct from a finding such as "ASN not in registry": a collaborator
/// error means the validation run itself could not complete.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The ASN registry could not be queried.
    #[error("registry unavailable: {0}")]
    Registry(#[from] RegistryError),

    /// A DNS lookup failed for reasons other than "no such record".
    #[error("DNS lookup for '{host}' failed: {source}")]
    Dns {
        /// The hostname being resolved.
        host: String,
        /// The resolver failure.
        #[source]
        source: ResolveError,
    },
}
