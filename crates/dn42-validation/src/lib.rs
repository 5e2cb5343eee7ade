//! Validation rules for DN42 peer configuration records.
//!
//! A router's peers are a list of loosely typed records (name, ASN, tunnel
//! addresses, BGP session families and a WireGuard descriptor). This crate
//! checks each record against the DN42 conventions and reports every finding
//! as a [`ValidationError`] with a stable, human-readable message.
//!
//! # Validators
//!
//! - [`validate_ip`]: tunnel addresses against the DN42 blocks
//! - [`validate_name`] and [`validate_asn`]: peer identity
//! - [`validate_wireguard`]: tunnel endpoint, port and public key
//! - [`validate_sessions`]: declared session families
//! - [`PeerValidator`]: every rule for one record, in a fixed order
//! - [`BatchValidator`]: a router's whole peer list, with address uniqueness
//!   and lint/prune modes
//!
//! # Collaborators
//!
//! ASN checks go through an [`AsnRegistry`] and endpoint checks through a
//! [`DnsResolver`]. Their infrastructure failures come back as
//! [`CollaboratorError`] and are never mixed with findings.
//!
//! ```
//! use dn42_validation::{NoResolver, PeerRecord, PeerValidator, StaticRegistry};
//! use serde_json::json;
//!
//! let validator = PeerValidator::new(StaticRegistry::from_tokens(["AS4242420001"]), NoResolver);
//! let peer = PeerRecord::from_value(json!({
//!     "name": "foo",
//!     "asn": 4242420001_u64,
//!     "ipv4": "172.20.1.1/32",
//!     "sessions": ["ipv4"],
//!     "wireguard": { "public_key": "vLfdP6SrkTfOnn/iYPM/ytMIU/vseZVNoAdgNbo1yV4=" },
//! }))
//! .unwrap_or_default();
//!
//! let errors = validator.validate(&peer)?;
//! assert_eq!(
//!     errors[0].to_string(),
//!     "name: 'foo' is not in a valid format, must match ^[A-Z][A-Z0-9-_]+$"
//! );
//! # Ok::<(), dn42_validation::CollaboratorError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod address;
mod batch;
mod config;
mod dns;
mod error;
mod identity;
mod peer;
mod record;
mod registry;
mod sessions;
mod wireguard;

pub use address::{parse_address_or_prefix, validate_ip, AddressFamily};
pub use batch::{duplicates, BatchReport, BatchValidator, PeerReport, PrunedPeer};
pub use config::{default_ipv4_block, default_ipv6_block, link_local_block, ValidationConfig};
pub use dns::{DnsResolver, NoResolver, RecordKind, ResolveError};
pub use error::{CollaboratorError, ErrorClass, ValidationError, ValidationErrorKind};
pub use identity::{asn_token, validate_asn, validate_name, NAME_PATTERN};
pub use peer::{validate_boolean, PeerValidator};
pub use record::{render, PeerField, PeerRecord, WireGuardDescriptor};
pub use registry::{AsnCache, AsnRegistry, AutNum, RegistryError, StaticRegistry};
pub use sessions::{address_field, declares, validate_sessions};
pub use wireguard::{is_public_key, validate_wireguard};

#[cfg(test)]
mod tests;
