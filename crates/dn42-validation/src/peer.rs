//! Whole-record validation.
//!
//! [`PeerValidator`] runs every rule against one peer record in a fixed
//! order and returns the findings in that order. It owns the ASN cache, so
//! one validator equals one registry snapshot: build a new validator for
//! every independent run.

use serde_json::Value;
use tracing::debug;

use crate::address::{validate_ip, AddressFamily};
use crate::config::ValidationConfig;
use crate::dns::DnsResolver;
use crate::error::{CollaboratorError, ValidationError, ValidationErrorKind};
use crate::identity::{validate_asn, validate_name};
use crate::record::{render, PeerField, PeerRecord};
use crate::registry::{AsnCache, AsnRegistry};
use crate::sessions::{declares, validate_sessions};
use crate::wireguard::validate_wireguard;

/// Check that a value is exactly `true` or `false`.
#[must_use]
pub fn validate_boolean(field: &str, value: &Value) -> Option<ValidationError> {
    if value.is_boolean() {
        None
    } else {
        Some(ValidationError::not_boolean(field, render(value)))
    }
}

/// Validates peer records against a registry snapshot and resolver.
#[derive(Debug)]
pub struct PeerValidator<R, D> {
    config: ValidationConfig,
    registry: R,
    dns: D,
    asns: AsnCache,
}

impl<R: AsnRegistry, D: DnsResolver> PeerValidator<R, D> {
    /// Create a validator with the default address blocks.
    pub fn new(registry: R, dns: D) -> Self {
        Self {
            config: ValidationConfig::default(),
            registry,
            dns,
            asns: AsnCache::new(),
        }
    }

    /// Use different address blocks.
    #[must_use]
    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    /// The address blocks in use.
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// The registry collaborator.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Validate a single tunnel address.
    pub fn validate_ip(
        &self,
        address: &Value,
        family: AddressFamily,
        field: &str,
    ) -> Option<ValidationError> {
        validate_ip(&self.config, address, family, field)
    }

    /// Validate an ASN against the cached registry snapshot.
    pub fn validate_asn(&self, asn: &Value) -> Result<Option<ValidationError>, CollaboratorError> {
        Ok(validate_asn(asn, &self.asns, &self.registry)?)
    }

    /// Validate a WireGuard descriptor.
    pub fn validate_wireguard(
        &self,
        descriptor: &Value,
    ) -> Result<Vec<ValidationError>, CollaboratorError> {
        validate_wireguard(descriptor, &self.dns)
    }

    /// Validate one peer record.
    ///
    /// Returns the findings in rule order; an empty list means the record is
    /// valid. Registry and DNS infrastructure failures are returned as `Err`.
    pub fn validate(&self, peer: &PeerRecord) -> Result<Vec<ValidationError>, CollaboratorError> {
        let mut errors = Vec::new();

        match peer.name() {
            Some(name) => errors.extend(validate_name(name)),
            None => errors.push(ValidationError::missing(PeerField::Name.key())),
        }

        match peer.asn() {
            Some(asn) => errors.extend(self.validate_asn(asn)?),
            None => errors.push(ValidationError::missing(PeerField::Asn.key())),
        }

        if let Some(ipv4) = peer.ipv4() {
            errors.extend(self.validate_ip(ipv4, AddressFamily::Ipv4, PeerField::Ipv4.key()));
        } else if !peer.has(PeerField::Ipv6) {
            errors.push(ValidationError::new(
                PeerField::Ipv4.key(),
                ValidationErrorKind::MissingEither {
                    other: PeerField::Ipv6.key().to_string(),
                },
            ));
        }

        if let Some(local) = peer.get(PeerField::LocalIpv4) {
            errors.extend(self.validate_ip(local, AddressFamily::Ipv4, PeerField::LocalIpv4.key()));
        }

        if let Some(ipv6) = peer.ipv6() {
            errors.extend(self.validate_ip(ipv6, AddressFamily::Ipv6, PeerField::Ipv6.key()));
        }

        if let Some(local) = peer.get(PeerField::LocalIpv6) {
            errors.extend(self.validate_ip(local, AddressFamily::Ipv6, PeerField::LocalIpv6.key()));
        }

        if let Some(flag) = peer.get(PeerField::Multiprotocol) {
            errors.extend(validate_boolean(PeerField::Multiprotocol.key(), flag));
        }

        if let Some(flag) = peer.get(PeerField::ExtendedNexthop) {
            errors.extend(validate_extended_nexthop(peer, flag));
        }

        match peer.sessions() {
            Some(sessions) => errors.extend(validate_sessions(sessions, peer)),
            None => errors.push(ValidationError::missing(PeerField::Sessions.key())),
        }

        match peer.wireguard() {
            Some(wireguard) => errors.extend(self.validate_wireguard(wireguard)?),
            None => errors.push(ValidationError::missing(PeerField::Wireguard.key())),
        }

        debug!(
            peer = peer.name_str().unwrap_or("<missing>"),
            errors = errors.len(),
            "validated peer"
        );
        Ok(errors)
    }
}

/// Rules tied to the `extended_nexthop` flag.
///
/// The session membership checks only run when `sessions` is a list; a
/// missing or malformed `sessions` is reported by the session rule itself.
fn validate_extended_nexthop(peer: &PeerRecord, flag: &Value) -> Vec<ValidationError> {
    let field = PeerField::ExtendedNexthop.key();
    let mut errors = Vec::new();

    errors.extend(validate_boolean(field, flag));

    if !peer.has(PeerField::Ipv6) {
        errors.push(ValidationError::required_for(field, "ipv6"));
    }

    if let Some(sessions) = peer.sessions() {
        if declares(sessions, AddressFamily::Ipv6) == Some(false) {
            errors.push(ValidationError::required_for(field, "sessions: [ipv6]"));
        }
        if declares(sessions, AddressFamily::Ipv4) == Some(true) {
            errors.push(ValidationError::forbidden_with(field, "sessions: [ipv4]"));
        }
    }

    errors
}
