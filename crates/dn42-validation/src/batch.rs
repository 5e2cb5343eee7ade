//! Router-level validation: per-peer rules plus address uniqueness.
//!
//! A batch is the peer list of one router. Uniqueness of `ipv4` and `ipv6`
//! is only meaningful within that list, so every peer sharing a duplicated
//! value is flagged.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::{debug, info};

use crate::address::AddressFamily;
use crate::dns::DnsResolver;
use crate::error::{CollaboratorError, ValidationError};
use crate::peer::PeerValidator;
use crate::record::{render, PeerRecord};
use crate::registry::AsnRegistry;
use crate::sessions::address_field;

/// Findings for one peer of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerReport {
    /// Position of the peer in the batch.
    pub index: usize,
    /// The peer's name, when it is a string.
    pub name: Option<String>,
    /// Findings in rule order, duplicates last.
    pub errors: Vec<ValidationError>,
}

impl PeerReport {
    /// Whether the peer passed every rule.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Name to show in reports.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

/// Findings for a whole batch, one report per peer in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// Per-peer reports.
    pub peers: Vec<PeerReport>,
}

impl BatchReport {
    /// Whether no peer has findings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.peers.iter().all(PeerReport::is_valid)
    }

    /// Total number of findings.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.peers.iter().map(|p| p.errors.len()).sum()
    }

    /// Reports of peers with findings.
    pub fn failing(&self) -> impl Iterator<Item = &PeerReport> {
        self.peers.iter().filter(|p| !p.is_valid())
    }
}

/// A peer removed by [`BatchValidator::prune`].
#[derive(Debug, Clone, PartialEq)]
pub struct PrunedPeer {
    /// The removed record.
    pub record: PeerRecord,
    /// Why it was removed.
    pub reasons: Vec<ValidationError>,
}

impl PrunedPeer {
    /// Name to show in reports.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.record.name_str().unwrap_or("<unnamed>")
    }
}

/// Validates the peer list of one router.
#[derive(Debug)]
pub struct BatchValidator<R, D> {
    validator: PeerValidator<R, D>,
}

impl<R: AsnRegistry, D: DnsResolver> BatchValidator<R, D> {
    /// Wrap a peer validator. Its registry snapshot is shared by every batch.
    pub fn new(validator: PeerValidator<R, D>) -> Self {
        Self { validator }
    }

    /// The per-peer validator.
    pub fn validator(&self) -> &PeerValidator<R, D> {
        &self.validator
    }

    /// Validate every peer, then check address uniqueness.
    ///
    /// Returns one error list per peer, in input order.
    pub fn validate_batch(
        &self,
        peers: &[PeerRecord],
    ) -> Result<Vec<Vec<ValidationError>>, CollaboratorError> {
        let mut results = peers
            .iter()
            .map(|peer| self.validator.validate(peer))
            .collect::<Result<Vec<_>, _>>()?;

        for family in AddressFamily::ALL {
            for index in duplicates(peers, family) {
                results[index].push(ValidationError::duplicate(family));
            }
        }

        Ok(results)
    }

    /// Report every finding without touching the input.
    pub fn lint(&self, peers: &[PeerRecord]) -> Result<BatchReport, CollaboratorError> {
        let results = self.validate_batch(peers)?;
        let report = BatchReport {
            peers: peers
                .iter()
                .zip(results)
                .enumerate()
                .map(|(index, (peer, errors))| PeerReport {
                    index,
                    name: peer.name_str().map(str::to_string),
                    errors,
                })
                .collect(),
        };
        debug!(
            peers = report.peers.len(),
            errors = report.error_count(),
            "linted batch"
        );
        Ok(report)
    }

    /// Remove every peer with findings from `peers`.
    ///
    /// Returns the removed peers with their reasons, in input order. On
    /// `Err` the list is left unchanged.
    pub fn prune(&self, peers: &mut Vec<PeerRecord>) -> Result<Vec<PrunedPeer>, CollaboratorError> {
        let results = self.validate_batch(peers)?;

        let mut kept = Vec::with_capacity(peers.len());
        let mut removed = Vec::new();
        for (record, reasons) in peers.drain(..).zip(results) {
            if reasons.is_empty() {
                kept.push(record);
            } else {
                removed.push(PrunedPeer { record, reasons });
            }
        }
        *peers = kept;

        if !removed.is_empty() {
            info!(removed = removed.len(), kept = peers.len(), "pruned batch");
        }
        Ok(removed)
    }
}

/// Indexes of peers whose address for `family` is shared with another peer.
///
/// Values are compared as written; peers without the field are ignored.
#[must_use]
pub fn duplicates(peers: &[PeerRecord], family: AddressFamily) -> BTreeSet<usize> {
    let mut seen: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, peer) in peers.iter().enumerate() {
        if let Some(value) = peer.get(address_field(family)) {
            seen.entry(render(value)).or_default().push(index);
        }
    }
    seen.into_values()
        .filter(|indexes| indexes.len() > 1)
        .flatten()
        .collect()
}
