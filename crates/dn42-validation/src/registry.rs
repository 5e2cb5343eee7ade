//! ASN registry collaborator and the per-run membership cache.

use std::collections::{HashMap, HashSet};

use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors raised by an ASN registry.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// The requested registry object does not exist.
    #[error("registry object not found: {object}")]
    NotFound {
        /// Path of the missing object.
        object: String,
    },

    /// The registry could not be reached or answered with an error status.
    #[error("registry request failed: {message}")]
    Http {
        /// Description of the failure.
        message: String,
    },

    /// The registry answered with an unexpected payload.
    #[error("unexpected registry response: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },
}

/// Registry information about one autonomous system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutNum {
    /// The `as-name` attribute.
    pub as_name: Option<String>,
    /// The `descr` attribute.
    pub description: Option<String>,
    /// Every attribute in registry order.
    pub attributes: Vec<(String, String)>,
}

impl AutNum {
    /// Build from raw `[key, value]` attribute pairs.
    ///
    /// A repeated `as-name` or `descr` keeps its last value.
    #[must_use]
    pub fn from_attributes(attributes: Vec<(String, String)>) -> Self {
        let last = |key: &str| {
            attributes
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };
        Self {
            as_name: last("as-name"),
            description: last("descr"),
            attributes,
        }
    }
}

/// Source of truth for which ASNs exist.
pub trait AsnRegistry {
    /// Every registered ASN as an `AS<number>` token.
    fn list_asns(&self) -> Result<HashSet<String>, RegistryError>;

    /// Registry details for one ASN.
    fn lookup_asn(&self, asn: u32) -> Result<AutNum, RegistryError>;
}

impl<R: AsnRegistry + ?Sized> AsnRegistry for &R {
    fn list_asns(&self) -> Result<HashSet<String>, RegistryError> {
        (**self).list_asns()
    }

    fn lookup_asn(&self, asn: u32) -> Result<AutNum, RegistryError> {
        (**self).lookup_asn(asn)
    }
}

/// Registry membership snapshot, fetched once and reused.
///
/// The snapshot is never refreshed: one validation run sees one registry.
#[derive(Debug, Default)]
pub struct AsnCache {
    asns: OnceCell<HashSet<String>>,
}

impl AsnCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the snapshot, fetching it from `registry` on first use.
    pub fn get_or_fetch<R: AsnRegistry + ?Sized>(
        &self,
        registry: &R,
    ) -> Result<&HashSet<String>, RegistryError> {
        self.asns.get_or_try_init(|| {
            let asns = registry.list_asns()?;
            debug!(count = asns.len(), "loaded ASN registry snapshot");
            Ok(asns)
        })
    }

    /// Whether the snapshot has been fetched.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.asns.get().is_some()
    }
}

/// An in-memory registry, e.g. loaded from a local snapshot file.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    asns: HashSet<String>,
    objects: HashMap<u32, AutNum>,
}

impl StaticRegistry {
    /// Create a registry from `AS<number>` tokens.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            asns: tokens.into_iter().map(Into::into).collect(),
            objects: HashMap::new(),
        }
    }

    /// Parse a snapshot with one token per line.
    ///
    /// Blank lines and lines starting with `#` are ignored. Bare numbers are
    /// accepted and prefixed with `AS`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::from_tokens(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(|line| {
                    if line.bytes().all(|b| b.is_ascii_digit()) {
                        format!("AS{line}")
                    } else {
                        line.to_string()
                    }
                }),
        )
    }

    /// Attach details for an ASN, registering it as well.
    #[must_use]
    pub fn with_aut_num(mut self, asn: u32, aut_num: AutNum) -> Self {
        self.asns.insert(format!("AS{asn}"));
        self.objects.insert(asn, aut_num);
        self
    }

    /// Number of registered ASNs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.asns.len()
    }

    /// Whether no ASN is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.asns.is_empty()
    }
}

impl AsnRegistry for StaticRegistry {
    fn list_asns(&self) -> Result<HashSet<String>, RegistryError> {
        Ok(self.asns.clone())
    }

    fn lookup_asn(&self, asn: u32) -> Result<AutNum, RegistryError> {
        self.objects
            .get(&asn)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                object: format!("aut-num/AS{asn}"),
            })
    }
}
