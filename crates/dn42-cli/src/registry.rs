//! Registry selection from command-line configuration.

use std::collections::HashSet;
use std::fs;
use std::time::Duration;

use dn42_registry::{RegistryClient, SystemResolver};
use dn42_validation::{AsnRegistry, AutNum, BatchValidator, PeerValidator, RegistryError, StaticRegistry};
use tracing::debug;

use crate::cli::Cli;
use crate::error::CliError;

/// The ASN registry a run uses: the HTTP API or a local snapshot file.
#[derive(Debug)]
pub enum RegistrySource {
    /// Live registry explorer API.
    Http(RegistryClient),
    /// Snapshot loaded from `--asn-list`.
    Snapshot(StaticRegistry),
}

impl RegistrySource {
    /// Pick the registry configured on the command line.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read or the client cannot be built.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if let Some(path) = &cli.asn_list {
            let text = fs::read_to_string(path)?;
            let registry = StaticRegistry::parse(&text);
            debug!(path = %path.display(), asns = registry.len(), "using registry snapshot");
            return Ok(Self::Snapshot(registry));
        }

        let client =
            RegistryClient::with_timeout(&cli.registry_url, Duration::from_secs(cli.timeout))?;
        debug!(url = client.base_url(), "using registry API");
        Ok(Self::Http(client))
    }
}

impl AsnRegistry for RegistrySource {
    fn list_asns(&self) -> Result<HashSet<String>, RegistryError> {
        match self {
            Self::Http(client) => client.list_asns(),
            Self::Snapshot(snapshot) => snapshot.list_asns(),
        }
    }

    fn lookup_asn(&self, asn: u32) -> Result<AutNum, RegistryError> {
        match self {
            Self::Http(client) => client.lookup_asn(asn),
            Self::Snapshot(snapshot) => snapshot.lookup_asn(asn),
        }
    }
}

/// Build the router validator for a run.
///
/// # Errors
///
/// Returns an error if the registry cannot be set up.
pub fn batch_validator(cli: &Cli) -> Result<BatchValidator<RegistrySource, SystemResolver>, CliError> {
    let registry = RegistrySource::from_cli(cli)?;
    Ok(BatchValidator::new(PeerValidator::new(
        registry,
        SystemResolver::new(),
    )))
}
