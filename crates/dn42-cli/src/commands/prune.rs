//! Prune command implementation.
//!
//! Removes every peer with findings from its router file and reports what
//! was removed and why.

use std::io::Write;

use dn42_store::PeerStore;
use dn42_validation::{AsnRegistry, BatchValidator, DnsResolver};
use tracing::info;

use crate::commands::Outcome;
use crate::error::CliError;
use crate::output::{OutputFormat, PruneReport, RemovedPeer, RouterPrune};

/// Prune command executor.
pub struct PruneCommand {
    store: PeerStore,
}

impl PruneCommand {
    /// Create a new prune command.
    #[must_use]
    pub fn new(store: PeerStore) -> Self {
        Self { store }
    }

    /// Execute the prune command.
    ///
    /// Every router that has peers is rewritten, sorted by name. Removing
    /// peers is not a failure: the outcome is always [`Outcome::Clean`].
    ///
    /// # Errors
    ///
    /// Returns an error if a router file cannot be read or written, or a
    /// collaborator fails. Routers already processed stay rewritten.
    pub fn execute<W, R, D>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        batch: &BatchValidator<R, D>,
    ) -> Result<Outcome, CliError>
    where
        W: Write,
        R: AsnRegistry,
        D: DnsResolver,
    {
        let mut report = PruneReport::default();

        for router in self.store.routers()? {
            let loaded = self.store.load(&router)?;
            if !format.is_json() {
                writeln!(writer, "------------ {router} ------------")?;
            }
            if loaded.peers.is_empty() {
                continue;
            }

            let mut peers = loaded.into_records();
            let removed = batch.prune(&mut peers)?;
            self.store.save(&router, &peers)?;

            if !removed.is_empty() {
                info!(router, removed = removed.len(), "pruned router");
                report.routers.push(RouterPrune {
                    router,
                    removed: removed
                        .iter()
                        .map(|peer| RemovedPeer {
                            name: peer.display_name().to_string(),
                            reasons: peer.reasons.iter().map(ToString::to_string).collect(),
                        })
                        .collect(),
                });
            }
        }

        format.write(writer, &report)?;
        Ok(Outcome::Clean)
    }
}
