//! # dn42-cli
//!
//! Command-line tool for DN42 router peer files.
//!
//! Provides commands for:
//! - Validating every `<router>.yml` file (CI friendly exit codes)
//! - Pruning invalid peers
//! - Adding peers from peering-type presets
//! - Looking up registry entries
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  load/save   ┌─────────────┐
//! │  dn42-cli   │─────────────►│ dn42-store  │  routers/*.yml
//! └──────┬──────┘              └─────────────┘
//!        │ validate
//!        ▼
//! ┌─────────────────┐  AsnRegistry / DnsResolver  ┌───────────────┐
//! │ dn42-validation │◄────────────────────────────│ dn42-registry │
//! └─────────────────┘                             └───────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::io::Write;

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod registry;

pub use cli::{AddArgs, Cli, Commands, Format, PeeringType};
pub use commands::Outcome;
pub use error::CliError;
pub use output::OutputFormat;

use commands::{github_annotations_enabled, AddCommand, AsnCommand, PruneCommand, ValidateCommand};
use dn42_store::PeerStore;
use registry::{batch_validator, RegistrySource};

/// Run the parsed command, writing its output to `writer`.
///
/// # Errors
///
/// Returns an error if the command could not complete. Findings are not an
/// error; they are reported through [`Outcome::Findings`].
pub fn run<W: Write>(cli: &Cli, writer: &mut W) -> Result<Outcome, CliError> {
    let format = OutputFormat::new(cli.format);
    let store = PeerStore::new(&cli.routers_dir);

    match &cli.command {
        Commands::Validate => {
            let batch = batch_validator(cli)?;
            ValidateCommand::new(store)
                .with_annotations(github_annotations_enabled())
                .execute(writer, &format, &batch)
        }
        Commands::Prune => {
            let batch = batch_validator(cli)?;
            PruneCommand::new(store).execute(writer, &format, &batch)
        }
        Commands::Add(args) => {
            let batch = batch_validator(cli)?;
            AddCommand::new(store).execute(writer, &format, &batch, args)
        }
        Commands::Asn { asn } => {
            let registry = RegistrySource::from_cli(cli)?;
            AsnCommand::new().execute(writer, &format, &registry, *asn)
        }
    }
}
