//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`validate`] - Lint every router file
//! - [`prune`] - Remove invalid peers
//! - [`add`] - Add a peer from presets
//! - [`asn`] - Registry lookup

use std::process::ExitCode;

pub mod add;
pub mod asn;
pub mod prune;
pub mod validate;

pub use add::{build_record, AddCommand};
pub use asn::AsnCommand;
pub use prune::PruneCommand;
pub use validate::{github_annotations_enabled, ValidateCommand};

/// How a command that completed should exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to report.
    Clean,
    /// Validation findings were reported.
    Findings,
}

impl Outcome {
    /// Process exit code: 0 when clean, 2 with findings.
    #[must_use]
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Clean => ExitCode::SUCCESS,
            Self::Findings => ExitCode::from(2),
        }
    }
}
