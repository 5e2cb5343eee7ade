//! Validate command implementation.
//!
//! Lints every router file and reports each finding as
//! `<file>:<line> <message>`.

use std::io::Write;

use dn42_store::PeerStore;
use dn42_validation::{AsnRegistry, BatchValidator, DnsResolver};
use tracing::{debug, info};

use crate::commands::Outcome;
use crate::error::CliError;
use crate::output::{Finding, OutputFormat, ValidationSummary};

/// Whether GitHub Actions annotations should be emitted.
#[must_use]
pub fn github_annotations_enabled() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
        && std::env::var_os("GITHUB_WORKFLOW").is_some_and(|v| !v.is_empty())
}

/// Validate command executor.
pub struct ValidateCommand {
    store: PeerStore,
    annotate: bool,
}

impl ValidateCommand {
    /// Create a new validate command.
    #[must_use]
    pub fn new(store: PeerStore) -> Self {
        Self {
            store,
            annotate: false,
        }
    }

    /// Emit GitHub Actions annotations before the findings.
    #[must_use]
    pub fn with_annotations(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    /// Lint every router.
    ///
    /// # Errors
    ///
    /// Returns an error if a router file cannot be read or a collaborator fails.
    pub fn run<R, D>(&self, batch: &BatchValidator<R, D>) -> Result<ValidationSummary, CliError>
    where
        R: AsnRegistry,
        D: DnsResolver,
    {
        let mut summary = ValidationSummary::default();

        for router in self.store.routers()? {
            let loaded = self.store.load(&router)?;
            summary.routers += 1;
            if loaded.peers.is_empty() {
                debug!(router, "no peers");
                continue;
            }

            info!(router, peers = loaded.peers.len(), "validating router");
            summary.peers += loaded.peers.len();

            let report = batch.lint(&loaded.records())?;
            let file = loaded.path.display().to_string();
            for peer in report.failing() {
                for error in &peer.errors {
                    summary.findings.push(Finding {
                        file: file.clone(),
                        line: loaded.line(peer.index),
                        router: router.clone(),
                        peer: peer.display_name().to_string(),
                        error: error.clone(),
                    });
                }
            }
        }

        info!(
            routers = summary.routers,
            peers = summary.peers,
            findings = summary.findings.len(),
            "validation finished"
        );
        Ok(summary)
    }

    /// Execute the validate command.
    ///
    /// # Errors
    ///
    /// Returns an error if validation cannot complete or output fails.
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
        let summary = self.run(batch)?;

        if self.annotate && !format.is_json() {
            for finding in &summary.findings {
                writeln!(writer, "{}", finding.annotation())?;
            }
        }
        format.write(writer, &summary)?;

        Ok(if summary.is_clean() {
            Outcome::Clean
        } else {
            Outcome::Findings
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use dn42_validation::{NoResolver, PeerValidator, StaticRegistry};
    use std::fs;

    const KEY: &str = "vLfdP6SrkTfOnn/iYPM/ytMIU/vseZVNoAdgNbo1yV4=";

    fn batch() -> BatchValidator<StaticRegistry, NoResolver> {
        BatchValidator::new(PeerValidator::new(
            StaticRegistry::from_tokens(["AS4242420001", "AS4242420002"]),
            NoResolver,
        ))
    }

    fn peer_yaml(name: &str, asn: u64, ipv4: &str) -> String {
        format!(
            "- name: {name}\n  asn: {asn}\n  ipv4: {ipv4}\n  sessions:\n  - ipv4\n  wireguard:\n    public_key: {KEY}\n"
        )
    }

    #[test]
    fn clean_routers() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("r1.yml"),
            format!("---\n{}", peer_yaml("FOO", 4_242_420_001, "172.20.1.1/32")),
        )
        .expect("write");
        fs::write(dir.path().join("empty.yml"), "---\n").expect("write");

        let cmd = ValidateCommand::new(PeerStore::new(dir.path()));
        let mut buf = Vec::new();
        let outcome = cmd
            .execute(&mut buf, &OutputFormat::new(Format::Table), &batch())
            .expect("should execute");

        assert_eq!(outcome, Outcome::Clean);
        assert!(buf.is_empty());
    }

    #[test]
    fn findings_carry_file_and_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let text = format!(
            "---\n{}\n{}",
            peer_yaml("FOO", 4_242_420_001, "172.20.1.1/32"),
            peer_yaml("bar", 4_242_420_002, "172.20.1.2/32"),
        );
        fs::write(dir.path().join("r1.yml"), text).expect("write");

        let cmd = ValidateCommand::new(PeerStore::new(dir.path()));
        let summary = cmd.run(&batch()).expect("should run");

        assert_eq!(summary.routers, 1);
        assert_eq!(summary.peers, 2);
        assert_eq!(summary.findings.len(), 1);
        let finding = &summary.findings[0];
        assert_eq!(finding.line, Some(10));
        assert_eq!(finding.peer, "bar");
        assert!(finding.location().ends_with("r1.yml:10"));
    }

    #[test]
    fn annotations_precede_findings() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("r1.yml"), "- name: FOO\n").expect("write");

        let cmd = ValidateCommand::new(PeerStore::new(dir.path())).with_annotations(true);
        let mut buf = Vec::new();
        let outcome = cmd
            .execute(&mut buf, &OutputFormat::new(Format::Table), &batch())
            .expect("should execute");
        assert_eq!(outcome, Outcome::Findings);

        let output = String::from_utf8(buf).expect("valid utf8");
        let first = output.lines().next().unwrap_or_default();
        assert!(first.starts_with("::error file="));
        assert!(first.contains(",line=1,title=Validation Error::asn must exist"));
        assert!(output.contains("r1.yml:1 asn must exist"));
    }

    #[test]
    fn json_output_has_no_annotations() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("r1.yml"), "- name: FOO\n").expect("write");

        let cmd = ValidateCommand::new(PeerStore::new(dir.path())).with_annotations(true);
        let mut buf = Vec::new();
        cmd.execute(&mut buf, &OutputFormat::new(Format::Json), &batch())
            .expect("should execute");

        let output = String::from_utf8(buf).expect("valid utf8");
        assert!(!output.contains("::error"));
        let value: serde_json::Value = serde_json::from_str(&output).expect("json");
        assert_eq!(value["findings"][0]["error"]["message"], "asn must exist");
    }

    #[test]
    fn unreadable_router_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("r1.yml"), "name: FOO\n").expect("write");

        let cmd = ValidateCommand::new(PeerStore::new(dir.path()));
        assert!(matches!(cmd.run(&batch()), Err(CliError::Store(_))));
    }
}
