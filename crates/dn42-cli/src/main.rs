//! DN42 peers CLI binary entrypoint.
//!
//! This is the main entry point for the `dn42-peers` command-line tool.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dn42_cli::cli::Cli;

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut stdout = io::stdout().lock();

    match dn42_cli::run(&cli, &mut stdout) {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dn42_cli::cli::{Commands, Format};
    use dn42_cli::{CliError, Outcome};
    use std::fs;

    #[test]
    fn cli_parses_validate() {
        let cli = Cli::parse_from(["dn42-peers", "validate"]);
        assert!(matches!(cli.command, Commands::Validate));
    }

    #[test]
    fn cli_respects_format_flag() {
        let cli = Cli::parse_from(["dn42-peers", "--format", "json", "validate"]);
        assert_eq!(cli.format, Format::Json);
    }

    #[test]
    fn run_validate_with_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let asns = dir.path().join("asns.txt");
        fs::write(&asns, "AS4242420001\n").expect("write");
        let routers = dir.path().join("routers");
        fs::create_dir(&routers).expect("mkdir");
        fs::write(routers.join("r1.yml"), "---\n- name: FOO\n  asn: 4242420002\n").expect("write");

        let cli = Cli::parse_from([
            "dn42-peers",
            "-d",
            routers.to_str().expect("utf8 path"),
            "--asn-list",
            asns.to_str().expect("utf8 path"),
            "validate",
        ]);
        let mut buf = Vec::new();
        let outcome = dn42_cli::run(&cli, &mut buf).expect("should run");
        assert_eq!(outcome, Outcome::Findings);
    }

    #[test]
    fn run_with_missing_routers_dir_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let asns = dir.path().join("asns.txt");
        fs::write(&asns, "").expect("write");
        let missing = dir.path().join("missing");

        let cli = Cli::parse_from([
            "dn42-peers",
            "-d",
            missing.to_str().expect("utf8 path"),
            "--asn-list",
            asns.to_str().expect("utf8 path"),
            "validate",
        ]);
        let result = dn42_cli::run(&cli, &mut Vec::new());
        assert!(matches!(result, Err(CliError::Store(_))));
    }
}
