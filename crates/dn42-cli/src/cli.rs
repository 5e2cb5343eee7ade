//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dn42_registry::DEFAULT_REGISTRY_URL;
use dn42_validation::AddressFamily;

/// DN42 peer configuration tool.
#[derive(Parser, Debug, Clone)]
#[command(name = "dn42-peers")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `<router>.yml` peer files.
    #[arg(short = 'd', long, env = "DN42_ROUTERS_DIR", default_value = "routers", global = true)]
    pub routers_dir: PathBuf,

    /// DN42 registry explorer API base URL.
    #[arg(long, env = "DN42_REGISTRY_URL", default_value = DEFAULT_REGISTRY_URL, global = true)]
    pub registry_url: String,

    /// Local registry snapshot (one `AS<number>` per line) used instead of the HTTP registry.
    #[arg(long, env = "DN42_ASN_LIST", global = true)]
    pub asn_list: Option<PathBuf>,

    /// Registry request timeout in seconds.
    #[arg(long, env = "DN42_REGISTRY_TIMEOUT", default_value_t = 30, global = true)]
    pub timeout: u64,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table, global = true)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable output.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Check every router file and report all findings.
    ///
    /// Exits with status 2 when any peer has findings.
    Validate,

    /// Remove invalid peers from every router file.
    Prune,

    /// Add a peer to a router file.
    Add(AddArgs),

    /// Show registry details for an ASN.
    Asn {
        /// The AS number, without the `AS` prefix.
        asn: u32,
    },
}

/// BGP peering presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PeeringType {
    /// Multi-protocol over one IPv6 session with extended next-hop.
    #[value(name = "mp-bgp-extnh")]
    MpBgpExtnh,
    /// Multi-protocol over one session.
    #[value(name = "mp-bgp")]
    MpBgp,
    /// Separate IPv4 and IPv6 sessions.
    #[value(name = "ipv4v6")]
    Ipv4v6,
    /// IPv4 only.
    #[value(name = "ipv4")]
    Ipv4,
    /// IPv6 only.
    #[value(name = "ipv6")]
    Ipv6,
}

/// Arguments for the add command.
#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Router to peer at.
    #[arg(short, long)]
    pub router: String,

    /// Peer name.
    #[arg(short, long)]
    pub name: String,

    /// DN42 AS number.
    #[arg(short, long)]
    pub asn: u64,

    /// BGP peering type.
    #[arg(short, long, value_enum)]
    pub peering: PeeringType,

    /// IPv4 tunnel address.
    #[arg(long)]
    pub ipv4: Option<String>,

    /// IPv6 tunnel address (link-local preferred).
    #[arg(long)]
    pub ipv6: Option<String>,

    /// Session address family for `mp-bgp`.
    #[arg(long, value_parser = parse_family)]
    pub session: Option<AddressFamily>,

    /// WireGuard endpoint (IP address or hostname).
    #[arg(long)]
    pub endpoint: Option<String>,

    /// WireGuard endpoint port.
    #[arg(long)]
    pub port: Option<u32>,

    /// WireGuard public key.
    #[arg(long)]
    pub public_key: Option<String>,

    /// Print the generated YAML instead of saving it.
    #[arg(long)]
    pub stdout: bool,

    /// Show the registry entry for the ASN first.
    #[arg(long)]
    pub registry: bool,
}

fn parse_family(value: &str) -> Result<AddressFamily, String> {
    value.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["dn42-peers", "validate"]);
        assert_eq!(cli.routers_dir, PathBuf::from("routers"));
        assert_eq!(cli.registry_url, DEFAULT_REGISTRY_URL);
        assert_eq!(cli.timeout, 30);
        assert_eq!(cli.format, Format::Table);
        assert!(cli.asn_list.is_none());
        assert!(matches!(cli.command, Commands::Validate));
    }

    #[test]
    fn cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "dn42-peers",
            "prune",
            "--routers-dir",
            "/tmp/routers",
            "--format",
            "json",
        ]);
        assert_eq!(cli.routers_dir, PathBuf::from("/tmp/routers"));
        assert_eq!(cli.format, Format::Json);
        assert!(matches!(cli.command, Commands::Prune));
    }

    #[test]
    fn cli_parses_asn() {
        let cli = Cli::parse_from(["dn42-peers", "asn", "4242420207"]);
        assert!(matches!(cli.command, Commands::Asn { asn: 4_242_420_207 }));
    }

    #[test]
    fn cli_parses_add() {
        let cli = Cli::parse_from([
            "dn42-peers",
            "add",
            "--router",
            "us-nyc1",
            "--name",
            "FOO",
            "--asn",
            "4242420001",
            "--peering",
            "mp-bgp",
            "--session",
            "ipv6",
            "--ipv4",
            "172.20.1.1",
            "--ipv6",
            "fe80::1",
            "--stdout",
        ]);
        let Commands::Add(args) = cli.command else {
            unreachable!("expected add command");
        };
        assert_eq!(args.peering, PeeringType::MpBgp);
        assert_eq!(args.session, Some(AddressFamily::Ipv6));
        assert!(args.stdout);
        assert!(!args.registry);
    }

    #[test]
    fn cli_rejects_unknown_session() {
        let result = Cli::try_parse_from([
            "dn42-peers", "add", "-r", "x", "-n", "FOO", "-a", "1", "-p", "mp-bgp", "--session",
            "ipx",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn peering_type_names() {
        let names: Vec<String> = PeeringType::value_variants()
            .iter()
            .filter_map(|v| v.to_possible_value().map(|p| p.get_name().to_string()))
            .collect();
        assert_eq!(names, ["mp-bgp-extnh", "mp-bgp", "ipv4v6", "ipv4", "ipv6"]);
    }
}
