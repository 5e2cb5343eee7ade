//! Add command implementation.
//!
//! Builds a peer record from flags using the peering-type presets, validates
//! it together with the router's existing peers and saves it.

use std::io::Write;

use dn42_store::{render_peers, PeerStore};
use dn42_validation::{
    asn_token, AddressFamily, AsnRegistry, BatchValidator, DnsResolver, PeerField, PeerRecord,
};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::cli::{AddArgs, PeeringType};
use crate::commands::Outcome;
use crate::error::CliError;
use crate::output::{AsnInfo, Message, OutputFormat, Rejection};

/// Build the peer record described by the flags.
///
/// Fields follow the order name, asn, ipv4, ipv6, multiprotocol,
/// extended_nexthop, sessions, wireguard. Addresses the preset needs but
/// that were not given are left out and reported by validation.
///
/// # Errors
///
/// Returns an error if `mp-bgp` is chosen without `--session`.
pub fn build_record(args: &AddArgs) -> Result<PeerRecord, CliError> {
    let mut peer = PeerRecord::new()
        .with(PeerField::Name, args.name.as_str())
        .with(PeerField::Asn, args.asn);

    let (ipv4, ipv6) = match args.peering {
        PeeringType::MpBgpExtnh | PeeringType::Ipv6 => (false, true),
        PeeringType::MpBgp | PeeringType::Ipv4v6 => (true, true),
        PeeringType::Ipv4 => (true, false),
    };
    if ipv4 {
        if let Some(address) = &args.ipv4 {
            peer.set(PeerField::Ipv4, address.as_str());
        }
    }
    if ipv6 {
        if let Some(address) = &args.ipv6 {
            peer.set(PeerField::Ipv6, address.as_str());
        }
    }

    let sessions = match args.peering {
        PeeringType::MpBgpExtnh => {
            peer.set(PeerField::Multiprotocol, true);
            peer.set(PeerField::ExtendedNexthop, true);
            vec![AddressFamily::Ipv6]
        }
        PeeringType::MpBgp => {
            let session = args.session.ok_or_else(|| {
                CliError::InvalidArgument("--session is required for mp-bgp peering".into())
            })?;
            peer.set(PeerField::Multiprotocol, true);
            vec![session]
        }
        PeeringType::Ipv4v6 => vec![AddressFamily::Ipv4, AddressFamily::Ipv6],
        PeeringType::Ipv4 => vec![AddressFamily::Ipv4],
        PeeringType::Ipv6 => vec![AddressFamily::Ipv6],
    };
    let sessions: Vec<&str> = sessions.into_iter().map(AddressFamily::as_str).collect();
    peer.set(PeerField::Sessions, json!(sessions));

    let mut wireguard = Map::new();
    if let Some(endpoint) = &args.endpoint {
        wireguard.insert("remote_address".into(), Value::from(endpoint.as_str()));
    }
    if let Some(port) = args.port {
        wireguard.insert("remote_port".into(), Value::from(port));
    }
    if let Some(key) = &args.public_key {
        wireguard.insert("public_key".into(), Value::from(key.as_str()));
    }
    peer.set(PeerField::Wireguard, Value::Object(wireguard));

    Ok(peer)
}

/// Add command executor.
pub struct AddCommand {
    store: PeerStore,
}

impl AddCommand {
    /// Create a new add command.
    #[must_use]
    pub fn new(store: PeerStore) -> Self {
        Self { store }
    }

    /// Execute the add command.
    ///
    /// Returns [`Outcome::Findings`] without writing anything when the new
    /// peer has findings.
    ///
    /// # Errors
    ///
    /// Returns an error if the router does not exist, its file cannot be read
    /// or written, or a collaborator fails.
    pub fn execute<W, R, D>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        batch: &BatchValidator<R, D>,
        args: &AddArgs,
    ) -> Result<Outcome, CliError>
    where
        W: Write,
        R: AsnRegistry,
        D: DnsResolver,
    {
        if !self.store.contains(&args.router) {
            return Err(CliError::InvalidArgument(format!(
                "unknown router '{}'",
                args.router
            )));
        }

        if args.registry {
            let asn = u32::try_from(args.asn).map_err(|_| {
                CliError::InvalidArgument(format!("'{}' is not a 32-bit AS number", args.asn))
            })?;
            let aut_num = batch.validator().registry().lookup_asn(asn)?;
            format.write(writer, &AsnInfo::new(asn_token(asn), aut_num))?;
        }

        let record = build_record(args)?;
        let mut peers = self.store.load(&args.router)?.into_records();
        peers.push(record.clone());

        let errors = batch
            .validate_batch(&peers)?
            .pop()
            .unwrap_or_default();
        if !errors.is_empty() {
            format.write(
                writer,
                &Rejection {
                    router: args.router.clone(),
                    errors,
                },
            )?;
            return Ok(Outcome::Findings);
        }

        if args.stdout {
            let yaml = render_peers(std::slice::from_ref(&record))
                .map_err(|e| CliError::Format(format!("YAML serialization failed: {e}")))?;
            writeln!(writer, "# {}", self.store.path(&args.router).display())?;
            write!(writer, "{yaml}")?;
        } else {
            self.store.save(&args.router, &peers)?;
            info!(router = %args.router, peer = %args.name, "added peer");
            format.write(
                writer,
                &Message::success(format!("Successfully saved peer to {}.yml", args.router)),
            )?;
        }

        Ok(Outcome::Clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use dn42_validation::{AutNum, NoResolver, PeerValidator, StaticRegistry};
    use std::fs;

    const KEY: &str = "vLfdP6SrkTfOnn/iYPM/ytMIU/vseZVNoAdgNbo1yV4=";

    fn args(peering: PeeringType) -> AddArgs {
        AddArgs {
            router: "r1".into(),
            name: "FOO".into(),
            asn: 4_242_420_001,
            peering,
            ipv4: Some("172.20.1.1/32".into()),
            ipv6: Some("fe80::1".into()),
            session: None,
            endpoint: Some("192.0.2.1".into()),
            port: Some(51820),
            public_key: Some(KEY.into()),
            stdout: false,
            registry: false,
        }
    }

    fn batch() -> BatchValidator<StaticRegistry, NoResolver> {
        let registry = StaticRegistry::from_tokens(["AS4242420001", "AS4242420002"]).with_aut_num(
            4_242_420_001,
            AutNum::from_attributes(vec![("as-name".into(), "FOO-AS".into())]),
        );
        BatchValidator::new(PeerValidator::new(registry, NoResolver))
    }

    fn keys(peer: &PeerRecord) -> Vec<&str> {
        peer.fields().keys().map(String::as_str).collect()
    }

    #[test]
    fn extnh_preset() {
        let peer = build_record(&args(PeeringType::MpBgpExtnh)).expect("record");
        assert_eq!(
            keys(&peer),
            ["name", "asn", "ipv6", "multiprotocol", "extended_nexthop", "sessions", "wireguard"]
        );
        assert_eq!(peer.sessions(), Some(&json!(["ipv6"])));
    }

    #[test]
    fn mp_bgp_needs_session() {
        assert!(matches!(
            build_record(&args(PeeringType::MpBgp)),
            Err(CliError::InvalidArgument(_))
        ));

        let mut with_session = args(PeeringType::MpBgp);
        with_session.session = Some(AddressFamily::Ipv4);
        let peer = build_record(&with_session).expect("record");
        assert_eq!(
            keys(&peer),
            ["name", "asn", "ipv4", "ipv6", "multiprotocol", "sessions", "wireguard"]
        );
        assert_eq!(peer.sessions(), Some(&json!(["ipv4"])));
    }

    #[test]
    fn single_family_presets() {
        let v4 = build_record(&args(PeeringType::Ipv4)).expect("record");
        assert!(v4.ipv6().is_none());
        assert_eq!(v4.sessions(), Some(&json!(["ipv4"])));

        let both = build_record(&args(PeeringType::Ipv4v6)).expect("record");
        assert_eq!(both.sessions(), Some(&json!(["ipv4", "ipv6"])));
    }

    #[test]
    fn wireguard_descriptor() {
        let mut dynamic = args(PeeringType::Ipv6);
        dynamic.endpoint = None;
        dynamic.port = None;
        let peer = build_record(&dynamic).expect("record");
        assert_eq!(peer.wireguard(), Some(&json!({ "public_key": KEY })));
    }

    #[test]
    fn saves_valid_peer() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("r1.yml"), "---\n").expect("write");
        let store = PeerStore::new(dir.path());

        let mut buf = Vec::new();
        let outcome = AddCommand::new(store.clone())
            .execute(&mut buf, &OutputFormat::new(Format::Table), &batch(), &args(PeeringType::Ipv4))
            .expect("should execute");

        assert_eq!(outcome, Outcome::Clean);
        let output = String::from_utf8(buf).expect("valid utf8");
        assert!(output.contains("Successfully saved peer to r1.yml"));
        let peers = store.load("r1").expect("load").into_records();
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].name_str(), Some("FOO"));
    }

    #[test]
    fn duplicate_address_rejected_without_writing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let existing = format!(
            "---\n- name: BAR\n  asn: 4242420002\n  ipv4: 172.20.1.1/32\n  sessions:\n  - ipv4\n  wireguard:\n    public_key: {KEY}\n"
        );
        fs::write(dir.path().join("r1.yml"), &existing).expect("write");

        let mut buf = Vec::new();
        let outcome = AddCommand::new(PeerStore::new(dir.path()))
            .execute(&mut buf, &OutputFormat::new(Format::Table), &batch(), &args(PeeringType::Ipv4))
            .expect("should execute");

        assert_eq!(outcome, Outcome::Findings);
        let output = String::from_utf8(buf).expect("valid utf8");
        assert!(output.contains("ERROR: ipv4 address must be unique per router"));
        assert_eq!(fs::read_to_string(dir.path().join("r1.yml")).expect("read"), existing);
    }

    #[test]
    fn stdout_prints_yaml_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("r1.yml"), "").expect("write");

        let mut add = args(PeeringType::Ipv4);
        add.stdout = true;
        add.registry = true;
        let mut buf = Vec::new();
        AddCommand::new(PeerStore::new(dir.path()))
            .execute(&mut buf, &OutputFormat::new(Format::Table), &batch(), &add)
            .expect("should execute");

        let output = String::from_utf8(buf).expect("valid utf8");
        assert!(output.contains("AS-NAME:      FOO-AS"));
        assert!(output.contains("r1.yml\n---\n- name: FOO\n  asn: 4242420001\n"));
        assert_eq!(fs::read_to_string(dir.path().join("r1.yml")).expect("read"), "");
    }

    #[test]
    fn unknown_router() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = AddCommand::new(PeerStore::new(dir.path())).execute(
            &mut Vec::new(),
            &OutputFormat::default(),
            &batch(),
            &args(PeeringType::Ipv4),
        );
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
    }
}
