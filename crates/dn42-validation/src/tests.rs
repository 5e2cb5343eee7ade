//! Cross-module tests including property-based testing with proptest.

use crate::*;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::cell::Cell;
use std::collections::HashSet;

const VALID_KEY: &str = "vLfdP6SrkTfOnn/iYPM/ytMIU/vseZVNoAdgNbo1yV4=";

fn check_ip(address: &str, family: AddressFamily) -> Option<ValidationError> {
    validate_ip(&ValidationConfig::default(), &Value::from(address), family, "ip")
}

// =============================================================================
// Property-based tests with proptest
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // -------------------------------------------------------------------------
    // Name tests
    // -------------------------------------------------------------------------

    #[test]
    fn prop_valid_names_always_pass(name in "[A-Z][A-Z0-9_-]{1,40}") {
        prop_assert!(validate_name(&json!(name)).is_none());
    }

    #[test]
    fn prop_names_with_lowercase_fail(
        prefix in "[A-Z][A-Z0-9_-]{0,20}",
        lower in "[a-z]",
        suffix in "[A-Z0-9_-]{0,20}"
    ) {
        let name = format!("{prefix}{lower}{suffix}");
        prop_assert!(validate_name(&json!(name)).is_some());
    }

    #[test]
    fn prop_names_starting_with_non_letter_fail(
        first in "[0-9_-]",
        rest in "[A-Z0-9_-]{1,20}"
    ) {
        let name = format!("{first}{rest}");
        prop_assert!(validate_name(&json!(name)).is_some());
    }

    // -------------------------------------------------------------------------
    // Address tests
    // -------------------------------------------------------------------------

    #[test]
    fn prop_addresses_in_dn42_ipv4_block_pass(
        b in 20u8..=23,
        c in any::<u8>(),
        d in any::<u8>(),
        len in prop::option::of(14u8..=32)
    ) {
        let address = match len {
            Some(len) => format!("172.{b}.{c}.{d}/{len}"),
            None => format!("172.{b}.{c}.{d}"),
        };
        prop_assert!(check_ip(&address, AddressFamily::Ipv4).is_none());
    }

    #[test]
    fn prop_ipv4_outside_block_fails(a in any::<u8>(), b in any::<u8>(), c in any::<u8>(), d in any::<u8>()) {
        prop_assume!(!(a == 172 && (20..=23).contains(&b)));
        let address = format!("{a}.{b}.{c}.{d}");
        let result = check_ip(&address, AddressFamily::Ipv4);
        let matched = matches!(result.map(|e| e.kind), Some(ValidationErrorKind::OutOfBlock { .. }));
        prop_assert!(matched);
    }

    #[test]
    fn prop_ipv4_never_accepted_as_ipv6(a in any::<u8>(), b in any::<u8>(), c in any::<u8>(), d in any::<u8>()) {
        let address = format!("{a}.{b}.{c}.{d}");
        let result = check_ip(&address, AddressFamily::Ipv6);
        let matched = matches!(result.map(|e| e.kind), Some(ValidationErrorKind::WrongFamily { .. }));
        prop_assert!(matched);
    }

    #[test]
    fn prop_ula_and_link_local_pass(
        high in prop_oneof![0xfc00u16..=0xfdff, 0xfe80u16..=0xfebf],
        low in any::<u16>()
    ) {
        let address = format!("{high:x}::{low:x}");
        prop_assert!(check_ip(&address, AddressFamily::Ipv6).is_none());
    }

    #[test]
    fn prop_garbage_is_not_an_address(s in "[g-z!@#]{1,20}") {
        let result = check_ip(&s, AddressFamily::Ipv4);
        let matched = matches!(result.map(|e| e.kind), Some(ValidationErrorKind::InvalidAddress { .. }));
        prop_assert!(matched);
    }

    // -------------------------------------------------------------------------
    // Public key tests
    // -------------------------------------------------------------------------

    #[test]
    fn prop_canonical_keys_pass(body in "[A-Za-z0-9+/]{42}", last in "[AEIMQUYcgkosw480]") {
        let key = format!("{body}{last}=");
        prop_assert!(is_public_key(&key));
    }

    #[test]
    fn prop_wrong_length_keys_fail(body in "[A-Za-z0-9+/]{0,41}") {
        let key = format!("{body}A=");
        prop_assert!(!is_public_key(&key));
    }
}

// =============================================================================
// Scenario tests
// =============================================================================

mod scenarios {
    use super::*;

    fn validator() -> PeerValidator<StaticRegistry, NoResolver> {
        PeerValidator::new(
            StaticRegistry::from_tokens(["AS4242420001", "AS4242420002"]),
            NoResolver,
        )
    }

    fn base() -> Value {
        json!({
            "name": "FOO",
            "asn": 4_242_420_001_u64,
            "ipv4": "172.20.1.1/32",
            "sessions": ["ipv4"],
            "wireguard": { "public_key": VALID_KEY },
        })
    }

    fn patched(patch: Value) -> PeerRecord {
        let mut value = base();
        if let (Some(target), Some(fields)) = (value.as_object_mut(), patch.as_object()) {
            for (key, field) in fields {
                if field.is_null() {
                    target.remove(key);
                } else {
                    target.insert(key.clone(), field.clone());
                }
            }
        }
        PeerRecord::from_value(value).unwrap_or_default()
    }

    fn messages(peer: &PeerRecord) -> Vec<String> {
        validator()
            .validate(peer)
            .unwrap_or_default()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn registered_peer_is_valid() {
        assert!(messages(&patched(json!({}))).is_empty());
    }

    #[test]
    fn lowercase_name_yields_one_error() {
        let errors = messages(&patched(json!({ "name": "foo" })));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("name: 'foo'"));
    }

    #[test]
    fn session_family_needs_its_address() {
        let errors = messages(&patched(json!({ "ipv4": null, "ipv6": "fd00::1/64" })));
        assert!(errors.contains(&"ipv4 required when sessions['ipv4']".to_string()));
    }

    #[test]
    fn remote_address_needs_port() {
        let errors = messages(&patched(json!({
            "wireguard": { "remote_address": "203.0.113.5", "public_key": VALID_KEY },
        })));
        assert!(errors.contains(
            &"wireguard.remote_port: must exist when remote_address defined".to_string()
        ));
    }

    #[test]
    fn duplicate_ipv4_flags_both_peers() {
        let peers = vec![
            patched(json!({ "ipv4": "172.20.2.2/32" })),
            patched(json!({ "name": "BAR", "asn": 4_242_420_002_u64, "ipv4": "172.20.2.2/32" })),
        ];
        let batch = BatchValidator::new(validator());
        let results = batch.validate_batch(&peers).unwrap_or_default();
        assert_eq!(results.len(), 2);
        for errors in &results {
            assert!(errors
                .iter()
                .any(|e| e.to_string() == "ipv4 address must be unique per router"));
        }
    }

    #[test]
    fn extended_nexthop_violations_are_independent() {
        let peer = patched(json!({ "extended_nexthop": true }));
        let errors = messages(&peer);
        assert_eq!(
            errors,
            [
                "ipv6 required for extended_nexthop",
                "sessions: [ipv6] required for extended_nexthop",
                "sessions: [ipv4] must not exist with extended_nexthop",
            ]
        );
    }

    #[test]
    fn extended_nexthop_with_ipv6_only_session() {
        let peer = patched(json!({
            "ipv4": null,
            "ipv6": "fe80::1",
            "multiprotocol": true,
            "extended_nexthop": true,
            "sessions": ["ipv6"],
        }));
        assert!(messages(&peer).is_empty());
    }
}

// =============================================================================
// Registry snapshot tests
// =============================================================================

mod registry_snapshot {
    use super::*;

    struct CountingRegistry {
        inner: StaticRegistry,
        calls: Cell<usize>,
    }

    impl AsnRegistry for CountingRegistry {
        fn list_asns(&self) -> Result<HashSet<String>, RegistryError> {
            self.calls.set(self.calls.get() + 1);
            self.inner.list_asns()
        }

        fn lookup_asn(&self, asn: u32) -> Result<AutNum, RegistryError> {
            self.inner.lookup_asn(asn)
        }
    }

    #[test]
    fn snapshot_fetched_once_per_validator() {
        let registry = CountingRegistry {
            inner: StaticRegistry::from_tokens(["AS4242420001"]),
            calls: Cell::new(0),
        };
        let validator = PeerValidator::new(&registry, NoResolver);

        let peers: Vec<PeerRecord> = (0..25)
            .map(|i| {
                PeerRecord::new()
                    .with(PeerField::Name, format!("PEER-{i}"))
                    .with(PeerField::Asn, 4_242_420_001_u64 + i)
            })
            .collect();

        let batch = BatchValidator::new(validator);
        assert!(batch.validate_batch(&peers).is_ok());
        assert!(batch.validate_batch(&peers).is_ok());
        assert_eq!(registry.calls.get(), 1);
    }

    #[test]
    fn snapshot_not_fetched_without_asns() {
        let registry = CountingRegistry {
            inner: StaticRegistry::default(),
            calls: Cell::new(0),
        };
        let validator = PeerValidator::new(&registry, NoResolver);
        assert!(validator.validate(&PeerRecord::new()).is_ok());
        assert_eq!(registry.calls.get(), 0);
    }
}

// =============================================================================
// Error classification tests
// =============================================================================

mod classification {
    use super::*;

    #[test]
    fn findings_carry_their_class() {
        let validator = PeerValidator::new(StaticRegistry::default(), NoResolver);
        let peer = PeerRecord::from_value(json!({
            "name": "x",
            "ipv4": "10.0.0.1",
            "sessions": "ipv4",
        }))
        .unwrap_or_default();
        let classes: Vec<ErrorClass> = validator
            .validate(&peer)
            .unwrap_or_default()
            .iter()
            .map(ValidationError::class)
            .collect();
        assert_eq!(
            classes,
            [
                ErrorClass::Format,
                ErrorClass::Structural,
                ErrorClass::Membership,
                ErrorClass::Structural,
                ErrorClass::Structural,
            ]
        );
    }

    #[test]
    fn duplicate_is_cross_record() {
        assert_eq!(
            ValidationError::duplicate(AddressFamily::Ipv6).class(),
            ErrorClass::CrossRecord
        );
    }

    #[test]
    fn findings_serialize_with_message() {
        let error = ValidationError::missing("name");
        let value = serde_json::to_value(&error).unwrap_or_default();
        assert_eq!(value["field"], "name");
        assert_eq!(value["message"], "name must exist");
    }
}
