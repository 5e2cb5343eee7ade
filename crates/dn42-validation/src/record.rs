//! Peer records and the WireGuard descriptor view.
//!
//! Records keep their values loosely typed: a wrong type (a string where a
//! boolean belongs, a scalar where a list belongs) is a validation finding,
//! not a load failure. Field order and unknown keys are preserved so a
//! record can be written back exactly as it was read.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A known top-level key of a peer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerField {
    /// Peer name.
    Name,
    /// Autonomous system number.
    Asn,
    /// Remote IPv4 tunnel address.
    Ipv4,
    /// Remote IPv6 tunnel address.
    Ipv6,
    /// Local IPv4 tunnel address override.
    LocalIpv4,
    /// Local IPv6 tunnel address override.
    LocalIpv6,
    /// Multi-protocol BGP flag.
    Multiprotocol,
    /// Extended next-hop flag.
    ExtendedNexthop,
    /// Address families with a BGP session.
    Sessions,
    /// WireGuard tunnel descriptor.
    Wireguard,
}

impl PeerField {
    /// The key as written in a record.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Asn => "asn",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::LocalIpv4 => "local_ipv4",
            Self::LocalIpv6 => "local_ipv6",
            Self::Multiprotocol => "multiprotocol",
            Self::ExtendedNexthop => "extended_nexthop",
            Self::Sessions => "sessions",
            Self::Wireguard => "wireguard",
        }
    }
}

/// One peer of a router.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerRecord {
    fields: Map<String, Value>,
}

impl PeerRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON object. Returns the value back if it is not an object.
    pub fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(other),
        }
    }

    /// Look up a known field.
    #[must_use]
    pub fn get(&self, field: PeerField) -> Option<&Value> {
        self.fields.get(field.key())
    }

    /// Whether a known field is present (a `null` value counts as present).
    #[must_use]
    pub fn has(&self, field: PeerField) -> bool {
        self.fields.contains_key(field.key())
    }

    /// Set a field, appending it if new and keeping its position otherwise.
    pub fn set(&mut self, field: PeerField, value: impl Into<Value>) {
        self.fields.insert(field.key().to_string(), value.into());
    }

    /// Builder form of [`PeerRecord::set`].
    #[must_use]
    pub fn with(mut self, field: PeerField, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// The `name` field.
    #[must_use]
    pub fn name(&self) -> Option<&Value> {
        self.get(PeerField::Name)
    }

    /// The `name` field when it is a string.
    #[must_use]
    pub fn name_str(&self) -> Option<&str> {
        self.name().and_then(Value::as_str)
    }

    /// The `asn` field.
    #[must_use]
    pub fn asn(&self) -> Option<&Value> {
        self.get(PeerField::Asn)
    }

    /// The `ipv4` field.
    #[must_use]
    pub fn ipv4(&self) -> Option<&Value> {
        self.get(PeerField::Ipv4)
    }

    /// The `ipv6` field.
    #[must_use]
    pub fn ipv6(&self) -> Option<&Value> {
        self.get(PeerField::Ipv6)
    }

    /// The `sessions` field.
    #[must_use]
    pub fn sessions(&self) -> Option<&Value> {
        self.get(PeerField::Sessions)
    }

    /// The `wireguard` field.
    #[must_use]
    pub fn wireguard(&self) -> Option<&Value> {
        self.get(PeerField::Wireguard)
    }

    /// All fields in their original order.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consume the record into a JSON object value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Borrowed view of a `wireguard` mapping.
#[derive(Debug, Clone, Copy)]
pub struct WireGuardDescriptor<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> WireGuardDescriptor<'a> {
    /// View a value as a descriptor; `None` if it is not a mapping.
    #[must_use]
    pub fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object().map(|fields| Self { fields })
    }

    /// The tunnel endpoint (IP literal or hostname).
    #[must_use]
    pub fn remote_address(&self) -> Option<&'a Value> {
        self.fields.get("remote_address")
    }

    /// The tunnel endpoint port.
    #[must_use]
    pub fn remote_port(&self) -> Option<&'a Value> {
        self.fields.get("remote_port")
    }

    /// The peer's WireGuard public key.
    #[must_use]
    pub fn public_key(&self) -> Option<&'a Value> {
        self.fields.get("public_key")
    }
}

/// Render a value the way it appears in messages.
///
/// Strings are shown without quotes; lists and mappings in YAML flow style.
#[must_use]
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{k}: {}", render(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}
