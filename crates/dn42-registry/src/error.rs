//! Error types for the registry client and the system resolver.

use dn42_validation::{RegistryError, ResolveError};
use hickory_resolver::error::{ResolveError as HickoryError, ResolveErrorKind};
use hickory_resolver::proto::error::{ProtoError, ProtoErrorKind};
use thiserror::Error;

/// Result type alias for client construction.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while setting up a registry client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The base URL could not be parsed.
    #[error("invalid registry URL '{url}': {message}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Parser message.
        message: String,
    },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Map a transport or status failure onto the registry taxonomy.
pub(crate) fn request_failed(err: &reqwest::Error) -> RegistryError {
    let message = match err.status() {
        Some(status) => format!("{status} from {}", err.url().map_or("registry", |u| u.as_str())),
        None if err.is_timeout() => "request timed out".to_string(),
        None => err.to_string(),
    };
    RegistryError::Http { message }
}

/// Classify a resolver failure.
///
/// Returns `None` when the failure only means the name has no such record
/// (NXDOMAIN, an empty answer, or a name that cannot be queried at all).
/// Unreachable or silent name servers are infrastructure failures.
pub(crate) fn classify_resolve(err: &HickoryError) -> Option<ResolveError> {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => None,
        ResolveErrorKind::Timeout => Some(ResolveError::Timeout),
        ResolveErrorKind::NoConnections => Some(ResolveError::Io(err.to_string())),
        ResolveErrorKind::Io(io) => Some(ResolveError::Io(io.to_string())),
        ResolveErrorKind::Proto(proto) => classify_proto(proto),
        _ => None,
    }
}

fn classify_proto(err: &ProtoError) -> Option<ResolveError> {
    match err.kind() {
        ProtoErrorKind::Timeout => Some(ResolveError::Timeout),
        ProtoErrorKind::Io(io) => Some(ResolveError::Io(io.to_string())),
        ProtoErrorKind::Busy => Some(ResolveError::Io(err.to_string())),
        _ => None,
    }
}
