//! CLI error types.

use std::fmt;

use dn42_registry::ClientError;
use dn42_store::StoreError;
use dn42_validation::{CollaboratorError, RegistryError};

/// CLI-specific errors.
///
/// Validation findings are not errors; these are failures that stop a run.
#[derive(Debug)]
pub enum CliError {
    /// Router files could not be read or written.
    Store(StoreError),
    /// The registry or DNS could not be queried during validation.
    Collaborator(CollaboratorError),
    /// A registry lookup failed.
    Registry(RegistryError),
    /// The registry client could not be set up.
    Client(ClientError),
    /// Invalid argument.
    InvalidArgument(String),
    /// Output formatting error.
    Format(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(e) => write!(f, "storage error: {e}"),
            Self::Collaborator(e) => write!(f, "validation aborted: {e}"),
            Self::Registry(e) => write!(f, "registry error: {e}"),
            Self::Client(e) => write!(f, "configuration error: {e}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::Collaborator(e) => Some(e),
            Self::Registry(e) => Some(e),
            Self::Client(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::InvalidArgument(_) | Self::Format(_) => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<CollaboratorError> for CliError {
    fn from(err: CollaboratorError) -> Self {
        Self::Collaborator(err)
    }
}

impl From<RegistryError> for CliError {
    fn from(err: RegistryError) -> Self {
        Self::Registry(err)
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        Self::Client(err)
    }
}
