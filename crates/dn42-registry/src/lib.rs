//! Network collaborators for DN42 peer validation.
//!
//! - [`RegistryClient`]: the registry explorer HTTP API, implementing
//!   [`dn42_validation::AsnRegistry`]
//! - [`SystemResolver`]: hostname resolution through the system DNS
//!   configuration, implementing [`dn42_validation::DnsResolver`]
//!
//! Both are blocking; a validation run is single-threaded.
//!
//! # Example
//!
//! ```rust,no_run
//! use dn42_registry::{RegistryClient, SystemResolver, DEFAULT_REGISTRY_URL};
//! use dn42_validation::PeerValidator;
//!
//! # fn example() -> dn42_registry::Result<()> {
//! let registry = RegistryClient::new(DEFAULT_REGISTRY_URL)?;
//! let validator = PeerValidator::new(registry, SystemResolver::new());
//! # let _ = validator;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod dns;
pub mod error;

pub use client::{parse_aut_num, parse_aut_num_list, RegistryClient, DEFAULT_REGISTRY_URL, DEFAULT_TIMEOUT};
pub use dns::SystemResolver;
pub use error::{ClientError, Result};
