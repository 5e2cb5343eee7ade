//! ASN lookup command implementation.

use std::io::Write;

use dn42_validation::{asn_token, AsnRegistry};

use crate::commands::Outcome;
use crate::error::CliError;
use crate::output::{AsnInfo, OutputFormat};

/// ASN command executor.
pub struct AsnCommand;

impl AsnCommand {
    /// Create a new ASN command.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Execute the ASN command.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry lookup fails or output fails.
    pub fn execute<W, R>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        registry: &R,
        asn: u32,
    ) -> Result<Outcome, CliError>
    where
        W: Write,
        R: AsnRegistry + ?Sized,
    {
        let aut_num = registry.lookup_asn(asn)?;
        format.write(writer, &AsnInfo::new(asn_token(asn), aut_num))?;
        Ok(Outcome::Clean)
    }
}

impl Default for AsnCommand {
    fn default() -> Self {
        Self::new()
    }
}
