//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use serde::Serialize;

use dn42_validation::{AutNum, ValidationError};

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as human-readable text.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// One finding located in a router file.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// Router file path as given on the command line.
    pub file: String,
    /// 1-based line of the peer, if known.
    pub line: Option<usize>,
    /// Router id.
    pub router: String,
    /// Peer name, or `<unnamed>`.
    pub peer: String,
    /// The finding itself.
    pub error: ValidationError,
}

impl Finding {
    /// `<file>:<line>`, or just the file when the line is unknown.
    #[must_use]
    pub fn location(&self) -> String {
        match self.line {
            Some(line) => format!("{}:{line}", self.file),
            None => self.file.clone(),
        }
    }

    /// GitHub Actions error annotation for this finding.
    #[must_use]
    pub fn annotation(&self) -> String {
        let mut props = format!("file={}", self.file);
        if let Some(line) = self.line {
            props.push_str(&format!(",line={line}"));
        }
        format!("::error {props},title=Validation Error::{}", self.error)
    }
}

/// Result of a validation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationSummary {
    /// Number of router files checked.
    pub routers: usize,
    /// Number of peers checked.
    pub peers: usize,
    /// Every finding, in router and peer order.
    pub findings: Vec<Finding>,
}

impl ValidationSummary {
    /// Whether the run found nothing.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

impl TableDisplay for ValidationSummary {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        for finding in &self.findings {
            writeln!(writer, "{} {}", finding.location(), finding.error)?;
        }
        Ok(())
    }
}

/// A peer removed by pruning.
#[derive(Debug, Clone, Serialize)]
pub struct RemovedPeer {
    /// Peer name, or `<unnamed>`.
    pub name: String,
    /// Why it was removed.
    pub reasons: Vec<String>,
}

/// Peers removed from one router.
#[derive(Debug, Clone, Serialize)]
pub struct RouterPrune {
    /// Router id.
    pub router: String,
    /// Removed peers, in file order.
    pub removed: Vec<RemovedPeer>,
}

/// Result of a prune run; only routers that lost peers are listed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PruneReport {
    /// Routers with removed peers.
    pub routers: Vec<RouterPrune>,
}

impl TableDisplay for PruneReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "============ PRUNE REPORT ============")?;
        if self.routers.is_empty() {
            writeln!(writer, "No changes.")?;
            return Ok(());
        }
        for router in &self.routers {
            writeln!(writer, "### {}", router.router)?;
            for peer in &router.removed {
                writeln!(writer, "- {}", peer.name)?;
                for reason in &peer.reasons {
                    writeln!(writer, "  * {reason}")?;
                }
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}

/// Registry details for an ASN.
#[derive(Debug, Clone, Serialize)]
pub struct AsnInfo {
    /// `AS<number>` token.
    pub asn: String,
    /// The `as-name` attribute.
    pub as_name: Option<String>,
    /// The `descr` attribute.
    pub description: Option<String>,
}

impl AsnInfo {
    /// Build from a registry object.
    #[must_use]
    pub fn new(asn: String, aut_num: AutNum) -> Self {
        Self {
            asn,
            as_name: aut_num.as_name,
            description: aut_num.description,
        }
    }
}

impl TableDisplay for AsnInfo {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "{}", self.asn)?;
        writeln!(writer, "  AS-NAME:      {}", self.as_name.as_deref().unwrap_or(""))?;
        writeln!(writer, "  Description:  {}", self.description.as_deref().unwrap_or(""))?;
        Ok(())
    }
}

/// Findings that block adding a peer.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    /// Router the peer was meant for.
    pub router: String,
    /// Every finding for the new peer.
    pub errors: Vec<ValidationError>,
}

impl TableDisplay for Rejection {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        for error in &self.errors {
            writeln!(writer, "ERROR: {error}")?;
        }
        writeln!(writer, "Peer not added to {}.yml", self.router)?;
        Ok(())
    }
}

/// Simple message output.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Message text.
    pub message: String,
    /// Whether this is a success message.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub success: bool,
}

impl Message {
    /// Create a success message.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }
}

impl TableDisplay for Message {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.success {
            writeln!(writer, "✓ {}", self.message)?;
        } else {
            writeln!(writer, "{}", self.message)?;
        }
        Ok(())
    }
}
