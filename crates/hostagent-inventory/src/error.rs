//! Error types for hostagent-inventory

use hostagent_exec::ExecError;
use thiserror::Error;

/// A gatherer's output could not be turned into a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarshalError {
    /// A numeric column or value did not convert
    #[error("invalid {field} value {token:?}: {reason}")]
    Conversion {
        /// Name of the field being read
        field: &'static str,
        /// The offending token, verbatim
        token: String,
        /// Conversion failure reported by the number parser
        reason: String,
    },
}

/// Errors that can occur while collecting one fact or building the document
#[derive(Error, Debug, Clone)]
pub enum InventoryError {
    /// The gatherer could not be run or exited unsuccessfully
    #[error("{fact} gatherer failed: {source}")]
    Gatherer {
        /// Fact category (`host`, `filesystem`, ...)
        fact: &'static str,
        /// Underlying execution error
        #[source]
        source: ExecError,
    },

    /// The gatherer ran but its output did not parse
    #[error("{fact} output did not parse: {source}")]
    Marshal {
        /// Fact category (`host`, `filesystem`, ...)
        fact: &'static str,
        /// Underlying parse error
        #[source]
        source: MarshalError,
    },

    /// The host fact parsed but carried no hostname
    #[error("host fact reported no hostname")]
    MissingHostname,
}

impl InventoryError {
    /// Fact category the error belongs to
    #[must_use]
    pub fn fact(&self) -> &'static str {
        match self {
            InventoryError::Gatherer { fact, .. } | InventoryError::Marshal { fact, .. } => fact,
            InventoryError::MissingHostname => "host",
        }
    }
}
