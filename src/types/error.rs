use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias used throughout the bridge.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Kind of entity a failed exact-name lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    /// Cursor column label or ordinal.
    Column,
    /// Stored function in the engine's function registry.
    Function,
    /// Statement parameter slot.
    Parameter,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKind::Column => write!(f, "column"),
            LookupKind::Function => write!(f, "function"),
            LookupKind::Parameter => write!(f, "parameter"),
        }
    }
}

/// Errors surfaced by the relational bridge.
///
/// Introspection calls prefer empty row-sets over errors, so `NotFound` is only
/// produced by lookups that name one exact entity.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The engine's command parser rejected the command text.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// A named column, function or parameter does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// What was looked up.
        kind: LookupKind,
        /// Label, ordinal or name that was not found.
        name: String,
    },
    /// Operation attempted on a closed statement, cursor or connection.
    #[error("{0} already closed")]
    Closed(&'static str),
    /// Cursor is not positioned on a row.
    #[error("cursor is not positioned on a row")]
    NoCurrentRow,
    /// Stored value cannot be represented as the requested type.
    #[error("cannot read {value} as {target}")]
    Conversion {
        /// Display form of the stored value.
        value: String,
        /// Requested type.
        target: &'static str,
    },
    /// Caller supplied an invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The engine failed while executing a well-formed command.
    #[error("engine error: {0}")]
    Engine(String),
    /// A batch entry failed; the remaining entries were not executed.
    #[error("batch entry {index} failed: {source}")]
    Batch {
        /// Zero-based position of the failing entry.
        index: usize,
        /// Failure of that entry.
        #[source]
        source: Box<BridgeError>,
    },
    /// Configuration could not be parsed.
    #[error("failed to parse bridge options {origin}: {source}")]
    Config {
        /// Where the options came from (a path or `<inline>`).
        origin: String,
        /// Parser error.
        #[source]
        source: toml::de::Error,
    },
    /// Configuration file could not be read.
    #[error("failed to read bridge options {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl BridgeError {
    pub(crate) fn not_found(kind: LookupKind, name: impl Into<String>) -> Self {
        BridgeError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn conversion(value: impl fmt::Display, target: &'static str) -> Self {
        BridgeError::Conversion {
            value: value.to_string(),
            target,
        }
    }

    /// Returns a machine-readable code for the error variant.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::Syntax(_) => "Syntax",
            BridgeError::NotFound { .. } => "NotFound",
            BridgeError::Closed(_) => "Closed",
            BridgeError::NoCurrentRow => "NoCurrentRow",
            BridgeError::Conversion { .. } => "Conversion",
            BridgeError::InvalidArgument(_) => "InvalidArgument",
            BridgeError::Engine(_) => "Engine",
            BridgeError::Batch { .. } => "Batch",
            BridgeError::Config { .. } => "Config",
            BridgeError::Io { .. } => "Io",
        }
    }

    /// Returns the SQLSTATE class a relational client expects for this failure.
    pub fn sql_state(&self) -> &'static str {
        match self {
            BridgeError::Syntax(_) => "42000",
            BridgeError::NotFound {
                kind: LookupKind::Column,
                ..
            } => "42S22",
            BridgeError::NotFound { .. } => "42000",
            BridgeError::Closed(_) | BridgeError::NoCurrentRow => "24000",
            BridgeError::Conversion { .. } => "22018",
            BridgeError::InvalidArgument(_) => "HY009",
            BridgeError::Batch { source, .. } => source.sql_state(),
            BridgeError::Engine(_) | BridgeError::Config { .. } | BridgeError::Io { .. } => {
                "HY000"
            }
        }
    }
}
