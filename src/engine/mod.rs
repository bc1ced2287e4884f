#![forbid(unsafe_code)]

//! Boundary to the underlying document/graph engine.
//!
//! The bridge never opens or closes engine sessions. It is handed an
//! [`EngineSession`] and issues blocking calls against it: command execution,
//! schema reads, index catalog access and function registry lookups. A session
//! is expected to be driven from one thread at a time; binding any
//! thread-local engine context is the caller's job.

/// In-memory reference engine.
pub mod memory;

/// Schema objects exposed by a session.
pub mod schema;

use thiserror::Error;

use crate::types::{BridgeError, Record, Value};

pub use memory::MemoryEngine;
pub use schema::{
    ClusterKind, EngineType, FunctionDef, IndexDef, IndexKind, Property, SchemaClass,
};

/// Result type for engine calls.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Failures reported by an engine session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The command parser rejected the text.
    #[error("{0}")]
    Parse(String),
    /// A class referenced by a command does not exist.
    #[error("class '{0}' not found")]
    UnknownClass(String),
    /// Any other failure while executing a command.
    #[error("{0}")]
    Execution(String),
}

impl From<EngineError> for BridgeError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Parse(message) => BridgeError::Syntax(message),
            other => BridgeError::Engine(other.to_string()),
        }
    }
}

/// Raw value returned by the engine's command entry point.
#[derive(Clone, Debug, PartialEq)]
pub enum CommandOutput {
    /// Sequence of records (queries).
    Records(Vec<Record>),
    /// A single record (inserts).
    Record(Record),
    /// Affected-record count.
    Count(i64),
    /// Some other engine-specific scalar.
    Scalar(Value),
    /// The command returned nothing.
    Nothing,
}

/// Bound engine session handed to the bridge by the connection layer.
pub trait EngineSession: Send + Sync {
    /// Executes command text with positional substitution values.
    fn command(&self, text: &str, args: &[Value]) -> EngineResult<CommandOutput>;
    /// Returns the explicit projection list of a query, in clause order.
    ///
    /// `None` means the text is not a projection query (or projects everything).
    fn projections(&self, text: &str) -> EngineResult<Option<Vec<String>>>;
    /// Lists schema classes in the engine's enumeration order.
    fn classes(&self) -> EngineResult<Vec<SchemaClass>>;
    /// Looks up one class by exact name.
    fn class(&self, name: &str) -> EngineResult<Option<SchemaClass>>;
    /// Reports the storage kind of a cluster.
    fn cluster_kind(&self, cluster_id: u32) -> EngineResult<ClusterKind>;
    /// Indexes of a class as currently known to the loaded index catalog.
    fn class_indexes(&self, class: &str) -> EngineResult<Vec<IndexDef>>;
    /// Reloads the index catalog from storage.
    fn reload_indexes(&self) -> EngineResult<()>;
    /// Names of every stored function.
    fn function_names(&self) -> EngineResult<Vec<String>>;
    /// Looks up one stored function by exact name.
    fn function(&self, name: &str) -> EngineResult<Option<FunctionDef>>;
    /// Name of the database the session is bound to.
    fn database_name(&self) -> String;
    /// URL the session was opened with.
    fn url(&self) -> String;
    /// Name of the authenticated user.
    fn user(&self) -> String;
    /// Engine product name.
    fn product_name(&self) -> String;
    /// Engine product version, e.g. `2.0.3`.
    fn product_version(&self) -> String;
}
