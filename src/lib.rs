//! Relational client surface over the Sombra document/graph engine.
//!
//! Command text goes through a [`Statement`] to the engine behind an
//! [`EngineSession`]; results come back as an update count or a [`Cursor`].
//! Schema introspection is served by [`DatabaseMetadata`], which projects
//! classes, properties, indexes and stored functions into fixed relational
//! catalog row-sets.

pub mod catalog;
pub mod connection;
pub mod cursor;
pub mod engine;
pub mod logging;
pub mod options;
pub mod statement;
pub mod types;

pub use catalog::{DatabaseMetadata, NamePattern, SqlType};
pub use connection::Connection;
pub use cursor::{ColumnIndex, Cursor, CursorMetadata};
pub use engine::{CommandOutput, EngineError, EngineSession, MemoryEngine};
pub use options::BridgeOptions;
pub use statement::{PreparedStatement, Statement};
pub use types::{BridgeError, LookupKind, Record, Result, Value};
