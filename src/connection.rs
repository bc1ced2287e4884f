//! Entry point tying an engine session to statements and catalog queries.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::DatabaseMetadata;
use crate::engine::EngineSession;
use crate::options::BridgeOptions;
use crate::statement::{PreparedStatement, Statement};
use crate::types::{BridgeError, Result};

/// Relational view of one bound engine session.
///
/// Closing the connection does not close the session; its owner does that.
pub struct Connection {
    session: Arc<dyn EngineSession>,
    options: Arc<BridgeOptions>,
    closed: bool,
}

impl Connection {
    /// Wraps a bound session. The session stays owned by the caller's engine.
    pub fn new(session: Arc<dyn EngineSession>, options: BridgeOptions) -> Self {
        debug!(url = %session.url(), user = %session.user(), "connection.open");
        Self {
            session,
            options: Arc::new(options),
            closed: false,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(BridgeError::Closed("connection"));
        }
        Ok(())
    }

    /// Options this connection was opened with.
    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// Creates a statement for ad-hoc command text.
    pub fn create_statement(&self) -> Result<Statement> {
        self.ensure_open()?;
        Ok(Statement::new(self.session.clone()))
    }

    /// Creates a statement bound to `text`, executed with positional parameters.
    pub fn prepare_statement(&self, text: &str) -> Result<PreparedStatement> {
        self.ensure_open()?;
        Ok(PreparedStatement::new(self.session.clone(), text))
    }

    /// Catalog view over the session's live schema.
    pub fn metadata(&self) -> Result<DatabaseMetadata> {
        self.ensure_open()?;
        Ok(DatabaseMetadata::new(
            self.session.clone(),
            self.options.clone(),
        ))
    }

    /// Marks the connection closed. Statements already handed out keep working.
    pub fn close(&mut self) {
        if !self.closed {
            debug!(url = %self.session.url(), "connection.close");
        }
        self.closed = true;
    }

    /// Whether [`Self::close`] was called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
