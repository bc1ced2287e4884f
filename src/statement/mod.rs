#![forbid(unsafe_code)]

//! Command execution and result classification.
//!
//! A [`Statement`] hands command text to the engine's single entry point and
//! sorts whatever comes back into either a row-set or an update count. The
//! outcome is held until fetched once; fetching moves it out.

mod batch;
mod prepared;

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cursor::Cursor;
use crate::engine::{CommandOutput, EngineSession};
use crate::types::{BridgeError, Record, Result, Value};

pub use prepared::{PreparedStatement, MAX_PARAMETERS};

/// Outcome of the last execution, waiting to be fetched.
#[derive(Debug, Default)]
enum ExecutionState {
    #[default]
    Empty,
    Rows(Cursor),
    Count(i64),
}

/// Executes command text against a bound engine session.
pub struct Statement {
    session: Arc<dyn EngineSession>,
    state: ExecutionState,
    batch: batch::Batch,
    closed: bool,
}

impl Statement {
    pub(crate) fn new(session: Arc<dyn EngineSession>) -> Self {
        Self {
            session,
            state: ExecutionState::Empty,
            batch: batch::Batch::default(),
            closed: false,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(BridgeError::Closed("statement"));
        }
        Ok(())
    }

    /// Executes `text`. Returns true when it produced a row-set.
    pub fn execute(&mut self, text: &str) -> Result<bool> {
        self.execute_with(text, &[])
    }

    /// Executes `text` with positional substitution values.
    pub fn execute_with(&mut self, text: &str, args: &[Value]) -> Result<bool> {
        self.ensure_open()?;
        self.state = ExecutionState::Empty;
        if text.trim().is_empty() {
            return Ok(false);
        }
        let output = self.run(text, args)?;
        self.state = self.classify(text, output)?;
        let produced_rows = matches!(self.state, ExecutionState::Rows(_));
        debug!(
            args = args.len(),
            rows = produced_rows,
            "statement.execute"
        );
        Ok(produced_rows)
    }

    /// Executes `text` and returns its row-set.
    pub fn execute_query(&mut self, text: &str) -> Result<Cursor> {
        self.execute_query_with(text, &[])
    }

    pub(crate) fn execute_query_with(&mut self, text: &str, args: &[Value]) -> Result<Cursor> {
        self.execute_with(text, args)?;
        self.result_set()?.ok_or_else(|| {
            BridgeError::InvalidArgument("command did not produce a row-set".to_owned())
        })
    }

    /// Executes a data-changing command and returns the number of affected
    /// records: 1 for a single returned record, the count for an integer
    /// result, 0 for anything else.
    pub fn execute_update(&mut self, text: &str) -> Result<i64> {
        self.execute_update_with(text, &[])
    }

    pub(crate) fn execute_update_with(&mut self, text: &str, args: &[Value]) -> Result<i64> {
        self.ensure_open()?;
        self.state = ExecutionState::Empty;
        if text.trim().is_empty() {
            return Ok(0);
        }
        let count = match self.run(text, args)? {
            CommandOutput::Record(_) => 1,
            CommandOutput::Count(count) => count,
            _ => 0,
        };
        debug!(args = args.len(), count, "statement.execute_update");
        Ok(count)
    }

    fn run(&self, text: &str, args: &[Value]) -> Result<CommandOutput> {
        self.session.command(text, args).map_err(|err| {
            warn!(error = %err, "statement.command_failed");
            BridgeError::from(err)
        })
    }

    fn classify(&self, text: &str, output: CommandOutput) -> Result<ExecutionState> {
        Ok(match output {
            CommandOutput::Records(rows) => {
                let columns = match self.session.projections(text)? {
                    Some(projected) if !projected.is_empty() => projected,
                    _ => observed_fields(&rows),
                };
                ExecutionState::Rows(Cursor::new(columns, rows, Some(self.session.clone())))
            }
            CommandOutput::Count(count) => ExecutionState::Count(count),
            CommandOutput::Record(_) => ExecutionState::Count(1),
            CommandOutput::Scalar(value) if !value.is_null() => ExecutionState::Count(1),
            CommandOutput::Scalar(_) | CommandOutput::Nothing => ExecutionState::Count(0),
        })
    }

    /// Takes the pending row-set. A later call, or a pending update count,
    /// yields `None`.
    pub fn result_set(&mut self) -> Result<Option<Cursor>> {
        self.ensure_open()?;
        match std::mem::take(&mut self.state) {
            ExecutionState::Rows(cursor) => Ok(Some(cursor)),
            other => {
                self.state = other;
                Ok(None)
            }
        }
    }

    /// Takes the pending update count. A later call, or a pending row-set,
    /// yields `None`.
    pub fn update_count(&mut self) -> Result<Option<i64>> {
        self.ensure_open()?;
        match std::mem::take(&mut self.state) {
            ExecutionState::Count(count) => Ok(Some(count)),
            other => {
                self.state = other;
                Ok(None)
            }
        }
    }

    /// Discards any pending result. There is never a further result.
    pub fn more_results(&mut self) -> Result<bool> {
        self.ensure_open()?;
        self.state = ExecutionState::Empty;
        Ok(false)
    }

    /// Requests cancellation of the running command. Commands run to
    /// completion on the caller's thread, so this has no effect.
    pub fn cancel(&self) -> Result<()> {
        self.ensure_open()
    }

    /// Releases the pending result and the batch queue.
    pub fn close(&mut self) {
        self.state = ExecutionState::Empty;
        self.batch.clear();
        self.closed = true;
    }

    /// Whether [`Self::close`] was called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Union of field names across `rows`, in first-seen order.
fn observed_fields(rows: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for name in rows.iter().flat_map(|row| row.field_names()) {
        if seen.insert(name) {
            columns.push(name.to_owned());
        }
    }
    columns
}
