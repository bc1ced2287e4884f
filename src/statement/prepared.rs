use std::sync::Arc;

use crate::cursor::Cursor;
use crate::engine::EngineSession;
use crate::types::{BridgeError, LookupKind, Result, Value};

use super::Statement;

/// Highest parameter index a prepared statement accepts.
pub const MAX_PARAMETERS: usize = u16::MAX as usize;

/// Statement with fixed command text and 1-based positional parameters.
///
/// Parameters stay bound across executions until replaced or cleared.
pub struct PreparedStatement {
    statement: Statement,
    text: String,
    parameters: Vec<Option<Value>>,
}

impl PreparedStatement {
    pub(crate) fn new(session: Arc<dyn EngineSession>, text: impl Into<String>) -> Self {
        Self {
            statement: Statement::new(session),
            text: text.into(),
            parameters: Vec::new(),
        }
    }

    /// Command text fixed at preparation.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Binds parameter `index` (1-based, at most [`MAX_PARAMETERS`]).
    pub fn set_value(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        self.statement.ensure_open()?;
        if index == 0 || index > MAX_PARAMETERS {
            return Err(BridgeError::not_found(
                LookupKind::Parameter,
                index.to_string(),
            ));
        }
        if self.parameters.len() < index {
            self.parameters.resize(index, None);
        }
        self.parameters[index - 1] = Some(value.into());
        Ok(())
    }

    /// Binds a string.
    pub fn set_string(&mut self, index: usize, value: &str) -> Result<()> {
        self.set_value(index, value)
    }

    /// Binds a 32-bit integer.
    pub fn set_int(&mut self, index: usize, value: i32) -> Result<()> {
        self.set_value(index, value)
    }

    /// Binds a 64-bit integer.
    pub fn set_long(&mut self, index: usize, value: i64) -> Result<()> {
        self.set_value(index, value)
    }

    /// Binds a boolean.
    pub fn set_bool(&mut self, index: usize, value: bool) -> Result<()> {
        self.set_value(index, value)
    }

    /// Binds null.
    pub fn set_null(&mut self, index: usize) -> Result<()> {
        self.set_value(index, Value::Null)
    }

    /// Unbinds every parameter.
    pub fn clear_parameters(&mut self) {
        self.parameters.clear();
    }

    fn bound(&self) -> Result<Vec<Value>> {
        self.parameters
            .iter()
            .enumerate()
            .map(|(pos, slot)| {
                slot.clone().ok_or_else(|| {
                    BridgeError::InvalidArgument(format!("parameter {} is not bound", pos + 1))
                })
            })
            .collect()
    }

    /// Executes with the bound parameters. Returns true for a row-set.
    pub fn execute(&mut self) -> Result<bool> {
        let args = self.bound()?;
        self.statement.execute_with(&self.text, &args)
    }

    /// Executes with the bound parameters and returns the row-set.
    pub fn execute_query(&mut self) -> Result<Cursor> {
        let args = self.bound()?;
        self.statement.execute_query_with(&self.text, &args)
    }

    /// Executes with the bound parameters and returns the affected count.
    pub fn execute_update(&mut self) -> Result<i64> {
        let args = self.bound()?;
        self.statement.execute_update_with(&self.text, &args)
    }

    /// Queues the command with the currently bound parameters.
    pub fn add_batch(&mut self) -> Result<()> {
        let args = self.bound()?;
        self.statement.ensure_open()?;
        self.statement.batch.push(self.text.clone(), args);
        Ok(())
    }

    /// Drops every queued execution.
    pub fn clear_batch(&mut self) {
        self.statement.clear_batch();
    }

    /// See [`Statement::execute_batch`].
    pub fn execute_batch(&mut self) -> Result<Vec<i64>> {
        self.statement.execute_batch()
    }

    /// See [`Statement::result_set`].
    pub fn result_set(&mut self) -> Result<Option<Cursor>> {
        self.statement.result_set()
    }

    /// See [`Statement::update_count`].
    pub fn update_count(&mut self) -> Result<Option<i64>> {
        self.statement.update_count()
    }

    /// See [`Statement::more_results`].
    pub fn more_results(&mut self) -> Result<bool> {
        self.statement.more_results()
    }

    /// Closes the statement and unbinds every parameter.
    pub fn close(&mut self) {
        self.parameters.clear();
        self.statement.close();
    }

    /// Whether [`Self::close`] was called.
    pub fn is_closed(&self) -> bool {
        self.statement.is_closed()
    }
}
