use tracing::debug;

use crate::types::{BridgeError, Result, Value};

use super::Statement;

#[derive(Debug)]
struct BatchEntry {
    text: String,
    args: Vec<Value>,
}

/// Commands queued for [`Statement::execute_batch`].
#[derive(Debug, Default)]
pub(super) struct Batch {
    entries: Vec<BatchEntry>,
}

impl Batch {
    pub(super) fn push(&mut self, text: String, args: Vec<Value>) {
        self.entries.push(BatchEntry { text, args });
    }

    pub(super) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Statement {
    /// Queues `text` for the next [`Statement::execute_batch`].
    pub fn add_batch(&mut self, text: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        self.batch.push(text.into(), Vec::new());
        Ok(())
    }

    /// Drops every queued command.
    pub fn clear_batch(&mut self) {
        self.batch.clear();
    }

    /// Runs the queued commands in order through `execute_update` and returns
    /// one count per command.
    ///
    /// The queue is emptied whether or not the batch succeeds. The first
    /// failing command stops the batch; its position is carried by
    /// [`BridgeError::Batch`].
    pub fn execute_batch(&mut self) -> Result<Vec<i64>> {
        self.ensure_open()?;
        let entries = std::mem::take(&mut self.batch.entries);
        let mut counts = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let count = self
                .execute_update_with(&entry.text, &entry.args)
                .map_err(|source| BridgeError::Batch {
                    index,
                    source: Box::new(source),
                })?;
            counts.push(count);
        }
        debug!(commands = counts.len(), "statement.execute_batch");
        Ok(counts)
    }
}
