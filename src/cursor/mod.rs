#![forbid(unsafe_code)]

//! Forward-only cursor over a materialised row-set.
//!
//! Rows are pulled into memory when the cursor is built; positioning never
//! goes back to the engine. Columns can be addressed by 1-based ordinal or by
//! label. Label lookups are served from a map built on first use: the row
//! shape is fixed at construction, so the map is never rebuilt.

mod metadata;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::engine::EngineSession;
use crate::types::{BridgeError, LookupKind, Record, Result, Value, CLASS_FIELD, RID_FIELD};

use metadata::ColumnOwner;
pub use metadata::CursorMetadata;

/// Reference to a cursor column: a 1-based ordinal or a label.
///
/// Labels also reach the `@class` and `@rid` pseudo-fields of the current row
/// when no declared column carries that label.
pub trait ColumnIndex {
    /// Resolves the reference to the label of the field to read.
    fn label(&self, cursor: &mut Cursor) -> Result<String>;
}

impl ColumnIndex for usize {
    fn label(&self, cursor: &mut Cursor) -> Result<String> {
        if *self == 0 || *self > cursor.columns.len() {
            return Err(BridgeError::not_found(LookupKind::Column, self.to_string()));
        }
        Ok(cursor.columns[*self - 1].clone())
    }
}

impl ColumnIndex for i32 {
    fn label(&self, cursor: &mut Cursor) -> Result<String> {
        let ordinal = usize::try_from(*self)
            .map_err(|_| BridgeError::not_found(LookupKind::Column, self.to_string()))?;
        ordinal.label(cursor)
    }
}

impl ColumnIndex for &str {
    fn label(&self, cursor: &mut Cursor) -> Result<String> {
        match cursor.find_column(self) {
            Ok(_) => Ok((*self).to_owned()),
            Err(BridgeError::NotFound { .. }) if matches!(*self, CLASS_FIELD | RID_FIELD) => {
                Ok((*self).to_owned())
            }
            Err(err) => Err(err),
        }
    }
}

impl ColumnIndex for &String {
    fn label(&self, cursor: &mut Cursor) -> Result<String> {
        self.as_str().label(cursor)
    }
}

/// Materialised, forward-only row-set.
pub struct Cursor {
    columns: Vec<String>,
    rows: Vec<Record>,
    /// 0 = before first, `rows.len() + 1` = after last.
    position: usize,
    column_index: Option<HashMap<String, usize>>,
    /// Resolved owning class and declared property per ordinal.
    column_owners: HashMap<usize, Option<ColumnOwner>>,
    session: Option<Arc<dyn EngineSession>>,
    was_null: bool,
    closed: bool,
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("position", &self.position)
            .field("closed", &self.closed)
            .finish()
    }
}

impl Cursor {
    /// Wraps rows whose column set is `columns`.
    ///
    /// `session` is used by [`CursorMetadata`] to resolve the schema class that
    /// declares each column; synthetic row-sets pass `None`.
    pub fn new(
        columns: Vec<String>,
        rows: Vec<Record>,
        session: Option<Arc<dyn EngineSession>>,
    ) -> Self {
        Self {
            columns,
            rows,
            position: 0,
            column_index: None,
            column_owners: HashMap::new(),
            session,
            was_null: false,
            closed: false,
        }
    }

    /// Wraps synthetic catalog rows laid out as `layout`.
    pub(crate) fn from_layout(layout: &[&str], rows: Vec<Record>) -> Self {
        let columns = layout.iter().map(|column| (*column).to_owned()).collect();
        Self::new(columns, rows, None)
    }

    /// Column labels in ordinal order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of materialised rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the row-set is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(BridgeError::Closed("cursor"));
        }
        Ok(())
    }

    fn on_row(&self) -> bool {
        self.position >= 1 && self.position <= self.rows.len()
    }

    /// Advances to the next row. Returns false once the cursor is exhausted.
    pub fn next(&mut self) -> Result<bool> {
        self.ensure_open()?;
        if self.position <= self.rows.len() {
            self.position += 1;
        }
        Ok(self.on_row())
    }

    /// Moves to the first row, if there is one.
    pub fn first(&mut self) -> Result<bool> {
        self.ensure_open()?;
        if self.rows.is_empty() {
            return Ok(false);
        }
        self.position = 1;
        Ok(true)
    }

    /// Moves to the last row, if there is one.
    pub fn last(&mut self) -> Result<bool> {
        self.ensure_open()?;
        if self.rows.is_empty() {
            return Ok(false);
        }
        self.position = self.rows.len();
        Ok(true)
    }

    /// Moves before the first row.
    pub fn before_first(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.position = 0;
        Ok(())
    }

    /// Moves after the last row.
    pub fn after_last(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.position = self.rows.len() + 1;
        Ok(())
    }

    /// Moves to an absolute row. Negative rows count back from the end
    /// (`-1` is the last row); positions past either end clamp to
    /// before-first / after-last.
    pub fn absolute(&mut self, row: i64) -> Result<bool> {
        self.ensure_open()?;
        let len = self.rows.len() as i64;
        let target = if row >= 0 { row } else { len + 1 + row };
        self.position = target.clamp(0, len + 1) as usize;
        Ok(self.on_row())
    }

    /// Current 1-based row number, or 0 when not on a row.
    pub fn row(&self) -> usize {
        if self.on_row() {
            self.position
        } else {
            0
        }
    }

    /// Whether the cursor sits before a non-empty row-set.
    pub fn is_before_first(&self) -> bool {
        !self.rows.is_empty() && self.position == 0
    }

    /// Whether the cursor has run past a non-empty row-set.
    pub fn is_after_last(&self) -> bool {
        !self.rows.is_empty() && self.position > self.rows.len()
    }

    /// Whether the cursor is on the first row.
    pub fn is_first(&self) -> bool {
        !self.rows.is_empty() && self.position == 1
    }

    /// Whether the cursor is on the last row.
    pub fn is_last(&self) -> bool {
        !self.rows.is_empty() && self.position == self.rows.len()
    }

    /// Releases the rows. Every later operation fails with `Closed`.
    pub fn close(&mut self) {
        self.closed = true;
        self.rows.clear();
        self.position = 0;
    }

    /// Whether [`Self::close`] was called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Resolves a column label to its 1-based ordinal.
    pub fn find_column(&mut self, label: &str) -> Result<usize> {
        self.ensure_open()?;
        let index = self.column_index.get_or_insert_with(|| {
            trace!(columns = self.columns.len(), "cursor.column_index.build");
            let mut index = HashMap::with_capacity(self.columns.len());
            for (pos, column) in self.columns.iter().enumerate() {
                index.entry(column.clone()).or_insert(pos + 1);
            }
            index
        });
        index
            .get(label)
            .copied()
            .ok_or_else(|| BridgeError::not_found(LookupKind::Column, label))
    }

    /// Whether the last value read was null.
    pub fn was_null(&self) -> bool {
        self.was_null
    }

    /// Record the cursor is positioned on.
    pub fn current(&self) -> Result<&Record> {
        self.ensure_open()?;
        if !self.on_row() {
            return Err(BridgeError::NoCurrentRow);
        }
        Ok(&self.rows[self.position - 1])
    }

    /// Reads a column of the current row. Missing fields read as null.
    pub fn get_value(&mut self, column: impl ColumnIndex) -> Result<Value> {
        let label = column.label(self)?;
        let value = self
            .current()?
            .attribute(&label)
            .map_or(Value::Null, |value| value.into_owned());
        self.was_null = value.is_null();
        Ok(value)
    }

    fn get_non_null(&mut self, column: impl ColumnIndex) -> Result<Option<Value>> {
        let value = self.get_value(column)?;
        Ok((!value.is_null()).then_some(value))
    }

    /// Reads a column as text. Non-string values use their display form
    /// (bytes as lowercase hex).
    pub fn get_string(&mut self, column: impl ColumnIndex) -> Result<Option<String>> {
        Ok(self.get_non_null(column)?.map(|value| match value {
            Value::String(s) => s,
            other => other.to_string(),
        }))
    }

    /// Reads a column as `i64`. Floats truncate, strings are parsed, dates
    /// give their epoch offset.
    pub fn get_long(&mut self, column: impl ColumnIndex) -> Result<Option<i64>> {
        self.get_non_null(column)?.map(to_long).transpose()
    }

    /// Like [`Self::get_long`], failing when the value does not fit an `i32`.
    pub fn get_int(&mut self, column: impl ColumnIndex) -> Result<Option<i32>> {
        self.get_long(column)?
            .map(|long| i32::try_from(long).map_err(|_| BridgeError::conversion(long, "int")))
            .transpose()
    }

    /// Reads a column as `f64`.
    pub fn get_double(&mut self, column: impl ColumnIndex) -> Result<Option<f64>> {
        self.get_non_null(column)?
            .map(|value| match value {
                Value::Float(v) => Ok(v),
                Value::Int(v) => Ok(v as f64),
                Value::Bool(v) => Ok(if v { 1.0 } else { 0.0 }),
                Value::String(ref s) => s
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| BridgeError::conversion(&value, "double")),
                other => Err(BridgeError::conversion(other, "double")),
            })
            .transpose()
    }

    /// Reads a column as a boolean. Integers are true when non-zero; strings
    /// accept `true`/`false`/`1`/`0`.
    pub fn get_bool(&mut self, column: impl ColumnIndex) -> Result<Option<bool>> {
        self.get_non_null(column)?
            .map(|value| match value {
                Value::Bool(v) => Ok(v),
                Value::Int(v) => Ok(v != 0),
                Value::String(ref s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" => Ok(true),
                    "false" | "0" => Ok(false),
                    _ => Err(BridgeError::conversion(&value, "bool")),
                },
                other => Err(BridgeError::conversion(other, "bool")),
            })
            .transpose()
    }

    /// Reads a binary column. Strings yield their UTF-8 bytes.
    pub fn get_bytes(&mut self, column: impl ColumnIndex) -> Result<Option<Vec<u8>>> {
        self.get_non_null(column)?
            .map(|value| match value {
                Value::Bytes(v) => Ok(v),
                Value::String(s) => Ok(s.into_bytes()),
                other => Err(BridgeError::conversion(other, "bytes")),
            })
            .transpose()
    }

    /// Column metadata view.
    pub fn metadata(&mut self) -> CursorMetadata<'_> {
        CursorMetadata::new(self)
    }
}

fn to_long(value: Value) -> Result<i64> {
    match value {
        Value::Int(v) => Ok(v),
        Value::Float(v) if v.is_finite() => Ok(v.trunc() as i64),
        Value::Bool(v) => Ok(i64::from(v)),
        Value::Date(v) => Ok(i64::from(v)),
        Value::DateTime(v) => Ok(v),
        Value::String(ref s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| BridgeError::conversion(&value, "long")),
        other => Err(BridgeError::conversion(other, "long")),
    }
}
