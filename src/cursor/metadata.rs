use std::collections::HashSet;

use tracing::trace;

use crate::catalog::SqlType;
use crate::engine::Property;
use crate::types::{BridgeError, LookupKind, Result};

use super::Cursor;

/// Class declaring a column, with its property when the schema has one.
pub(super) type ColumnOwner = (String, Option<Property>);

/// Column descriptions of a [`Cursor`].
///
/// The owning class of a column is the schema class that declares it: the
/// class of the rows carrying the field, or the nearest super-class declaring
/// the property. Resolutions are cached on the cursor per ordinal.
pub struct CursorMetadata<'a> {
    cursor: &'a mut Cursor,
}

impl<'a> CursorMetadata<'a> {
    pub(super) fn new(cursor: &'a mut Cursor) -> Self {
        Self { cursor }
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.cursor.columns.len()
    }

    fn check(&self, ordinal: usize) -> Result<()> {
        if ordinal == 0 || ordinal > self.cursor.columns.len() {
            return Err(BridgeError::not_found(
                LookupKind::Column,
                ordinal.to_string(),
            ));
        }
        Ok(())
    }

    /// Label of a 1-based column.
    pub fn column_label(&self, ordinal: usize) -> Result<&str> {
        self.check(ordinal)?;
        Ok(&self.cursor.columns[ordinal - 1])
    }

    /// Class owning a 1-based column, if any row carries a class.
    pub fn table_name(&mut self, ordinal: usize) -> Result<Option<String>> {
        Ok(self.owner(ordinal)?.map(|(owner, _)| owner))
    }

    /// Owner of a column, resolved once per ordinal.
    fn owner(&mut self, ordinal: usize) -> Result<Option<ColumnOwner>> {
        self.check(ordinal)?;
        if let Some(cached) = self.cursor.column_owners.get(&ordinal) {
            return Ok(cached.clone());
        }
        let resolved = self.resolve_owner(ordinal)?;
        trace!(
            ordinal,
            owner = ?resolved.as_ref().map(|(owner, _)| owner),
            "cursor.metadata.owner"
        );
        self.cursor.column_owners.insert(ordinal, resolved.clone());
        Ok(resolved)
    }

    /// Relational type of a 1-based column.
    ///
    /// Uses the declared property type when the schema has one, otherwise
    /// infers it from the first non-null value in the column.
    pub fn column_type(&mut self, ordinal: usize) -> Result<SqlType> {
        if let Some((_, Some(property))) = self.owner(ordinal)? {
            return Ok(SqlType::from_engine(property.ty));
        }
        let label = &self.cursor.columns[ordinal - 1];
        let inferred = self
            .cursor
            .rows
            .iter()
            .filter_map(|row| row.attribute(label))
            .find(|value| !value.is_null())
            .map_or(SqlType::Null, |value| SqlType::infer(&value));
        Ok(inferred)
    }

    /// Whether a 1-based column is declared mandatory. `None` when the schema
    /// says nothing about it.
    pub fn is_nullable(&mut self, ordinal: usize) -> Result<Option<bool>> {
        Ok(self
            .owner(ordinal)?
            .and_then(|(_, property)| property)
            .map(|property| !property.not_null))
    }

    /// Finds the row class for a column and walks the super-class chain to the
    /// class declaring the property.
    fn resolve_owner(&self, ordinal: usize) -> Result<Option<ColumnOwner>> {
        let label = &self.cursor.columns[ordinal - 1];
        let row_class = self
            .cursor
            .rows
            .iter()
            .filter(|row| row.contains(label))
            .chain(self.cursor.rows.iter())
            .find_map(|row| row.class_name());
        let Some(row_class) = row_class else {
            return Ok(None);
        };
        let Some(session) = self.cursor.session.as_ref() else {
            return Ok(Some((row_class.to_owned(), None)));
        };

        let mut visited = HashSet::new();
        let mut next = Some(row_class.to_owned());
        while let Some(name) = next.take() {
            if !visited.insert(name.clone()) {
                break;
            }
            let Some(class) = session.class(&name)? else {
                break;
            };
            if let Some(property) = class.property(label) {
                return Ok(Some((class.name.clone(), Some(property.clone()))));
            }
            next = class.super_class.clone();
        }
        Ok(Some((row_class.to_owned(), None)))
    }
}
