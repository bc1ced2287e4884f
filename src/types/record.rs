//! Open records: a mapping from field name to [`Value`] whose shape is only
//! known at runtime.

use std::borrow::Cow;

use super::value::Value;

/// Pseudo-field exposing the record's class name.
pub const CLASS_FIELD: &str = "@class";
/// Pseudo-field exposing the record's identity.
pub const RID_FIELD: &str = "@rid";

/// Record returned by the engine or synthesized by the catalog projector.
///
/// Fields keep their insertion order; assigning an existing field replaces its
/// value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    class: Option<String>,
    rid: Option<String>,
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Creates an empty record without a class.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty record belonging to `class`.
    pub fn of_class(class: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            ..Self::default()
        }
    }

    /// Sets a field and returns the record, for chained construction.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets the record identity.
    pub fn with_rid(mut self, rid: impl Into<String>) -> Self {
        self.rid = Some(rid.into());
        self
    }

    /// Assigns `value` to `name`, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Returns a stored field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Returns a stored field or one of the `@class` / `@rid` pseudo-fields.
    pub fn attribute(&self, name: &str) -> Option<Cow<'_, Value>> {
        match name {
            CLASS_FIELD => self
                .class
                .as_ref()
                .map(|class| Cow::Owned(Value::String(class.clone()))),
            RID_FIELD => self
                .rid
                .as_ref()
                .map(|rid| Cow::Owned(Value::Link(rid.clone()))),
            _ => self.get(name).map(Cow::Borrowed),
        }
    }

    /// Returns true when the record stores `name`, even if its value is null.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| field == name)
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(field, _)| field.as_str())
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(field, value)| (field.as_str(), value))
    }

    /// Class the record belongs to, if any.
    pub fn class_name(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// Record identity, if assigned.
    pub fn rid(&self) -> Option<&str> {
        self.rid.as_deref()
    }

    /// Number of stored fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when no fields are stored.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
