//! Relational type codes and the engine type mapping.

use crate::engine::EngineType;
use crate::types::Value;

/// Relational type codes, numbered as relational clients expect them.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SqlType {
    TinyInt = -6,
    BigInt = -5,
    Binary = -2,
    Null = 0,
    Decimal = 3,
    Integer = 4,
    SmallInt = 5,
    Float = 6,
    Double = 8,
    Varchar = 12,
    Boolean = 16,
    Date = 91,
    Timestamp = 93,
    Other = 1111,
    JavaObject = 2000,
    Struct = 2002,
    Array = 2003,
}

impl SqlType {
    /// Numeric type code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Maps an engine type tag to its relational type. Total over [`EngineType`].
    pub fn from_engine(ty: EngineType) -> Self {
        match ty {
            EngineType::Boolean => SqlType::Boolean,
            EngineType::Byte => SqlType::TinyInt,
            EngineType::Short => SqlType::SmallInt,
            EngineType::Integer => SqlType::Integer,
            EngineType::Long => SqlType::BigInt,
            EngineType::Float => SqlType::Float,
            EngineType::Double => SqlType::Double,
            EngineType::Decimal => SqlType::Decimal,
            EngineType::String => SqlType::Varchar,
            EngineType::Binary => SqlType::Binary,
            EngineType::Date => SqlType::Date,
            EngineType::DateTime => SqlType::Timestamp,
            EngineType::Link => SqlType::JavaObject,
            EngineType::LinkList | EngineType::LinkSet => SqlType::Array,
            EngineType::LinkMap => SqlType::JavaObject,
            EngineType::Embedded => SqlType::Struct,
            EngineType::EmbeddedList | EngineType::EmbeddedSet => SqlType::Array,
            EngineType::EmbeddedMap => SqlType::JavaObject,
            EngineType::Custom | EngineType::Any => SqlType::Other,
        }
    }

    /// Infers a relational type from a stored value when no schema type exists.
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Null => SqlType::Null,
            Value::Bool(_) => SqlType::Boolean,
            Value::Int(_) => SqlType::BigInt,
            Value::Float(_) => SqlType::Double,
            Value::String(_) => SqlType::Varchar,
            Value::Bytes(_) => SqlType::Binary,
            Value::Date(_) => SqlType::Date,
            Value::DateTime(_) => SqlType::Timestamp,
            Value::Link(_) => SqlType::JavaObject,
            Value::List(_) => SqlType::Array,
        }
    }
}
