//! Schema objects reported by an engine session.

use std::fmt;

/// Field type tags an engine schema can declare. Variants are named after the
/// engine's DDL keywords (see [`EngineType::name`]).
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineType {
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    Decimal,
    String,
    Binary,
    Date,
    DateTime,
    Link,
    LinkList,
    LinkSet,
    LinkMap,
    Embedded,
    EmbeddedList,
    EmbeddedSet,
    EmbeddedMap,
    Custom,
    Any,
}

impl EngineType {
    /// Canonical upper-case name, as the engine spells it in DDL.
    pub fn name(self) -> &'static str {
        match self {
            EngineType::Boolean => "BOOLEAN",
            EngineType::Byte => "BYTE",
            EngineType::Short => "SHORT",
            EngineType::Integer => "INTEGER",
            EngineType::Long => "LONG",
            EngineType::Float => "FLOAT",
            EngineType::Double => "DOUBLE",
            EngineType::Decimal => "DECIMAL",
            EngineType::String => "STRING",
            EngineType::Binary => "BINARY",
            EngineType::Date => "DATE",
            EngineType::DateTime => "DATETIME",
            EngineType::Link => "LINK",
            EngineType::LinkList => "LINKLIST",
            EngineType::LinkSet => "LINKSET",
            EngineType::LinkMap => "LINKMAP",
            EngineType::Embedded => "EMBEDDED",
            EngineType::EmbeddedList => "EMBEDDEDLIST",
            EngineType::EmbeddedSet => "EMBEDDEDSET",
            EngineType::EmbeddedMap => "EMBEDDEDMAP",
            EngineType::Custom => "CUSTOM",
            EngineType::Any => "ANY",
        }
    }

    /// Parses a DDL type name, ignoring case.
    pub fn parse(raw: &str) -> Option<Self> {
        const ALL: [EngineType; 22] = [
            EngineType::Boolean,
            EngineType::Byte,
            EngineType::Short,
            EngineType::Integer,
            EngineType::Long,
            EngineType::Float,
            EngineType::Double,
            EngineType::Decimal,
            EngineType::String,
            EngineType::Binary,
            EngineType::Date,
            EngineType::DateTime,
            EngineType::Link,
            EngineType::LinkList,
            EngineType::LinkSet,
            EngineType::LinkMap,
            EngineType::Embedded,
            EngineType::EmbeddedList,
            EngineType::EmbeddedSet,
            EngineType::EmbeddedMap,
            EngineType::Custom,
            EngineType::Any,
        ];
        ALL.into_iter()
            .find(|ty| ty.name().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared property of a schema class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    /// Field name.
    pub name: String,
    /// Declared engine type.
    pub ty: EngineType,
    /// Whether the field is mandatory.
    pub not_null: bool,
    /// Target class of link and link-collection properties.
    pub linked_class: Option<String>,
}

impl Property {
    /// Optional property of type `ty`.
    pub fn new(name: impl Into<String>, ty: EngineType) -> Self {
        Self {
            name: name.into(),
            ty,
            not_null: false,
            linked_class: None,
        }
    }

    /// Sets whether the property is mandatory.
    pub fn not_null(mut self, not_null: bool) -> Self {
        self.not_null = not_null;
        self
    }

    /// Sets the target class of a link property.
    pub fn linked_to(mut self, class: impl Into<String>) -> Self {
        self.linked_class = Some(class.into());
        self
    }
}

/// Storage kind of the cluster a class writes to by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClusterKind {
    /// Durable storage.
    Physical,
    /// Volatile in-memory storage; surfaced as a view.
    Memory,
}

/// Relational-table analog in the engine schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaClass {
    /// Class name, unique case-insensitively.
    pub name: String,
    /// Properties in declaration order.
    pub properties: Vec<Property>,
    /// Direct super-class, if any.
    pub super_class: Option<String>,
    /// Cluster new records of the class are written to.
    pub default_cluster: u32,
}

impl SchemaClass {
    /// Property declared directly on this class.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|prop| prop.name == name)
    }
}

/// Uniqueness classification of an index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    /// One record per key.
    Unique,
    /// Duplicate keys allowed.
    NotUnique,
    /// Word index over text fields.
    FullText,
    /// Unique key to value map; keys may be overwritten.
    Dictionary,
}

impl IndexKind {
    /// Parses the engine's DDL spelling, ignoring case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "UNIQUE" => Some(IndexKind::Unique),
            "NOTUNIQUE" => Some(IndexKind::NotUnique),
            "FULLTEXT" => Some(IndexKind::FullText),
            "DICTIONARY" => Some(IndexKind::Dictionary),
            _ => None,
        }
    }
}

/// Index definition attached to exactly one class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexDef {
    /// Index name, e.g. `Item.stringKey`.
    pub name: String,
    /// Class the index belongs to.
    pub class_name: String,
    /// Constituent fields in key order.
    pub fields: Vec<String>,
    /// Uniqueness classification.
    pub kind: IndexKind,
}

impl IndexDef {
    /// Whether the index enforces unique keys.
    pub fn is_unique(&self) -> bool {
        self.kind == IndexKind::Unique
    }
}

/// Stored function registered with the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDef {
    /// Function name.
    pub name: String,
    /// Parameter names in declaration order.
    pub parameters: Vec<String>,
}
