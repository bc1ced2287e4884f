//! Fixed column layouts of the relational catalog row-sets.
//!
//! Callers address catalog columns positionally, so reordering any of these
//! arrays is a breaking change.

use crate::types::{Record, Value};

/// `TABLE_NAME` sits at ordinal 4, after `TABLE_TYPE`.
pub const TABLES: &[&str] = &[
    "TABLE_CAT",
    "TABLE_SCHEM",
    "TABLE_TYPE",
    "TABLE_NAME",
    "REMARKS",
    "TYPE_CAT",
    "TYPE_SCHEM",
    "TYPE_NAME",
    "SELF_REFERENCING_COL_NAME",
    "REF_GENERATION",
];

/// Layout of `table_types`.
pub const TABLE_TYPES: &[&str] = &["TABLE_TYPE"];

/// Layout of `columns`.
pub const COLUMNS: &[&str] = &[
    "TABLE_CAT",
    "TABLE_SCHEM",
    "TABLE_NAME",
    "COLUMN_NAME",
    "DATA_TYPE",
    "TYPE_NAME",
    "COLUMN_SIZE",
    "BUFFER_LENGTH",
    "DECIMAL_DIGITS",
    "NUM_PREC_RADIX",
    "NULLABLE",
    "REMARKS",
    "COLUMN_DEF",
    "SQL_DATA_TYPE",
    "SQL_DATETIME_SUB",
    "CHAR_OCTET_LENGTH",
    "ORDINAL_POSITION",
    "IS_NULLABLE",
    "SCOPE_CATALOG",
    "SCOPE_SCHEMA",
    "SCOPE_TABLE",
    "SOURCE_DATA_TYPE",
    "IS_AUTOINCREMENT",
    "IS_GENERATEDCOLUMN",
];

/// Layout of `index_info`.
pub const INDEX_INFO: &[&str] = &[
    "TABLE_CAT",
    "TABLE_SCHEM",
    "TABLE_NAME",
    "NON_UNIQUE",
    "INDEX_QUALIFIER",
    "INDEX_NAME",
    "TYPE",
    "ORDINAL_POSITION",
    "COLUMN_NAME",
    "ASC_OR_DESC",
    "CARDINALITY",
    "PAGES",
    "FILTER_CONDITION",
];

/// Layout of `primary_keys`.
pub const PRIMARY_KEYS: &[&str] = &[
    "TABLE_CAT",
    "TABLE_SCHEM",
    "TABLE_NAME",
    "COLUMN_NAME",
    "KEY_SEQ",
    "PK_NAME",
];

/// Layout of `super_tables`.
pub const SUPER_TABLES: &[&str] = &["TABLE_CAT", "TABLE_SCHEM", "TABLE_NAME", "SUPERTABLE_NAME"];

/// Layout of `super_types`.
pub const SUPER_TYPES: &[&str] = &[
    "TYPE_CAT",
    "TYPE_SCHEM",
    "TYPE_NAME",
    "SUPERTYPE_CAT",
    "SUPERTYPE_SCHEM",
    "SUPERTYPE_NAME",
];

/// Layout of `udts`.
pub const UDTS: &[&str] = &[
    "TYPE_CAT",
    "TYPE_SCHEM",
    "TYPE_NAME",
    "CLASS_NAME",
    "DATA_TYPE",
    "REMARKS",
    "BASE_TYPE",
];

/// Layout of `procedures`.
pub const PROCEDURES: &[&str] = &[
    "PROCEDURE_CAT",
    "PROCEDURE_SCHEM",
    "PROCEDURE_NAME",
    "RESERVED1",
    "RESERVED2",
    "RESERVED3",
    "REMARKS",
    "PROCEDURE_TYPE",
    "SPECIFIC_NAME",
];

/// Layout of `procedure_columns`.
pub const PROCEDURE_COLUMNS: &[&str] = &[
    "PROCEDURE_CAT",
    "PROCEDURE_SCHEM",
    "PROCEDURE_NAME",
    "COLUMN_NAME",
    "COLUMN_TYPE",
    "DATA_TYPE",
    "TYPE_NAME",
    "PRECISION",
    "LENGTH",
    "SCALE",
    "RADIX",
    "NULLABLE",
    "REMARKS",
    "COLUMN_DEF",
    "SQL_DATA_TYPE",
    "SQL_DATETIME_SUB",
    "CHAR_OCTET_LENGTH",
    "ORDINAL_POSITION",
    "IS_NULLABLE",
    "SPECIFIC_NAME",
];

/// Layout of `functions`.
pub const FUNCTIONS: &[&str] = &[
    "FUNCTION_CAT",
    "FUNCTION_SCHEM",
    "FUNCTION_NAME",
    "REMARKS",
    "FUNCTION_TYPE",
    "SPECIFIC_NAME",
];

/// Layout of `function_columns`.
pub const FUNCTION_COLUMNS: &[&str] = &[
    "FUNCTION_CAT",
    "FUNCTION_SCHEM",
    "FUNCTION_NAME",
    "COLUMN_NAME",
    "COLUMN_TYPE",
    "DATA_TYPE",
    "TYPE_NAME",
    "PRECISION",
    "LENGTH",
    "SCALE",
    "RADIX",
    "NULLABLE",
    "REMARKS",
    "CHAR_OCTET_LENGTH",
    "ORDINAL_POSITION",
    "IS_NULLABLE",
    "SPECIFIC_NAME",
];

/// Result type of a procedure or function whose return shape is unknown.
pub const RESULT_UNKNOWN: i64 = 0;
/// Column role of an input parameter.
pub const COLUMN_IN: i64 = 1;
/// Column role of a procedure's return value.
pub const PROCEDURE_COLUMN_RETURN: i64 = 5;
/// Column role of a function's return value.
pub const FUNCTION_RETURN: i64 = 4;
/// Index type reported for every engine index.
pub const INDEX_OTHER: i64 = 3;
/// Nullability code for "unknown".
pub const NULLABLE_UNKNOWN: i64 = 2;

/// Builds one synthetic catalog row with every layout column present.
pub(crate) struct CatalogRow {
    layout: &'static [&'static str],
    record: Record,
}

impl CatalogRow {
    pub(crate) fn new(layout: &'static [&'static str]) -> Self {
        let mut record = Record::new();
        for column in layout {
            record.set(*column, Value::Null);
        }
        Self { layout, record }
    }

    pub(crate) fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        debug_assert!(
            self.layout.contains(&column),
            "column {column} is not part of this layout"
        );
        self.record.set(column, value);
        self
    }

    pub(crate) fn build(self) -> Record {
        self.record
    }
}
