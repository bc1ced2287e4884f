#![forbid(unsafe_code)]

//! Relational catalog projected from the live engine schema.
//!
//! Every call reads the schema afresh and materialises a synthetic row-set in
//! one of the fixed layouts from [`layout`]. Name patterns use the relational
//! `_` / `%` wildcards; a pattern matching nothing yields an empty cursor, not
//! an error.

pub mod layout;
pub mod pattern;
pub mod types;

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::cursor::Cursor;
use crate::engine::{ClusterKind, EngineResult, EngineSession, FunctionDef};
use crate::options::BridgeOptions;
use crate::types::{BridgeError, LookupKind, Record, Result};

use self::layout::CatalogRow;
pub use self::pattern::NamePattern;
pub use self::types::SqlType;

/// Table type of ordinary classes.
pub const TABLE: &str = "TABLE";
/// Table type of classes stored in memory clusters.
pub const VIEW: &str = "VIEW";
/// Table type of reserved engine classes.
pub const SYSTEM_TABLE: &str = "SYSTEM TABLE";

const DRIVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const DRIVER_MAJOR_VERSION: &str = env!("CARGO_PKG_VERSION_MAJOR");
const DRIVER_MINOR_VERSION: &str = env!("CARGO_PKG_VERSION_MINOR");

/// Column and role names that differ between procedure and function listings.
struct RoutineLayout {
    summary: &'static [&'static str],
    columns: &'static [&'static str],
    name_column: &'static str,
    type_column: &'static str,
    return_role: i64,
}

const PROCEDURE: RoutineLayout = RoutineLayout {
    summary: layout::PROCEDURES,
    columns: layout::PROCEDURE_COLUMNS,
    name_column: "PROCEDURE_NAME",
    type_column: "PROCEDURE_TYPE",
    return_role: layout::PROCEDURE_COLUMN_RETURN,
};

const FUNCTION: RoutineLayout = RoutineLayout {
    summary: layout::FUNCTIONS,
    columns: layout::FUNCTION_COLUMNS,
    name_column: "FUNCTION_NAME",
    type_column: "FUNCTION_TYPE",
    return_role: layout::FUNCTION_RETURN,
};

/// Catalog view over a bound engine session.
#[derive(Clone)]
pub struct DatabaseMetadata {
    session: Arc<dyn EngineSession>,
    options: Arc<BridgeOptions>,
}

impl DatabaseMetadata {
    /// Catalog over `session`, filtered and labelled according to `options`.
    pub fn new(session: Arc<dyn EngineSession>, options: Arc<BridgeOptions>) -> Self {
        Self { session, options }
    }

    fn pattern(&self, raw: Option<&str>) -> NamePattern {
        NamePattern::compile_with(raw, self.options.case_insensitive_names)
    }

    fn engine<T>(&self, operation: &'static str, result: EngineResult<T>) -> Result<T> {
        result.map_err(|err| {
            warn!(operation, error = %err, "catalog.engine_failed");
            BridgeError::from(err)
        })
    }

    fn table_type(&self, name: &str, default_cluster: u32) -> Result<&'static str> {
        if self.options.is_system_table(name) {
            return Ok(SYSTEM_TABLE);
        }
        let kind = self.engine("cluster_kind", self.session.cluster_kind(default_cluster))?;
        Ok(match kind {
            ClusterKind::Memory => VIEW,
            ClusterKind::Physical => TABLE,
        })
    }

    /// Lists classes whose name matches `table_pattern`.
    ///
    /// `types`, when given, restricts rows to those table types.
    pub fn tables(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        table_pattern: Option<&str>,
        types: Option<&[&str]>,
    ) -> Result<Cursor> {
        let pattern = self.pattern(table_pattern);
        let mut rows = Vec::new();
        for class in self.engine("classes", self.session.classes())? {
            if !pattern.matches(&class.name) {
                continue;
            }
            let table_type = self.table_type(&class.name, class.default_cluster)?;
            let wanted = types.map_or(true, |wanted| {
                wanted.iter().any(|t| t.eq_ignore_ascii_case(table_type))
            });
            if !wanted {
                continue;
            }
            rows.push(
                CatalogRow::new(layout::TABLES)
                    .set("TABLE_NAME", class.name.as_str())
                    .set("TABLE_TYPE", table_type)
                    .build(),
            );
        }
        trace!(pattern = ?table_pattern, rows = rows.len(), "catalog.tables");
        Ok(Cursor::from_layout(layout::TABLES, rows))
    }

    /// Every table type [`Self::tables`] can report, ordered by name.
    pub fn table_types(&self) -> Result<Cursor> {
        let mut types = [SYSTEM_TABLE, TABLE, VIEW];
        types.sort_unstable();
        let rows = types
            .into_iter()
            .map(|ty| CatalogRow::new(layout::TABLE_TYPES).set("TABLE_TYPE", ty).build())
            .collect();
        Ok(Cursor::from_layout(layout::TABLE_TYPES, rows))
    }

    /// Lists properties of matching classes whose name matches `column_pattern`.
    ///
    /// `ORDINAL_POSITION` is the property's declaration index in its class, so
    /// a filtered query reports the same positions as a full sweep.
    pub fn columns(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        table_pattern: Option<&str>,
        column_pattern: Option<&str>,
    ) -> Result<Cursor> {
        let tables = self.pattern(table_pattern);
        let columns = self.pattern(column_pattern);
        let database = self.session.database_name();
        let mut rows = Vec::new();
        for class in self.engine("classes", self.session.classes())? {
            if !tables.matches(&class.name) {
                continue;
            }
            for (position, property) in class.properties.iter().enumerate() {
                if !columns.matches(&property.name) {
                    continue;
                }
                rows.push(
                    CatalogRow::new(layout::COLUMNS)
                        .set("TABLE_CAT", database.as_str())
                        .set("TABLE_NAME", class.name.as_str())
                        .set("COLUMN_NAME", property.name.as_str())
                        .set("DATA_TYPE", SqlType::from_engine(property.ty).code())
                        .set("TYPE_NAME", property.ty.name())
                        .set("COLUMN_SIZE", 1)
                        .set("NULLABLE", !property.not_null)
                        .set("ORDINAL_POSITION", position as i64 + 1)
                        .set("IS_NULLABLE", if property.not_null { "NO" } else { "YES" })
                        .build(),
                );
            }
        }
        trace!(
            table_pattern = ?table_pattern,
            column_pattern = ?column_pattern,
            rows = rows.len(),
            "catalog.columns"
        );
        Ok(Cursor::from_layout(layout::COLUMNS, rows))
    }

    /// One row per index of `table`. Unless `approximate` is set, the engine's
    /// index catalog is reloaded first so recently created indexes show up.
    pub fn index_info(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        table: &str,
        unique_only: bool,
        approximate: bool,
    ) -> Result<Cursor> {
        if !approximate {
            debug!(table, "catalog.index_reload");
            self.engine("reload_indexes", self.session.reload_indexes())?;
        }
        let rows = self
            .engine("class_indexes", self.session.class_indexes(table))?
            .into_iter()
            .filter(|index| !unique_only || index.is_unique())
            .map(|index| {
                CatalogRow::new(layout::INDEX_INFO)
                    .set("TABLE_NAME", index.class_name.as_str())
                    .set("NON_UNIQUE", !index.is_unique())
                    .set("INDEX_NAME", index.name.as_str())
                    .set("TYPE", layout::INDEX_OTHER)
                    .set("COLUMN_NAME", index.fields.join(","))
                    .set("ASC_OR_DESC", "ASC")
                    .build()
            })
            .collect();
        Ok(Cursor::from_layout(layout::INDEX_INFO, rows))
    }

    /// One row per field of every unique index of `table`.
    pub fn primary_keys(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        table: &str,
    ) -> Result<Cursor> {
        let mut rows = Vec::new();
        for index in self.engine("class_indexes", self.session.class_indexes(table))? {
            if !index.is_unique() {
                continue;
            }
            for (seq, field) in index.fields.iter().enumerate() {
                rows.push(
                    CatalogRow::new(layout::PRIMARY_KEYS)
                        .set("TABLE_NAME", index.class_name.as_str())
                        .set("COLUMN_NAME", field.as_str())
                        .set("KEY_SEQ", seq as i64 + 1)
                        .set("PK_NAME", index.name.as_str())
                        .build(),
                );
            }
        }
        Ok(Cursor::from_layout(layout::PRIMARY_KEYS, rows))
    }

    fn parent_of(&self, name: &str) -> Result<Option<(String, String)>> {
        let class = self.engine("class", self.session.class(name))?;
        Ok(class.and_then(|class| class.super_class.map(|parent| (class.name, parent))))
    }

    /// Parent of `table`, as zero or one row.
    pub fn super_tables(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        table: &str,
    ) -> Result<Cursor> {
        let rows = self
            .parent_of(table)?
            .map(|(child, parent)| {
                CatalogRow::new(layout::SUPER_TABLES)
                    .set("TABLE_NAME", child)
                    .set("SUPERTABLE_NAME", parent)
                    .build()
            })
            .into_iter()
            .collect();
        Ok(Cursor::from_layout(layout::SUPER_TABLES, rows))
    }

    /// Parent type of `type_name`, as zero or one row.
    pub fn super_types(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        type_name: &str,
    ) -> Result<Cursor> {
        let rows = self
            .parent_of(type_name)?
            .map(|(child, parent)| {
                CatalogRow::new(layout::SUPER_TYPES)
                    .set("TYPE_NAME", child)
                    .set("SUPERTYPE_NAME", parent)
                    .build()
            })
            .into_iter()
            .collect();
        Ok(Cursor::from_layout(layout::SUPER_TYPES, rows))
    }

    /// Every matching class as a structured user-defined type.
    pub fn udts(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        type_pattern: Option<&str>,
        types: Option<&[i32]>,
    ) -> Result<Cursor> {
        let structured = SqlType::Struct.code();
        if types.is_some_and(|wanted| !wanted.contains(&structured)) {
            return Ok(Cursor::from_layout(layout::UDTS, Vec::new()));
        }
        let pattern = self.pattern(type_pattern);
        let rows = self
            .engine("classes", self.session.classes())?
            .into_iter()
            .filter(|class| pattern.matches(&class.name))
            .map(|class| {
                CatalogRow::new(layout::UDTS)
                    .set("TYPE_NAME", class.name.as_str())
                    .set("CLASS_NAME", class.name.as_str())
                    .set("DATA_TYPE", structured)
                    .build()
            })
            .collect();
        Ok(Cursor::from_layout(layout::UDTS, rows))
    }

    /// Stored functions whose name matches `name_pattern`, as procedures.
    pub fn procedures(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        name_pattern: Option<&str>,
    ) -> Result<Cursor> {
        self.routines(&PROCEDURE, name_pattern)
    }

    /// Stored functions whose name matches `name_pattern`.
    pub fn functions(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        name_pattern: Option<&str>,
    ) -> Result<Cursor> {
        self.routines(&FUNCTION, name_pattern)
    }

    /// Parameters of the procedure named exactly `name`, followed by its
    /// return slot. Fails with `NotFound` when no such function exists.
    pub fn procedure_columns(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        name: &str,
        column_pattern: Option<&str>,
    ) -> Result<Cursor> {
        self.routine_columns(&PROCEDURE, name, column_pattern)
    }

    /// Parameters of the function named exactly `name`, followed by its
    /// return slot. Fails with `NotFound` when no such function exists.
    pub fn function_columns(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        name: &str,
        column_pattern: Option<&str>,
    ) -> Result<Cursor> {
        self.routine_columns(&FUNCTION, name, column_pattern)
    }

    fn routines(&self, routine: &RoutineLayout, name_pattern: Option<&str>) -> Result<Cursor> {
        let pattern = self.pattern(name_pattern);
        let rows = self
            .engine("function_names", self.session.function_names())?
            .into_iter()
            .filter(|name| pattern.matches(name))
            .map(|name| {
                CatalogRow::new(routine.summary)
                    .set(routine.name_column, name.as_str())
                    .set("REMARKS", "")
                    .set(routine.type_column, layout::RESULT_UNKNOWN)
                    .set("SPECIFIC_NAME", name)
                    .build()
            })
            .collect();
        Ok(Cursor::from_layout(routine.summary, rows))
    }

    fn routine_columns(
        &self,
        routine: &RoutineLayout,
        name: &str,
        column_pattern: Option<&str>,
    ) -> Result<Cursor> {
        let function: FunctionDef = self
            .engine("function", self.session.function(name))?
            .ok_or_else(|| BridgeError::not_found(LookupKind::Function, name))?;
        let pattern = self.pattern(column_pattern);
        let column = |column_name: &str, role: i64, ordinal: i64| -> Record {
            CatalogRow::new(routine.columns)
                .set(routine.name_column, function.name.as_str())
                .set("COLUMN_NAME", column_name)
                .set("COLUMN_TYPE", role)
                .set("DATA_TYPE", SqlType::Other.code())
                .set("NULLABLE", layout::NULLABLE_UNKNOWN)
                .set("ORDINAL_POSITION", ordinal)
                .set("SPECIFIC_NAME", function.name.as_str())
                .build()
        };
        let mut rows: Vec<Record> = function
            .parameters
            .iter()
            .enumerate()
            .filter(|(_, parameter)| pattern.matches(parameter))
            .map(|(position, parameter)| column(parameter, layout::COLUMN_IN, position as i64 + 1))
            .collect();
        rows.push(column("return", routine.return_role, 0));
        Ok(Cursor::from_layout(routine.columns, rows))
    }

    /// URL the session was opened with.
    pub fn url(&self) -> String {
        self.session.url()
    }

    /// Name of the authenticated user.
    pub fn user_name(&self) -> String {
        self.session.user()
    }

    /// Engine product name.
    pub fn database_product_name(&self) -> String {
        self.session.product_name()
    }

    /// Engine product version string.
    pub fn database_product_version(&self) -> String {
        self.session.product_version()
    }

    /// Leading numeric component of the product version.
    pub fn database_major_version(&self) -> Result<i32> {
        parse_version_part(&self.session.product_version(), 0)
    }

    /// Second numeric component of the product version.
    pub fn database_minor_version(&self) -> Result<i32> {
        parse_version_part(&self.session.product_version(), 1)
    }

    /// Driver name from [`BridgeOptions::driver_name`].
    pub fn driver_name(&self) -> &str {
        &self.options.driver_name
    }

    /// Version of this crate.
    pub fn driver_version(&self) -> &'static str {
        DRIVER_VERSION
    }

    /// Major component of [`Self::driver_version`].
    pub fn driver_major_version(&self) -> i32 {
        DRIVER_MAJOR_VERSION.parse().unwrap_or(0)
    }

    /// Minor component of [`Self::driver_version`].
    pub fn driver_minor_version(&self) -> i32 {
        DRIVER_MINOR_VERSION.parse().unwrap_or(0)
    }
}

/// Reads the leading digits of the `index`-th dot-separated version component,
/// so `"2.0.3"` yields 2 and 0 and `"1.7rc2"` yields 1 and 7.
fn parse_version_part(version: &str, index: usize) -> Result<i32> {
    version
        .split('.')
        .nth(index)
        .map(|part| {
            part.chars()
                .take_while(char::is_ascii_digit)
                .collect::<String>()
        })
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| BridgeError::Engine(format!("unparseable product version '{version}'")))
}
