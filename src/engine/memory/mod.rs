//! In-memory engine used by tests and prototyping.
//!
//! Holds a schema, records, an index catalog and a function registry behind a
//! single lock. The index catalog is split into a stored list and a loaded
//! snapshot: indexes created through commands only become visible to
//! [`EngineSession::class_indexes`] after [`EngineSession::reload_indexes`],
//! mirroring engines whose in-memory catalog lags behind storage.

mod command;

use std::cmp::Ordering;

use parking_lot::Mutex;
use tracing::trace;

use self::command::{Command, CompareOp, Comparison, Filter, Operand};
use super::schema::{
    ClusterKind, EngineType, FunctionDef, IndexDef, IndexKind, Property, SchemaClass,
};
use super::{CommandOutput, EngineError, EngineResult, EngineSession};
use crate::types::{Record, Value};

/// Version reported by [`MemoryEngine::product_version`].
pub const MEMORY_ENGINE_VERSION: &str = "2.0.3";

const PRODUCT_NAME: &str = "Sombra";

/// In-memory [`EngineSession`] implementation.
pub struct MemoryEngine {
    database: String,
    user: String,
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    classes: Vec<SchemaClass>,
    clusters: Vec<Cluster>,
    records: Vec<Record>,
    stored_indexes: Vec<IndexDef>,
    loaded_indexes: Vec<IndexDef>,
    functions: Vec<FunctionDef>,
}

struct Cluster {
    kind: ClusterKind,
    next_position: u64,
}

impl MemoryEngine {
    /// Creates an engine seeded with the system classes and an `admin` user.
    pub fn new(database: impl Into<String>) -> Self {
        let engine = Self {
            database: database.into(),
            user: "admin".to_owned(),
            state: Mutex::new(MemoryState::default()),
        };
        engine.seed_system_schema();
        engine
    }

    fn seed_system_schema(&self) {
        let mut state = self.state.lock();
        state.add_class("OIdentity", None, ClusterKind::Physical);
        state.add_class("ORole", Some("OIdentity"), ClusterKind::Physical);
        state.add_class("OUser", Some("OIdentity"), ClusterKind::Physical);
        state.add_class("OFunction", None, ClusterKind::Physical);
        let props = [
            ("ORole", Property::new("name", EngineType::String).not_null(true)),
            ("ORole", Property::new("mode", EngineType::Byte)),
            ("ORole", Property::new("rules", EngineType::EmbeddedMap)),
            ("OUser", Property::new("name", EngineType::String).not_null(true)),
            ("OUser", Property::new("password", EngineType::String).not_null(true)),
            ("OUser", Property::new("roles", EngineType::LinkSet).linked_to("ORole")),
            ("OUser", Property::new("status", EngineType::String)),
            ("OFunction", Property::new("name", EngineType::String)),
            ("OFunction", Property::new("code", EngineType::String)),
            ("OFunction", Property::new("language", EngineType::String)),
            ("OFunction", Property::new("parameters", EngineType::EmbeddedList)),
            ("OFunction", Property::new("idempotent", EngineType::Boolean)),
        ];
        for (class, prop) in props {
            if let Some(target) = state.class_mut(class) {
                target.properties.push(prop);
            }
        }
        state.add_index(IndexDef {
            name: "OUser.name".into(),
            class_name: "OUser".into(),
            fields: vec!["name".into()],
            kind: IndexKind::Unique,
        });
        let admin_role = state.store(Record::of_class("ORole").field("name", "admin").field("mode", 1));
        let role_rid = admin_role.rid().map(str::to_owned);
        state.store(
            Record::of_class("OUser")
                .field("name", "admin")
                .field("password", "admin")
                .field(
                    "roles",
                    Value::List(role_rid.map(Value::Link).into_iter().collect()),
                )
                .field("status", "ACTIVE"),
        );
    }

    /// Sets the user name reported by the session.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Creates a class stored in a physical cluster.
    pub fn create_class(&self, name: &str, super_class: Option<&str>) -> EngineResult<()> {
        self.create_class_in(name, super_class, ClusterKind::Physical)
    }

    /// Creates a class stored in a volatile memory cluster.
    pub fn create_memory_class(&self, name: &str) -> EngineResult<()> {
        self.create_class_in(name, None, ClusterKind::Memory)
    }

    fn create_class_in(
        &self,
        name: &str,
        super_class: Option<&str>,
        kind: ClusterKind,
    ) -> EngineResult<()> {
        let mut state = self.state.lock();
        state.create_class(name, super_class, kind).map(|_| ())
    }

    /// Appends a property to a class' declaration list.
    pub fn add_property(&self, class: &str, property: Property) -> EngineResult<()> {
        let mut state = self.state.lock();
        state.add_property(class, property).map(|_| ())
    }

    /// Creates an index and makes it immediately visible in the loaded catalog.
    pub fn create_index(
        &self,
        class: &str,
        name: &str,
        fields: &[&str],
        kind: IndexKind,
    ) -> EngineResult<()> {
        let mut state = self.state.lock();
        let class_name = state.canonical_class(class)?;
        state.add_index(IndexDef {
            name: name.to_owned(),
            class_name,
            fields: fields.iter().map(|f| (*f).to_owned()).collect(),
            kind,
        });
        Ok(())
    }

    /// Registers a stored function.
    pub fn create_function(&self, name: &str, parameters: &[&str]) -> EngineResult<()> {
        let mut state = self.state.lock();
        if state.functions.iter().any(|f| f.name == name) {
            return Err(EngineError::Execution(format!(
                "function '{name}' already exists"
            )));
        }
        state.functions.push(FunctionDef {
            name: name.to_owned(),
            parameters: parameters.iter().map(|p| (*p).to_owned()).collect(),
        });
        Ok(())
    }

    /// Stores a record, creating its class when it does not exist yet.
    pub fn insert(&self, record: Record) -> EngineResult<Record> {
        let mut state = self.state.lock();
        let class = record
            .class_name()
            .ok_or_else(|| EngineError::Execution("record has no class".into()))?
            .to_owned();
        let canonical = state.ensure_class(&class)?;
        let mut stored = Record::of_class(canonical);
        for (field, value) in record.fields() {
            stored.set(field, value.clone());
        }
        Ok(state.store(stored))
    }

    /// Number of records stored for `class` and its subclasses.
    pub fn count(&self, class: &str) -> usize {
        let state = self.state.lock();
        state
            .records
            .iter()
            .filter(|record| {
                record
                    .class_name()
                    .is_some_and(|name| state.is_instance_of(name, class))
            })
            .count()
    }
}

impl MemoryState {
    fn find_class(&self, name: &str) -> Option<&SchemaClass> {
        self.classes
            .iter()
            .find(|class| class.name.eq_ignore_ascii_case(name))
    }

    fn class_mut(&mut self, name: &str) -> Option<&mut SchemaClass> {
        self.classes
            .iter_mut()
            .find(|class| class.name.eq_ignore_ascii_case(name))
    }

    fn canonical_class(&self, name: &str) -> EngineResult<String> {
        self.find_class(name)
            .map(|class| class.name.clone())
            .ok_or_else(|| EngineError::UnknownClass(name.to_owned()))
    }

    fn add_class(&mut self, name: &str, super_class: Option<&str>, kind: ClusterKind) {
        let cluster_id = self.clusters.len() as u32;
        self.clusters.push(Cluster {
            kind,
            next_position: 0,
        });
        self.classes.push(SchemaClass {
            name: name.to_owned(),
            properties: Vec::new(),
            super_class: super_class.map(str::to_owned),
            default_cluster: cluster_id,
        });
    }

    fn create_class(
        &mut self,
        name: &str,
        super_class: Option<&str>,
        kind: ClusterKind,
    ) -> EngineResult<usize> {
        if self.find_class(name).is_some() {
            return Err(EngineError::Execution(format!(
                "class '{name}' already exists"
            )));
        }
        let super_class = super_class
            .map(|parent| self.canonical_class(parent))
            .transpose()?;
        self.add_class(name, super_class.as_deref(), kind);
        Ok(self.classes.len())
    }

    fn ensure_class(&mut self, name: &str) -> EngineResult<String> {
        if let Some(class) = self.find_class(name) {
            return Ok(class.name.clone());
        }
        self.create_class(name, None, ClusterKind::Physical)?;
        Ok(name.to_owned())
    }

    fn add_property(&mut self, class: &str, property: Property) -> EngineResult<usize> {
        let target = self
            .class_mut(class)
            .ok_or_else(|| EngineError::UnknownClass(class.to_owned()))?;
        if target.property(&property.name).is_some() {
            return Err(EngineError::Execution(format!(
                "property '{}.{}' already exists",
                target.name, property.name
            )));
        }
        target.properties.push(property);
        Ok(target.properties.len())
    }

    fn add_index(&mut self, def: IndexDef) {
        self.stored_indexes.push(def.clone());
        self.loaded_indexes.push(def);
    }

    fn store(&mut self, mut record: Record) -> Record {
        let cluster_id = record
            .class_name()
            .and_then(|name| self.find_class(name))
            .map_or(0, |class| class.default_cluster);
        if let Some(cluster) = self.clusters.get_mut(cluster_id as usize) {
            record = record.with_rid(format!("#{cluster_id}:{}", cluster.next_position));
            cluster.next_position += 1;
        }
        self.records.push(record.clone());
        record
    }

    /// Walks the super-class chain of `class` looking for `ancestor`.
    fn is_instance_of(&self, class: &str, ancestor: &str) -> bool {
        let mut current = self.find_class(class);
        while let Some(cls) = current {
            if cls.name.eq_ignore_ascii_case(ancestor) {
                return true;
            }
            current = cls
                .super_class
                .as_deref()
                .and_then(|parent| self.find_class(parent));
        }
        false
    }

    fn matching_positions(
        &self,
        class: &str,
        filter: Option<&Filter>,
        args: &[Value],
    ) -> EngineResult<Vec<usize>> {
        let canonical = self.canonical_class(class)?;
        let mut positions = Vec::new();
        for (pos, record) in self.records.iter().enumerate() {
            let in_class = record
                .class_name()
                .is_some_and(|name| self.is_instance_of(name, &canonical));
            if in_class && matches_filter(record, filter, args)? {
                positions.push(pos);
            }
        }
        Ok(positions)
    }

    fn execute(&mut self, command: Command, args: &[Value]) -> EngineResult<CommandOutput> {
        match command {
            Command::Select {
                fields,
                target,
                filter,
            } => {
                let Some(target) = target else {
                    return Ok(CommandOutput::Records(Vec::new()));
                };
                let positions = self.matching_positions(&target, filter.as_ref(), args)?;
                let rows = positions
                    .into_iter()
                    .map(|pos| project(&self.records[pos], &fields))
                    .collect();
                Ok(CommandOutput::Records(rows))
            }
            Command::SelectLiterals { items } => {
                let mut row = Record::new();
                for (label, operand) in items {
                    row.set(label, operand.resolve(args)?);
                }
                Ok(CommandOutput::Records(vec![row]))
            }
            Command::Insert { class, assignments } => {
                let canonical = self.ensure_class(&class)?;
                let mut record = Record::of_class(canonical);
                for (field, operand) in assignments {
                    record.set(field, operand.resolve(args)?);
                }
                Ok(CommandOutput::Record(self.store(record)))
            }
            Command::Update {
                class,
                assignments,
                filter,
            } => {
                let positions = self.matching_positions(&class, filter.as_ref(), args)?;
                let mut values = Vec::with_capacity(assignments.len());
                for (field, operand) in &assignments {
                    values.push((field.clone(), operand.resolve(args)?));
                }
                for pos in &positions {
                    for (field, value) in &values {
                        self.records[*pos].set(field.clone(), value.clone());
                    }
                }
                Ok(CommandOutput::Count(positions.len() as i64))
            }
            Command::Delete { class, filter } => {
                let positions = self.matching_positions(&class, filter.as_ref(), args)?;
                for pos in positions.iter().rev() {
                    self.records.remove(*pos);
                }
                Ok(CommandOutput::Count(positions.len() as i64))
            }
            Command::CreateClass { name, super_class } => {
                let total =
                    self.create_class(&name, super_class.as_deref(), ClusterKind::Physical)?;
                Ok(CommandOutput::Count(total as i64))
            }
            Command::CreateProperty {
                class,
                name,
                ty,
                linked_class,
            } => {
                let mut property = Property::new(name, ty);
                property.linked_class = linked_class;
                let total = self.add_property(&class, property)?;
                Ok(CommandOutput::Count(total as i64))
            }
            Command::CreateIndex {
                name,
                class,
                fields,
                kind,
            } => {
                let class_name = self.canonical_class(&class)?;
                let indexed = self.matching_positions(&class_name, None, args)?.len();
                self.stored_indexes.push(IndexDef {
                    name,
                    class_name,
                    fields,
                    kind,
                });
                Ok(CommandOutput::Count(indexed as i64))
            }
        }
    }
}

fn project(record: &Record, fields: &[String]) -> Record {
    if fields.is_empty() {
        return record.clone();
    }
    let mut row = match record.class_name() {
        Some(class) => Record::of_class(class),
        None => Record::new(),
    };
    if let Some(rid) = record.rid() {
        row = row.with_rid(rid);
    }
    for field in fields {
        let value = record
            .attribute(field)
            .map_or(Value::Null, |value| value.into_owned());
        row.set(field.clone(), value);
    }
    row
}

fn matches_filter(record: &Record, filter: Option<&Filter>, args: &[Value]) -> EngineResult<bool> {
    let Some(filter) = filter else {
        return Ok(true);
    };
    for all_of in &filter.any_of {
        let mut matched = true;
        for comparison in all_of {
            if !matches_comparison(record, comparison, args)? {
                matched = false;
                break;
            }
        }
        if matched {
            return Ok(true);
        }
    }
    Ok(false)
}

fn matches_comparison(record: &Record, comparison: &Comparison, args: &[Value]) -> EngineResult<bool> {
    let expected = comparison.operand.resolve(args)?;
    let actual = record
        .attribute(&comparison.field)
        .map_or(Value::Null, |value| value.into_owned());
    if expected.is_null() || actual.is_null() {
        let both_null = expected.is_null() && actual.is_null();
        return Ok(match comparison.op {
            CompareOp::Eq => both_null,
            CompareOp::Ne => !both_null,
            _ => false,
        });
    }
    let Some(ordering) = actual.compare(&expected) else {
        return Ok(comparison.op == CompareOp::Ne);
    };
    Ok(match comparison.op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    })
}

impl EngineSession for MemoryEngine {
    fn command(&self, text: &str, args: &[Value]) -> EngineResult<CommandOutput> {
        let command = command::parse(text)?;
        trace!(args = args.len(), "memory.command");
        self.state.lock().execute(command, args)
    }

    fn projections(&self, text: &str) -> EngineResult<Option<Vec<String>>> {
        Ok(command::parse(text)?.projections())
    }

    fn classes(&self) -> EngineResult<Vec<SchemaClass>> {
        Ok(self.state.lock().classes.clone())
    }

    fn class(&self, name: &str) -> EngineResult<Option<SchemaClass>> {
        Ok(self.state.lock().find_class(name).cloned())
    }

    fn cluster_kind(&self, cluster_id: u32) -> EngineResult<ClusterKind> {
        self.state
            .lock()
            .clusters
            .get(cluster_id as usize)
            .map(|cluster| cluster.kind)
            .ok_or_else(|| EngineError::Execution(format!("cluster {cluster_id} not found")))
    }

    fn class_indexes(&self, class: &str) -> EngineResult<Vec<IndexDef>> {
        let state = self.state.lock();
        Ok(state
            .loaded_indexes
            .iter()
            .filter(|idx| idx.class_name.eq_ignore_ascii_case(class))
            .cloned()
            .collect())
    }

    fn reload_indexes(&self) -> EngineResult<()> {
        let mut state = self.state.lock();
        state.loaded_indexes = state.stored_indexes.clone();
        Ok(())
    }

    fn function_names(&self) -> EngineResult<Vec<String>> {
        Ok(self
            .state
            .lock()
            .functions
            .iter()
            .map(|f| f.name.clone())
            .collect())
    }

    fn function(&self, name: &str) -> EngineResult<Option<FunctionDef>> {
        Ok(self
            .state
            .lock()
            .functions
            .iter()
            .find(|f| f.name == name)
            .cloned())
    }

    fn database_name(&self) -> String {
        self.database.clone()
    }

    fn url(&self) -> String {
        format!("memory:{}", self.database)
    }

    fn user(&self) -> String {
        self.user.clone()
    }

    fn product_name(&self) -> String {
        PRODUCT_NAME.to_owned()
    }

    fn product_version(&self) -> String {
        MEMORY_ENGINE_VERSION.to_owned()
    }
}
