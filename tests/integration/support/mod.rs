#![allow(dead_code)]

use std::sync::Arc;

use sombra_bridge::engine::{EngineType, IndexKind, MemoryEngine, Property};
use sombra_bridge::{BridgeOptions, Connection, Cursor, Record, Result, Value};

pub const DATABASE: &str = "test";
pub const ITEM_COUNT: i64 = 20;

const BASE_MILLIS: i64 = 1_700_000_000_000;
const HOUR_MILLIS: i64 = 3_600_000;
const DAY_MILLIS: i64 = 86_400_000;

const ITEM_TEXT: &str = "Sombra is a property graph database with a document surface. \
    Classes may be schema-less, schema-full or a mix of both, and links between \
    records are followed without joins.";

/// Engine loaded with the `Item` / `Article` / `Author` schema, twenty items,
/// two articles, a memory-backed `Recent` class and two stored functions.
pub fn engine() -> Result<Arc<MemoryEngine>> {
    let engine = MemoryEngine::new(DATABASE);

    engine.create_class("Item", None)?;
    let item = [
        ("stringKey", EngineType::String, Some(IndexKind::Unique)),
        ("intKey", EngineType::Integer, Some(IndexKind::Unique)),
        ("date", EngineType::Date, Some(IndexKind::NotUnique)),
        ("time", EngineType::DateTime, Some(IndexKind::NotUnique)),
        ("text", EngineType::String, None),
        ("length", EngineType::Long, Some(IndexKind::NotUnique)),
        ("published", EngineType::Boolean, Some(IndexKind::NotUnique)),
        ("title", EngineType::String, Some(IndexKind::NotUnique)),
        ("author", EngineType::String, Some(IndexKind::NotUnique)),
        ("tags", EngineType::EmbeddedList, None),
    ];
    for (name, ty, index) in item {
        engine.add_property("Item", Property::new(name, ty))?;
        if let Some(kind) = index {
            engine.create_index("Item", &format!("Item.{name}"), &[name], kind)?;
        }
    }

    engine.create_class("Article", None)?;
    engine.add_property(
        "Article",
        Property::new("uuid", EngineType::Integer).not_null(true),
    )?;
    engine.create_index("Article", "Article.uuid", &["uuid"], IndexKind::Unique)?;
    engine.add_property("Article", Property::new("date", EngineType::Date))?;
    engine.create_index("Article", "Article.date", &["date"], IndexKind::NotUnique)?;
    engine.add_property("Article", Property::new("title", EngineType::String))?;
    engine.add_property("Article", Property::new("content", EngineType::String))?;

    engine.create_class("Author", None)?;
    engine.add_property("Author", Property::new("uuid", EngineType::Integer))?;
    engine.create_index("Author", "Author.uuid", &["uuid"], IndexKind::Unique)?;
    engine.add_property("Author", Property::new("name", EngineType::String))?;
    engine.add_property(
        "Author",
        Property::new("articles", EngineType::LinkList).linked_to("Article"),
    )?;
    engine.add_property(
        "Article",
        Property::new("author", EngineType::Link).linked_to("Author"),
    )?;

    engine.create_memory_class("Recent")?;

    for id in 1..=ITEM_COUNT {
        engine.insert(item_record(id))?;
    }
    for (uuid, suffix) in [(1, ""), (2, " 2")] {
        engine.insert(
            Record::of_class("Article")
                .field("date", Value::Date((BASE_MILLIS / DAY_MILLIS) as i32))
                .field("uuid", uuid)
                .field("title", format!("the title{suffix}"))
                .field("content", format!("the content{suffix}"))
                .field("attachment", b"%PDF".to_vec()),
        )?;
    }

    engine.create_function("sum", &["a", "b"])?;
    engine.create_function("greet", &["name"])?;
    Ok(Arc::new(engine))
}

fn item_record(id: i64) -> Record {
    let time = BASE_MILLIS - id * HOUR_MILLIS;
    Record::of_class("Item")
        .field("stringKey", id.to_string())
        .field("intKey", id)
        .field("text", ITEM_TEXT)
        .field("title", "sombra")
        .field("length", ITEM_TEXT.len() as i64)
        .field("published", id % 2 > 0)
        .field("author", format!("anAuthor{id}"))
        .field("date", Value::Date((time / DAY_MILLIS) as i32))
        .field("time", Value::DateTime(time))
}

/// Connection over a fresh fixture engine with default options.
pub fn connect() -> Result<Connection> {
    connect_with(BridgeOptions::default())
}

pub fn connect_with(options: BridgeOptions) -> Result<Connection> {
    Ok(Connection::new(engine()?, options))
}

/// Drains `label` from every remaining row of `cursor` as strings.
pub fn strings(cursor: &mut Cursor, label: &str) -> Result<Vec<Option<String>>> {
    let mut values = Vec::new();
    while cursor.next()? {
        values.push(cursor.get_string(label)?);
    }
    Ok(values)
}

/// Like [`strings`], for columns known to be non-null.
pub fn names(cursor: &mut Cursor, label: &str) -> Result<Vec<String>> {
    Ok(strings(cursor, label)?.into_iter().flatten().collect())
}
