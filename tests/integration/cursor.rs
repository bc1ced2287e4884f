mod support;

use sombra_bridge::{BridgeError, LookupKind, Result, SqlType, Value};

use support::connect;

#[test]
fn find_column_follows_projection_order() -> Result<()> {
    let mut stmt = connect()?.create_statement()?;
    let mut rows = stmt.execute_query("SELECT uuid, title, content FROM Article")?;
    assert_eq!(rows.find_column("uuid")?, 1);
    assert_eq!(rows.find_column("content")?, 3);
    assert!(matches!(
        rows.find_column("missing"),
        Err(BridgeError::NotFound {
            kind: LookupKind::Column,
            ..
        })
    ));
    Ok(())
}

#[test]
fn int_column_can_be_read_as_string() -> Result<()> {
    let mut stmt = connect()?.create_statement()?;
    let mut rows = stmt.execute_query("SELECT stringKey, intKey FROM Item WHERE intKey = 1")?;
    assert!(rows.next()?);
    assert_eq!(rows.get_string(1)?.as_deref(), Some("1"));
    assert_eq!(rows.get_string(2)?.as_deref(), Some("1"));
    assert_eq!(rows.get_long("stringKey")?, Some(1));
    assert!(!rows.next()?);
    Ok(())
}

#[test]
fn null_values_read_as_none() -> Result<()> {
    let mut stmt = connect()?.create_statement()?;
    stmt.execute("INSERT INTO Article (uuid, title) VALUES (22345, NULL)")?;
    let mut rows = stmt.execute_query("SELECT title FROM Article WHERE uuid = 22345")?;
    assert!(rows.next()?);
    assert_eq!(rows.get_string(1)?, None);
    assert!(rows.was_null());
    assert_eq!(rows.get_value("title")?, Value::Null);
    Ok(())
}

#[test]
fn projected_columns_exist_even_when_null() -> Result<()> {
    let mut stmt = connect()?.create_statement()?;
    stmt.execute("INSERT INTO Article (uuid, title) VALUES (22346, NULL)")?;
    let mut rows = stmt.execute_query("SELECT title, uuid FROM Article WHERE uuid = 22346")?;
    assert_eq!(rows.find_column("title")?, 1);
    assert_eq!(rows.find_column("uuid")?, 2);
    Ok(())
}

#[test]
fn rows_mix_null_and_present_values() -> Result<()> {
    let mut stmt = connect()?.create_statement()?;
    stmt.execute(
        "INSERT INTO Article (uuid, title, content) VALUES (22347, NULL, 'teh content')",
    )?;
    stmt.execute("INSERT INTO Article (uuid, title) VALUES (22348, 'jeejee')")?;
    let mut rows = stmt.execute_query(
        "SELECT title, uuid FROM Article WHERE uuid = 22347 OR uuid = 22348",
    )?;
    let title = rows.find_column("title")?;
    let uuid = rows.find_column("uuid")?;

    assert!(rows.next()?);
    assert_eq!(rows.get_string(uuid)?.as_deref(), Some("22347"));
    assert_eq!(rows.get_string(title)?, None);
    assert!(rows.next()?);
    assert_eq!(rows.get_string(uuid)?.as_deref(), Some("22348"));
    assert_eq!(rows.get_string(title)?.as_deref(), Some("jeejee"));
    assert!(!rows.was_null());
    Ok(())
}

#[test]
fn reading_outside_a_row_fails() -> Result<()> {
    let mut stmt = connect()?.create_statement()?;
    let mut rows = stmt.execute_query("SELECT stringKey FROM Item")?;
    assert!(matches!(rows.get_string(1), Err(BridgeError::NoCurrentRow)));
    rows.after_last()?;
    assert!(matches!(rows.get_string(1), Err(BridgeError::NoCurrentRow)));
    Ok(())
}

#[test]
fn cursor_moves_in_both_directions() -> Result<()> {
    let mut stmt = connect()?.create_statement()?;
    let mut rows = stmt.execute_query("SELECT intKey FROM Item")?;
    assert_eq!(rows.len(), 20);
    assert!(rows.is_before_first());
    assert!(rows.last()?);
    assert!(rows.is_last());
    assert_eq!(rows.get_int("intKey")?, Some(20));
    assert!(rows.absolute(-2)?);
    assert_eq!(rows.row(), 19);
    assert!(rows.absolute(5)?);
    assert_eq!(rows.get_int(1)?, Some(5));
    assert!(rows.first()?);
    assert!(rows.is_first());
    rows.before_first()?;
    let mut count = 0;
    while rows.next()? {
        count += 1;
    }
    assert_eq!(count, 20);
    assert!(rows.is_after_last());
    Ok(())
}

#[test]
fn empty_row_set_has_no_boundaries() -> Result<()> {
    let mut stmt = connect()?.create_statement()?;
    let mut rows = stmt.execute_query("SELECT FROM Item WHERE intKey > 1000")?;
    assert!(rows.is_empty());
    assert!(rows.columns().is_empty());
    assert!(!rows.is_before_first());
    assert!(!rows.first()?);
    assert!(!rows.next()?);
    assert!(!rows.is_after_last());
    Ok(())
}

#[test]
fn typed_getters_convert_stored_values() -> Result<()> {
    let mut stmt = connect()?.create_statement()?;
    let mut rows = stmt.execute_query("SELECT published, length, author FROM Item")?;
    assert!(rows.next()?);
    assert_eq!(rows.get_bool("published")?, Some(true));
    assert_eq!(rows.get_int("published")?, Some(1));
    assert!(rows.get_double("length")?.is_some_and(|len| len > 0.0));
    assert_eq!(rows.get_bytes("author")?.as_deref(), Some(&b"anAuthor1"[..]));
    let err = rows.get_bool("author").unwrap_err();
    assert_eq!(err.code(), "Conversion");
    Ok(())
}

#[test]
fn binary_fields_read_as_bytes() -> Result<()> {
    let mut stmt = connect()?.create_statement()?;
    let mut rows = stmt.execute_query("SELECT attachment FROM Article WHERE uuid = 1")?;
    assert!(rows.next()?);
    assert_eq!(rows.get_bytes(1)?, Some(b"%PDF".to_vec()));
    assert_eq!(rows.get_string(1)?.as_deref(), Some("25504446"));
    Ok(())
}

#[test]
fn metadata_resolves_owning_class_and_type() -> Result<()> {
    let mut stmt = connect()?.create_statement()?;
    let mut rows =
        stmt.execute_query("SELECT stringKey, intKey, text, length, date, extra FROM Item")?;
    let mut meta = rows.metadata();
    assert_eq!(meta.column_count(), 6);
    assert_eq!(meta.column_label(3)?, "text");
    assert_eq!(meta.table_name(1)?.as_deref(), Some("Item"));
    assert_eq!(meta.column_type(2)?, SqlType::Integer);
    assert_eq!(meta.column_type(4)?, SqlType::BigInt);
    assert_eq!(meta.column_type(5)?, SqlType::Date);
    assert_eq!(meta.column_type(6)?, SqlType::Null);
    assert_eq!(meta.is_nullable(1)?, Some(true));
    Ok(())
}

#[test]
fn metadata_walks_to_the_declaring_super_class() -> Result<()> {
    let conn = connect()?;
    let mut stmt = conn.create_statement()?;
    stmt.execute_update("CREATE CLASS ArticleExtra EXTENDS Article")?;
    stmt.execute_update("INSERT INTO ArticleExtra SET uuid = 9, title = 'extra', pages = 3")?;

    let mut rows = stmt.execute_query("SELECT title, pages FROM ArticleExtra")?;
    let mut meta = rows.metadata();
    assert_eq!(meta.table_name(1)?.as_deref(), Some("Article"));
    assert_eq!(meta.table_name(2)?.as_deref(), Some("ArticleExtra"));
    assert_eq!(meta.column_type(1)?, SqlType::Varchar);
    assert_eq!(meta.column_type(2)?, SqlType::BigInt);
    // Resolved owners are cached per column.
    assert_eq!(meta.table_name(1)?.as_deref(), Some("Article"));
    Ok(())
}

#[test]
fn polymorphic_queries_include_subclass_records() -> Result<()> {
    let conn = connect()?;
    let mut stmt = conn.create_statement()?;
    stmt.execute_update("CREATE CLASS ArticleExtra EXTENDS Article")?;
    stmt.execute_update("INSERT INTO ArticleExtra SET uuid = 9")?;
    let mut rows = stmt.execute_query("SELECT uuid FROM Article WHERE uuid = 9")?;
    assert!(rows.next()?);
    assert_eq!(rows.get_string("@class")?.as_deref(), Some("ArticleExtra"));
    assert!(rows.get_string("@rid")?.is_some());
    Ok(())
}

#[test]
fn closed_cursor_rejects_navigation() -> Result<()> {
    let mut stmt = connect()?.create_statement()?;
    let mut rows = stmt.execute_query("SELECT FROM Item")?;
    rows.close();
    assert!(rows.is_closed());
    assert!(matches!(rows.next(), Err(BridgeError::Closed("cursor"))));
    assert!(rows.find_column("intKey").is_err());
    Ok(())
}
