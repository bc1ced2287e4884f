mod support;

use std::collections::HashMap;

use sombra_bridge::catalog::{layout, SYSTEM_TABLE, TABLE, VIEW};
use sombra_bridge::engine::memory::MEMORY_ENGINE_VERSION;
use sombra_bridge::{BridgeError, BridgeOptions, LookupKind, Result, SqlType};

use support::{connect, connect_with, names, strings};

#[test]
fn reports_session_and_driver_information() -> Result<()> {
    let meta = connect()?.metadata()?;
    assert_eq!(meta.url(), "memory:test");
    assert_eq!(meta.user_name(), "admin");
    assert_eq!(meta.database_product_name(), "Sombra");
    assert_eq!(meta.database_product_version(), MEMORY_ENGINE_VERSION);
    assert_eq!(meta.database_major_version()?, 2);
    assert_eq!(meta.database_minor_version()?, 0);
    assert_eq!(meta.driver_name(), "Sombra Bridge Driver");
    assert_eq!(meta.driver_version(), env!("CARGO_PKG_VERSION"));
    assert_eq!(meta.driver_major_version(), 0);
    assert_eq!(meta.driver_minor_version(), 4);
    Ok(())
}

#[test]
fn driver_name_comes_from_options() -> Result<()> {
    let options = BridgeOptions::from_toml_str(r#"driver_name = "Acme Bridge""#)?;
    let meta = connect_with(options)?.metadata()?;
    assert_eq!(meta.driver_name(), "Acme Bridge");
    Ok(())
}

#[test]
fn primary_keys_follow_unique_indexes() -> Result<()> {
    let meta = connect()?.metadata()?;
    let mut keys = meta.primary_keys(None, None, "Item")?;
    assert_eq!(keys.columns(), layout::PRIMARY_KEYS);

    assert!(keys.next()?);
    assert_eq!(keys.get_string(4)?.as_deref(), Some("stringKey"));
    assert_eq!(keys.get_string(6)?.as_deref(), Some("Item.stringKey"));
    assert_eq!(keys.get_int(5)?, Some(1));

    assert!(keys.next()?);
    assert_eq!(keys.get_string("COLUMN_NAME")?.as_deref(), Some("intKey"));
    assert_eq!(keys.get_string("PK_NAME")?.as_deref(), Some("Item.intKey"));
    assert_eq!(keys.get_int("KEY_SEQ")?, Some(1));

    assert!(!keys.next()?);
    Ok(())
}

#[test]
fn table_types_are_listed_in_name_order() -> Result<()> {
    let meta = connect()?.metadata()?;
    let mut types = meta.table_types()?;
    assert_eq!(names(&mut types, "TABLE_TYPE")?, vec![SYSTEM_TABLE, TABLE, VIEW]);
    Ok(())
}

#[test]
fn system_class_columns_are_listed_in_declaration_order() -> Result<()> {
    let meta = connect()?.metadata()?;
    let mut columns = meta.columns(None, None, Some("OUser"), None)?;
    assert_eq!(
        names(&mut columns, "COLUMN_NAME")?,
        vec!["name", "password", "roles", "status"]
    );
    Ok(())
}

#[test]
fn all_tables_carry_their_type() -> Result<()> {
    let meta = connect()?.metadata()?;
    let mut tables = meta.tables(None, None, None, None)?;
    let mut types = HashMap::new();
    while tables.next()? {
        let name = tables.get_string("TABLE_NAME")?.unwrap_or_default();
        let ty = tables.get_string("TABLE_TYPE")?.unwrap_or_default();
        assert_eq!(tables.get_value("REMARKS")?, sombra_bridge::Value::Null);
        types.insert(name, ty);
    }
    assert_eq!(types["Item"], TABLE);
    assert_eq!(types["Article"], TABLE);
    assert_eq!(types["Recent"], VIEW);
    assert_eq!(types["OUser"], SYSTEM_TABLE);
    assert_eq!(types["OFunction"], SYSTEM_TABLE);
    Ok(())
}

#[test]
fn table_type_filter_restricts_rows() -> Result<()> {
    let meta = connect()?.metadata()?;
    let mut views = meta.tables(None, None, None, Some(&[VIEW][..]))?;
    assert_eq!(names(&mut views, "TABLE_NAME")?, vec!["Recent"]);

    let mut system = meta.tables(None, None, Some("O%"), Some(&["system table"][..]))?;
    let listed = names(&mut system, "TABLE_NAME")?;
    assert!(listed.contains(&"OUser".to_owned()));
    assert!(!listed.contains(&"Item".to_owned()));
    Ok(())
}

#[test]
fn table_patterns_are_case_sensitive_unless_configured() -> Result<()> {
    let meta = connect()?.metadata()?;
    assert!(meta.tables(None, None, Some("ouser"), None)?.is_empty());

    let meta = connect_with(BridgeOptions::case_insensitive())?.metadata()?;
    let mut tables = meta.tables(None, None, Some("ouser"), None)?;
    assert_eq!(names(&mut tables, "TABLE_NAME")?, vec!["OUser"]);
    Ok(())
}

#[test]
fn exact_table_pattern_does_not_match_longer_names() -> Result<()> {
    let conn = connect()?;
    conn.create_statement()?
        .execute_update("CREATE CLASS ArticleExtra EXTENDS Article")?;
    let meta = conn.metadata()?;
    let mut tables = meta.tables(None, None, Some("Article"), None)?;
    assert_eq!(names(&mut tables, "TABLE_NAME")?, vec!["Article"]);
    let mut tables = meta.tables(None, None, Some("Article%"), None)?;
    assert_eq!(
        names(&mut tables, "TABLE_NAME")?,
        vec!["Article", "ArticleExtra"]
    );
    Ok(())
}

#[test]
fn table_name_is_the_fourth_column() -> Result<()> {
    let meta = connect()?.metadata()?;
    let mut tables = meta.tables(None, None, Some("Recent"), None)?;
    assert_eq!(tables.find_column("TABLE_NAME")?, 4);
    assert!(tables.next()?);
    assert_eq!(tables.get_string(3)?.as_deref(), Some(VIEW));
    assert_eq!(tables.get_string(4)?.as_deref(), Some("Recent"));
    Ok(())
}

#[test]
fn table_and_column_patterns_combine() -> Result<()> {
    let meta = connect()?.metadata()?;
    let mut columns = meta.columns(None, None, Some("A%"), Some("title"))?;
    assert!(columns.next()?);
    assert_eq!(columns.get_string("TABLE_NAME")?.as_deref(), Some("Article"));
    assert_eq!(columns.get_string("COLUMN_NAME")?.as_deref(), Some("title"));
    assert_eq!(columns.get_bool("NULLABLE")?, Some(true));
    assert_eq!(columns.get_string("IS_NULLABLE")?.as_deref(), Some("YES"));
    assert!(!columns.next()?);
    Ok(())
}

#[test]
fn oversized_patterns_match_nothing() -> Result<()> {
    let meta = connect()?.metadata()?;
    let pattern = format!("Zz{}", "_".repeat(300_000));
    assert!(meta.tables(None, None, Some(&pattern), None)?.is_empty());
    assert!(meta.columns(None, None, Some(&pattern), None)?.is_empty());
    Ok(())
}

#[test]
fn column_patterns_use_relational_wildcards() -> Result<()> {
    let meta = connect()?.metadata()?;

    let mut keys = meta.columns(None, None, Some("Item"), Some("%Key"))?;
    assert_eq!(names(&mut keys, "COLUMN_NAME")?, vec!["stringKey", "intKey"]);

    let mut authors = meta.columns(None, None, None, Some("aut_or"))?;
    let mut seen = Vec::new();
    while authors.next()? {
        seen.push((
            authors.get_string("TABLE_NAME")?.unwrap_or_default(),
            authors.get_string("COLUMN_NAME")?.unwrap_or_default(),
        ));
    }
    assert_eq!(
        seen,
        vec![
            ("Item".to_owned(), "author".to_owned()),
            ("Article".to_owned(), "author".to_owned()),
        ]
    );

    assert!(meta.columns(None, None, Some("Item"), Some("aut_r"))?.is_empty());
    assert!(meta.columns(None, None, Some("Nothing%"), None)?.is_empty());
    Ok(())
}

#[test]
fn ordinal_positions_match_between_sweep_and_direct_lookup() -> Result<()> {
    let meta = connect()?.metadata()?;
    let mut sweep = meta.columns(None, None, Some("Item"), None)?;
    let mut positions = Vec::new();
    while sweep.next()? {
        positions.push((
            sweep.get_string("COLUMN_NAME")?.unwrap_or_default(),
            sweep.get_int("ORDINAL_POSITION")?,
        ));
    }
    assert_eq!(positions.len(), 10);
    assert_eq!(positions[0].1, Some(1));

    for (name, position) in positions {
        let mut direct = meta.columns(None, None, Some("Item"), Some(&name))?;
        assert!(direct.next()?);
        assert_eq!(direct.get_int("ORDINAL_POSITION")?, position, "{name}");
        assert!(!direct.next()?);
    }
    Ok(())
}

#[test]
fn column_rows_describe_type_and_nullability() -> Result<()> {
    let meta = connect()?.metadata()?;
    let mut columns = meta.columns(None, None, Some("Article"), Some("uuid"))?;
    assert_eq!(columns.columns().len(), layout::COLUMNS.len());
    assert!(columns.next()?);
    assert_eq!(columns.get_string("TABLE_CAT")?.as_deref(), Some("test"));
    assert_eq!(columns.get_int("DATA_TYPE")?, Some(SqlType::Integer.code()));
    assert_eq!(columns.get_string("TYPE_NAME")?.as_deref(), Some("INTEGER"));
    assert_eq!(columns.get_int("COLUMN_SIZE")?, Some(1));
    assert_eq!(columns.get_bool("NULLABLE")?, Some(false));
    assert_eq!(columns.get_string("IS_NULLABLE")?.as_deref(), Some("NO"));
    assert_eq!(columns.get_string("REMARKS")?, None);
    assert!(columns.was_null());

    let mut columns = meta.columns(None, None, Some("Author"), Some("articles"))?;
    assert!(columns.next()?);
    assert_eq!(columns.get_int("DATA_TYPE")?, Some(SqlType::Array.code()));
    assert_eq!(columns.get_string("IS_NULLABLE")?.as_deref(), Some("YES"));
    Ok(())
}

#[test]
fn index_info_lists_one_row_per_index() -> Result<()> {
    let meta = connect()?.metadata()?;
    let mut indexes = meta.index_info(None, None, "Item", false, true)?;
    assert_eq!(indexes.len(), 8);

    let mut unique = meta.index_info(None, None, "Item", true, true)?;
    let mut rows = Vec::new();
    while unique.next()? {
        rows.push((
            unique.get_string("INDEX_NAME")?.unwrap_or_default(),
            unique.get_bool("NON_UNIQUE")?,
            unique.get_string("COLUMN_NAME")?.unwrap_or_default(),
        ));
        assert_eq!(unique.get_string("ASC_OR_DESC")?.as_deref(), Some("ASC"));
        assert_eq!(unique.get_long("TYPE")?, Some(layout::INDEX_OTHER));
    }
    assert_eq!(
        rows,
        vec![
            ("Item.stringKey".to_owned(), Some(false), "stringKey".to_owned()),
            ("Item.intKey".to_owned(), Some(false), "intKey".to_owned()),
        ]
    );

    indexes.absolute(3)?;
    assert_eq!(indexes.get_bool("NON_UNIQUE")?, Some(true));
    Ok(())
}

#[test]
fn exact_index_info_reloads_the_index_catalog() -> Result<()> {
    let conn = connect()?;
    conn.create_statement()?
        .execute_update("CREATE INDEX ItemTextAuthor ON Item (text, author) NOTUNIQUE")?;
    let meta = conn.metadata()?;

    let mut cached = meta.index_info(None, None, "Item", false, true)?;
    assert!(!names(&mut cached, "INDEX_NAME")?.contains(&"ItemTextAuthor".to_owned()));

    let mut fresh = meta.index_info(None, None, "Item", false, false)?;
    let mut found = None;
    while fresh.next()? {
        if fresh.get_string("INDEX_NAME")?.as_deref() == Some("ItemTextAuthor") {
            found = fresh.get_string("COLUMN_NAME")?;
        }
    }
    assert_eq!(found.as_deref(), Some("text,author"));
    Ok(())
}

#[test]
fn super_tables_yield_exactly_one_parent() -> Result<()> {
    let conn = connect()?;
    conn.create_statement()?
        .execute_update("CREATE CLASS ArticleExtra EXTENDS Article")?;
    let meta = conn.metadata()?;

    let mut parents = meta.super_tables(None, None, "ArticleExtra")?;
    assert!(parents.next()?);
    assert_eq!(parents.get_string("TABLE_NAME")?.as_deref(), Some("ArticleExtra"));
    assert_eq!(parents.get_string("SUPERTABLE_NAME")?.as_deref(), Some("Article"));
    assert!(!parents.next()?);

    let mut types = meta.super_types(None, None, "OUser")?;
    assert_eq!(names(&mut types, "SUPERTYPE_NAME")?, vec!["OIdentity"]);

    assert!(meta.super_tables(None, None, "Article")?.is_empty());
    assert!(meta.super_tables(None, None, "Unknown")?.is_empty());
    Ok(())
}

#[test]
fn udts_cover_matching_classes() -> Result<()> {
    let meta = connect()?.metadata()?;
    let mut udts = meta.udts(None, None, Some("A%"), None)?;
    assert_eq!(names(&mut udts, "CLASS_NAME")?, vec!["Article", "Author"]);

    let structured = SqlType::Struct.code();
    assert!(!meta.udts(None, None, None, Some(&[structured][..]))?.is_empty());
    assert!(meta
        .udts(None, None, None, Some(&[SqlType::JavaObject.code()][..]))?
        .is_empty());
    Ok(())
}

#[test]
fn functions_are_listed_as_routines() -> Result<()> {
    let meta = connect()?.metadata()?;
    let mut all = meta.functions(None, None, None)?;
    assert_eq!(names(&mut all, "FUNCTION_NAME")?, vec!["sum", "greet"]);

    let mut procedures = meta.procedures(None, None, Some("s%"))?;
    assert!(procedures.next()?);
    assert_eq!(procedures.get_string("PROCEDURE_NAME")?.as_deref(), Some("sum"));
    assert_eq!(procedures.get_string("REMARKS")?.as_deref(), Some(""));
    assert_eq!(
        procedures.get_long("PROCEDURE_TYPE")?,
        Some(layout::RESULT_UNKNOWN)
    );
    assert!(!procedures.next()?);
    Ok(())
}

#[test]
fn function_columns_end_with_a_return_row() -> Result<()> {
    let meta = connect()?.metadata()?;

    let mut columns = meta.function_columns(None, None, "sum", None)?;
    let mut rows = Vec::new();
    while columns.next()? {
        rows.push((
            columns.get_string("COLUMN_NAME")?.unwrap_or_default(),
            columns.get_long("COLUMN_TYPE")?,
            columns.get_int("ORDINAL_POSITION")?,
        ));
        assert_eq!(columns.get_int("DATA_TYPE")?, Some(SqlType::Other.code()));
        assert_eq!(columns.get_string("SPECIFIC_NAME")?.as_deref(), Some("sum"));
    }
    assert_eq!(
        rows,
        vec![
            ("a".to_owned(), Some(layout::COLUMN_IN), Some(1)),
            ("b".to_owned(), Some(layout::COLUMN_IN), Some(2)),
            ("return".to_owned(), Some(layout::FUNCTION_RETURN), Some(0)),
        ]
    );

    let mut filtered = meta.procedure_columns(None, None, "sum", Some("b"))?;
    assert_eq!(
        strings(&mut filtered, "COLUMN_NAME")?,
        vec![Some("b".to_owned()), Some("return".to_owned())]
    );
    filtered.last()?;
    assert_eq!(
        filtered.get_long("COLUMN_TYPE")?,
        Some(layout::PROCEDURE_COLUMN_RETURN)
    );
    Ok(())
}

#[test]
fn routine_columns_require_an_existing_function() -> Result<()> {
    let meta = connect()?.metadata()?;
    let err = meta.function_columns(None, None, "missing", None).unwrap_err();
    assert!(matches!(
        err,
        BridgeError::NotFound {
            kind: LookupKind::Function,
            ..
        }
    ));
    // Exact lookups take the name literally.
    assert!(meta.procedure_columns(None, None, "su%", None).is_err());
    Ok(())
}
