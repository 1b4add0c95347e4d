//! Runs generated statements against an in-memory SQLite database.
//!
//! Projection views depend on PostgreSQL document functions and are not
//! executed here; the raw table, temporal views, metadata view, insert and
//! drop statements are plain SQL.

use docsql::{
    parse_path, CompilerConfig, ScalarType, SchemaBundle, SimpleNameResolver, StaticColumns,
    ViewGroup,
};
use pretty_assertions::assert_eq;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use serde_json::{json, Value};

fn to_sql(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(b as i64),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s),
        other => SqlValue::Text(other.to_string()),
    }
}

fn tenant() -> StaticColumns {
    StaticColumns::new(vec![("TENANT".to_string(), "VARCHAR(20)".to_string())])
}

fn group(root: &str, properties: &[&str]) -> ViewGroup {
    let mut group = ViewGroup::new(vec![parse_path(root).unwrap()]);
    for property in properties {
        group = group.property(parse_path(property).unwrap(), ScalarType::String);
    }
    group
}

fn execute_all(conn: &Connection, statements: &[String]) {
    for sql in statements {
        conn.execute(sql, []).unwrap_or_else(|e| panic!("{sql}: {e}"));
    }
}

fn store(
    conn: &Connection,
    bundle: &SchemaBundle<StaticColumns>,
    id: &str,
    revision: i64,
    deleted: bool,
    payload: Option<&str>,
) {
    let row = bundle.row(id, revision, deleted, payload, &json!({ "TENANT": "acme" }));
    conn.execute(bundle.insert(), params_from_iter(row.into_iter().map(to_sql)))
        .unwrap();
}

fn revisions(conn: &Connection, view: &str) -> Vec<(String, i64)> {
    let mut stmt = conn
        .prepare(&format!("SELECT ID, REVISION FROM {view} ORDER BY ID"))
        .unwrap();
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
        .unwrap();
    rows.collect::<Result<Vec<_>, _>>().unwrap()
}

fn schema_objects(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn test_temporal_views_track_revisions_and_tombstones() {
    let bundle = CompilerConfig::json()
        .compile("invoice", &[], &SimpleNameResolver::default(), tenant())
        .unwrap();
    let conn = Connection::open_in_memory().unwrap();
    execute_all(&conn, bundle.creation());

    store(&conn, &bundle, "a", 1, false, Some(r#"{"total": 1}"#));
    store(&conn, &bundle, "a", 2, false, Some(r#"{"total": 2}"#));
    store(&conn, &bundle, "b", 1, false, Some(r#"{"total": 3}"#));
    store(&conn, &bundle, "b", 2, true, None);

    let a1 = ("a".to_string(), 1);
    let a2 = ("a".to_string(), 2);
    let b1 = ("b".to_string(), 1);
    let b2 = ("b".to_string(), 2);
    assert_eq!(revisions(&conn, "INVOICE_MIN"), vec![a1, b1]);
    assert_eq!(revisions(&conn, "INVOICE_MAX"), vec![a2.clone(), b2]);
    assert_eq!(revisions(&conn, "INVOICE_NOW"), vec![a2]);

    let tenant: String = conn
        .query_row(
            "SELECT TENANT FROM INVOICE_RAW WHERE ID = 'b' AND REVISION = 2",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tenant, "acme");
}

#[test]
fn test_metadata_view_round_trips_every_mapping() {
    let views = [
        group("lines", &["price", "sku", "o'brien"]),
        group("customer", &["name"]),
    ];
    let bundle = CompilerConfig::json()
        .compile("invoice", &views, &SimpleNameResolver::default(), StaticColumns::none())
        .unwrap();
    let mta = bundle
        .creation()
        .iter()
        .find(|sql| sql.starts_with("CREATE VIEW INVOICE_MTA "))
        .unwrap();

    let conn = Connection::open_in_memory().unwrap();
    conn.execute(mta, []).unwrap();

    let mut stmt = conn
        .prepare("SELECT PATH, OBJECT, NAME FROM INVOICE_MTA ORDER BY OBJECT, NAME")
        .unwrap();
    let actual = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    let mut expected: Vec<(String, String, String)> = bundle
        .metadata()
        .iter()
        .flat_map(|view| {
            view.columns
                .iter()
                .map(move |(path, column)| (path.clone(), view.view.clone(), column.clone()))
        })
        .collect();
    expected.sort_by(|a, b| (&a.1, &a.2).cmp(&(&b.1, &b.2)));

    assert_eq!(actual.len(), 4);
    assert_eq!(actual, expected);
    assert!(actual.iter().any(|(path, _, _)| path == "$.lines.\"o'brien\""));
}

#[test]
fn test_drop_statements_remove_everything() {
    let bundle = CompilerConfig::json()
        .with_on_creation(|table| vec![format!("CREATE TABLE {table}_AUDIT (ID TEXT)")])
        .with_on_drop(|table| vec![format!("DROP TABLE {table}_AUDIT")])
        .compile("invoice", &[], &SimpleNameResolver::default(), tenant())
        .unwrap();
    let conn = Connection::open_in_memory().unwrap();
    execute_all(&conn, bundle.creation());
    // raw table, its index, three temporal views, metadata view, audit table
    assert_eq!(schema_objects(&conn), 7);

    execute_all(&conn, bundle.drops());
    assert_eq!(schema_objects(&conn), 0);
}

#[test]
fn test_definition_file_provisions() {
    let definitions = docsql::parse_definitions_str(
        r#"
documents:
  invoice:
    format: json
    columns:
      - { name: TENANT, type: "VARCHAR(20)" }
    on_creation: ["CREATE INDEX {table}_REV ON {table} (REVISION)"]
"#,
    )
    .unwrap();
    let bundle = definitions.compile_document("invoice").unwrap();
    let conn = Connection::open_in_memory().unwrap();
    execute_all(&conn, bundle.creation());
    store(&conn, &bundle, "x", 1, false, Some("{}"));
    assert_eq!(revisions(&conn, "INVOICE_NOW"), vec![("x".to_string(), 1)]);

    execute_all(&conn, bundle.drops());
    assert_eq!(schema_objects(&conn), 0);
}
