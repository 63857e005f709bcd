//! Integration tests for sqlbind-pg.
//!
//! These need PostgreSQL on localhost:5432 with SCRAM-SHA-256 auth, so they
//! are `#[ignore]`d by default. To run:
//!
//! ```text
//! podman run -d --name sqlbind-test-pg -e POSTGRES_USER=sqlbind \
//!   -e POSTGRES_PASSWORD=sqlbind -e POSTGRES_DB=sqlbind_test \
//!   -p 5432:5432 postgres:17
//! cargo test --test integration -- --ignored --nocapture
//! ```

use sqlbind_core::query_file::UntypedQuery;
use sqlbind_core::typed::{QueryKind, ScalarType, TypeRef};
use sqlbind_pg::{Introspector, PgConnection, PgResult};

fn connect() -> PgResult<PgConnection> {
    PgConnection::connect("127.0.0.1", 5432, "sqlbind", Some("sqlbind"), "sqlbind_test")
}

fn untyped(name: &str, sql: &str, kind: Option<QueryKind>) -> UntypedQuery {
    UntypedQuery {
        name: name.to_string(),
        file_path: "integration.sql".to_string(),
        sql: sql.to_string(),
        comment: None,
        kind,
    }
}

#[test]
#[ignore = "needs a local PostgreSQL"]
fn test_connect_and_simple_query() -> PgResult<()> {
    let mut conn = connect()?;
    let rows = conn.simple_query("SELECT 1")?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0].as_deref(), Some(b"1".as_slice()));
    conn.close()
}

#[test]
#[ignore = "needs a local PostgreSQL"]
fn test_introspect_find_by_id() -> PgResult<()> {
    let mut conn = connect()?;
    conn.simple_query(
        "CREATE TABLE IF NOT EXISTS users (id int4 NOT NULL, name text NOT NULL)",
    )?;

    let mut introspector = Introspector::new(conn);
    let typed = introspector.introspect(&untyped(
        "GetUser",
        "SELECT id, name FROM users WHERE id = $1",
        Some(QueryKind::One),
    ))?;

    assert_eq!(typed.kind, QueryKind::One);
    assert_eq!(typed.params.len(), 1);
    assert_eq!(typed.params[0].name, "id");
    assert_eq!(typed.params[0].ty, TypeRef::Scalar(ScalarType::Int4));
    assert_eq!(typed.columns.len(), 2);
    assert!(typed.columns.iter().all(|c| !c.nullable));
    introspector.into_connection().close()
}

#[test]
#[ignore = "needs a local PostgreSQL"]
fn test_introspect_nullability_hint() -> PgResult<()> {
    let conn = connect()?;
    let mut introspector = Introspector::new(conn);
    let typed = introspector.introspect(&untyped(
        "CountUsers",
        "SELECT COUNT(*) AS total! FROM users",
        Some(QueryKind::One),
    ))?;

    assert_eq!(typed.columns.len(), 1);
    assert_eq!(typed.columns[0].name, "total");
    assert!(!typed.columns[0].nullable);
    assert_eq!(typed.columns[0].table_oid, 0);
    introspector.into_connection().close()
}

#[test]
#[ignore = "needs a local PostgreSQL"]
fn test_introspect_bad_sql_reports_server_message() {
    let conn = connect().expect("connect");
    let mut introspector = Introspector::new(conn);
    let err = introspector
        .introspect(&untyped("Broken", "SELECT * FROM no_such_table", None))
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Broken"), "got: {}", msg);
    assert!(msg.contains("no_such_table"), "got: {}", msg);
}

#[test]
#[ignore = "needs a local PostgreSQL"]
fn test_enum_resolution_is_cached() -> PgResult<()> {
    let mut conn = connect()?;
    conn.simple_query("DROP TYPE IF EXISTS mood CASCADE")?;
    conn.simple_query("CREATE TYPE mood AS ENUM ('sad', 'ok', 'happy')")?;

    let mut introspector = Introspector::new(conn);
    let typed = introspector.introspect(&untyped(
        "PickMood",
        "SELECT 'ok'::mood AS mood!",
        Some(QueryKind::One),
    ))?;

    match &typed.columns[0].ty {
        TypeRef::Enum { name, variants } => {
            assert_eq!(name, "mood");
            assert_eq!(variants, &["sad", "ok", "happy"]);
        }
        other => panic!("expected enum, got {:?}", other),
    }
    introspector.into_connection().close()
}
