//! Runs the list-then-probe workflow against a real PostgreSQL server.
//!
//! Skipped unless `VIEWPROBE_TEST_USER` is set. Optional:
//! `VIEWPROBE_TEST_PASSWORD`, `VIEWPROBE_TEST_HOST`, `VIEWPROBE_TEST_PORT`,
//! `VIEWPROBE_TEST_DATABASE` (defaults to `postgres`).

use std::env;

use viewprobe_core::{build_config, connect, Credentials, DatabaseConnection, ViewConnection, ViewService};

const SCHEMA: &str = "viewprobe_live";

async fn open() -> Option<DatabaseConnection> {
    let Ok(user) = env::var("VIEWPROBE_TEST_USER") else {
        eprintln!("VIEWPROBE_TEST_USER not set. Skipping live database test.");
        return None;
    };

    let mut credentials = Credentials::new(user);
    if let Ok(password) = env::var("VIEWPROBE_TEST_PASSWORD") {
        credentials = credentials.with_password(password);
    }

    let database = env::var("VIEWPROBE_TEST_DATABASE").unwrap_or_else(|_| "postgres".to_string());
    let mut params = build_config(database);
    if let Ok(host) = env::var("VIEWPROBE_TEST_HOST") {
        params.host = host;
    }
    if let Some(port) = env::var("VIEWPROBE_TEST_PORT").ok().and_then(|p| p.parse().ok()) {
        params.port = port;
    }

    Some(connect(&params, &credentials).await.expect("connect"))
}

#[tokio::test]
async fn live_list_and_probe_views() {
    let Some(conn) = open().await else { return };

    for statement in [
        "DROP SCHEMA IF EXISTS viewprobe_live CASCADE",
        "CREATE SCHEMA viewprobe_live",
        "CREATE TABLE viewprobe_live.users (id int, active bool)",
        "CREATE VIEW viewprobe_live.order_totals AS SELECT 1 AS total",
        "CREATE VIEW viewprobe_live.active_users AS SELECT id FROM viewprobe_live.users WHERE active",
    ] {
        conn.query(statement, &[]).await.expect(statement);
    }

    let views = ViewService::list_views(&conn, SCHEMA).await.expect("list views");
    assert_eq!(views, ["active_users", "order_totals"]);

    let ok = ViewService::probe_view(&conn, SCHEMA, "active_users").await;
    assert!(ok.is_success(), "{ok:?}");

    let again = ViewService::probe_view(&conn, SCHEMA, "active_users").await;
    assert!(again.is_success());

    let missing = ViewService::probe_view(&conn, SCHEMA, "missing_view").await;
    let failure = missing.failure().expect("missing view must fail");
    assert!(failure.message.contains("does not exist"), "{}", failure.message);
    assert_eq!(failure.sql_state.as_deref(), Some("42P01"));

    let report = ViewService::probe_schema(&conn, SCHEMA).await.expect("probe schema");
    assert_eq!(report.total(), 2);
    assert!(report.is_success());

    conn.query("DROP SCHEMA viewprobe_live CASCADE", &[]).await.expect("cleanup");
    conn.close().await;
}

#[tokio::test]
async fn live_empty_schema_lists_nothing() {
    let Some(conn) = open().await else { return };

    let views = ViewService::list_views(&conn, "viewprobe_no_such_schema").await.expect("list views");
    assert!(views.is_empty());

    conn.close().await;
}
