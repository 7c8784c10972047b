//! View listing and probing.
//!
//! Lists the views of a schema from `information_schema` and runs a cheap
//! `SELECT COUNT(*)` against each one to check that it is still queryable.

use std::time::Instant;

use serde_json::Value;

use crate::error::ProbeError;
use crate::models::{ProbeReport, ProbeResult, ViewName};
use crate::services::connection::ViewConnection;

/// Catalog query listing a schema's views, schema bound as `$1`.
pub const LIST_VIEWS_SQL: &str = r#"
    SELECT table_name::text AS table_name
    FROM information_schema.views
    WHERE table_schema::text = $1
    ORDER BY table_name
"#;

/// Column holding the view name in [`LIST_VIEWS_SQL`] results.
const VIEW_NAME_COLUMN: &str = "table_name";

/// Query for the first schema on the session's `search_path`.
pub const CURRENT_SCHEMA_SQL: &str = "SELECT current_schema()::text AS schema";

/// Schema used when the `search_path` names no existing schema.
pub const DEFAULT_SCHEMA: &str = "public";

/// View listing and probing service.
pub struct ViewService;

impl ViewService {
    /// Resolve the schema unqualified names refer to on this connection.
    ///
    /// `current_schema()` is NULL when no `search_path` entry exists; that
    /// falls back to [`DEFAULT_SCHEMA`].
    pub async fn current_schema<C: ViewConnection>(conn: &C) -> Result<String, ProbeError> {
        let rows = conn.query(CURRENT_SCHEMA_SQL, &[]).await?;

        let schema = rows
            .into_iter()
            .next()
            .and_then(|mut row| match row.remove("schema") {
                Some(Value::String(name)) if !name.is_empty() => Some(name),
                _ => None,
            })
            .unwrap_or_else(|| DEFAULT_SCHEMA.to_string());

        tracing::debug!(schema, "Resolved current schema");
        Ok(schema)
    }

    /// List the views in `schema`, ascending by name.
    ///
    /// Errors from the connection are returned unchanged. A schema without
    /// views yields an empty list.
    pub async fn list_views<C: ViewConnection>(
        conn: &C,
        schema: &str,
    ) -> Result<Vec<ViewName>, ProbeError> {
        tracing::debug!(schema, "Listing views");

        let rows = conn.query(LIST_VIEWS_SQL, &[schema]).await?;

        let mut views: Vec<ViewName> = rows
            .into_iter()
            .filter_map(|mut row| match row.remove(VIEW_NAME_COLUMN) {
                Some(Value::String(name)) => Some(ViewName::new(name)),
                _ => None,
            })
            .collect();
        // Server collation may differ from byte order.
        views.sort();

        tracing::debug!(schema, count = views.len(), "Listed views");
        Ok(views)
    }

    /// Time a `SELECT COUNT(*) ... LIMIT 1` against `schema.view`.
    ///
    /// Never fails: query errors become [`ProbeResult::Failure`] carrying the
    /// message, SQLSTATE and error code the driver exposed.
    ///
    /// `schema` and `view` are quoted but not escaped, so they must be trusted
    /// catalog values such as those returned by [`ViewService::list_views`].
    pub async fn probe_view<C: ViewConnection>(conn: &C, schema: &str, view: &str) -> ProbeResult {
        let sql = probe_sql(schema, view);

        let start = Instant::now();
        let outcome = conn.query(&sql, &[]).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(_) => {
                tracing::debug!(schema, view, duration_ms, "Probe succeeded");
                ProbeResult::success(duration_ms)
            }
            Err(e) => {
                tracing::warn!(
                    schema,
                    view,
                    error = %e,
                    sql_state = e.sql_state().unwrap_or("-"),
                    "Probe failed"
                );
                ProbeResult::from_error(&e)
            }
        }
    }

    /// Probe every view in `schema`, one after another.
    ///
    /// A failure to list views is returned as an error; individual probe
    /// failures are recorded in the report and do not stop the batch.
    pub async fn probe_schema<C: ViewConnection>(
        conn: &C,
        schema: &str,
    ) -> Result<ProbeReport, ProbeError> {
        let views = Self::list_views(conn, schema).await?;
        let mut report = ProbeReport::new(schema);

        for view in views {
            let result = Self::probe_view(conn, schema, view.as_str()).await;
            report.push(view, result);
        }

        tracing::info!(
            schema,
            total = report.total(),
            passed = report.passed(),
            failed = report.failed(),
            "Schema probe completed"
        );

        Ok(report)
    }
}

/// Build the probe statement for `schema.view`.
pub fn probe_sql(schema: &str, view: &str) -> String {
    format!(r#"SELECT COUNT(*) FROM "{schema}"."{view}" LIMIT 1"#)
}
