//! Database connection establishment and the query capability used by probes.
//!
//! A [`DatabaseConnection`] owns exactly one tokio-postgres client. It is not
//! pooled, and callers decide when to close it.

use crate::error::ProbeError;
use crate::models::{ConnectionParameters, Credentials};

use serde_json::{Map, Number, Value};
use std::future::Future;
use tokio::task::JoinHandle;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, NoTls};

/// A result row as a mapping from column name to value.
pub type Row = Map<String, Value>;

/// Anything that can run a parameterized query and hand back rows.
///
/// Parameters are bound, never interpolated. Implementations must surface
/// server diagnostics through [`ProbeError`] unchanged.
pub trait ViewConnection: Send + Sync {
    /// Execute `sql` with `params` bound to `$1..$n`.
    fn query(
        &self,
        sql: &str,
        params: &[&str],
    ) -> impl Future<Output = Result<Vec<Row>, ProbeError>> + Send;
}

/// Open a connection using `params` and an already-resolved credential set.
///
/// The whole establish-and-validate step is bounded by `acquire_timeout_ms`.
pub async fn connect(
    params: &ConnectionParameters,
    credentials: &Credentials,
) -> Result<DatabaseConnection, ProbeError> {
    let pg_config = params.to_pg_config(credentials);

    tracing::debug!(
        url = %params.display_url(),
        user = %credentials.username,
        "Connecting"
    );

    let establish = async {
        let (client, connection) = pg_config.connect(NoTls).await?;

        let database = params.database.clone();
        let task = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(database = %database, error = %e, "Connection task ended with error");
            }
        });

        // Validate before handing the connection out
        if let Err(e) = client.simple_query("SELECT 1").await {
            task.abort();
            return Err(ProbeError::from(e));
        }

        Ok::<_, ProbeError>(DatabaseConnection { client, task, database: params.database.clone() })
    };

    let conn = tokio::time::timeout(params.acquire_timeout(), establish)
        .await
        .map_err(|_| {
            tracing::warn!(url = %params.display_url(), "Timed out establishing connection");
            ProbeError::timeout(
                format!("Could not establish connection to {}", params.display_url()),
                params.acquire_timeout_ms,
            )
        })??;

    tracing::info!(
        host = %params.host,
        port = params.port,
        database = %params.database,
        "Connection established"
    );

    Ok(conn)
}

/// An open PostgreSQL connection.
pub struct DatabaseConnection {
    client: Client,
    task: JoinHandle<()>,
    database: String,
}

impl DatabaseConnection {
    /// Name of the connected database.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Check if the underlying connection has closed.
    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }

    /// Close the connection and wait for the background task to finish.
    pub async fn close(self) {
        let Self { client, task, database } = self;
        drop(client);
        if let Err(e) = task.await {
            tracing::error!(database = %database, error = %e, "Connection task panicked");
        }
        tracing::info!(database = %database, "Connection closed");
    }
}

impl std::fmt::Debug for DatabaseConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConnection")
            .field("database", &self.database)
            .field("is_closed", &self.is_closed())
            .finish()
    }
}

impl ViewConnection for DatabaseConnection {
    async fn query(&self, sql: &str, params: &[&str]) -> Result<Vec<Row>, ProbeError> {
        let bound: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        let rows = self.client.query(sql, &bound).await?;
        Ok(rows.iter().map(row_to_map).collect())
    }
}

/// Convert a tokio-postgres row into a field mapping.
fn row_to_map(row: &tokio_postgres::Row) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| (col.name().to_string(), column_value(row, idx, col.type_())))
        .collect()
}

/// Read one column as JSON. Unsupported types and NULL become `Value::Null`.
fn column_value(row: &tokio_postgres::Row, idx: usize, ty: &Type) -> Value {
    fn get<'a, T>(row: &'a tokio_postgres::Row, idx: usize) -> Option<T>
    where
        T: tokio_postgres::types::FromSql<'a>,
    {
        row.try_get::<_, Option<T>>(idx).ok().flatten()
    }

    match *ty {
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            get::<String>(row, idx).map(Value::String)
        }
        Type::INT2 => get::<i16>(row, idx).map(|v| Value::Number(v.into())),
        Type::INT4 => get::<i32>(row, idx).map(|v| Value::Number(v.into())),
        Type::INT8 => get::<i64>(row, idx).map(|v| Value::Number(v.into())),
        Type::FLOAT4 => get::<f32>(row, idx).and_then(|v| Number::from_f64(f64::from(v))).map(Value::Number),
        Type::FLOAT8 => get::<f64>(row, idx).and_then(Number::from_f64).map(Value::Number),
        Type::BOOL => get::<bool>(row, idx).map(Value::Bool),
        _ => None,
    }
    .unwrap_or(Value::Null)
}
