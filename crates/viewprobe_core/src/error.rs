//! Error types for viewprobe.
//!
//! Carries PostgreSQL diagnostic fields (message, SQLSTATE, detail, hint) so
//! that probe failures can report everything the server told us.

use thiserror::Error;

/// Main error type for viewprobe.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Database connection failed or was lost.
    #[error("Connection error: {message}")]
    Connection {
        /// Human-readable error message.
        message: String,
        /// SQLSTATE reported by the server, if any.
        sql_state: Option<String>,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication failed.
    #[error("Authentication error: {message}")]
    Authentication {
        /// Human-readable error message.
        message: String,
        /// Actionable hint for the user.
        hint: Option<String>,
        /// SQLSTATE reported by the server, if any.
        sql_state: Option<String>,
    },

    /// Query execution error with server-side details.
    #[error("{message}")]
    Query {
        /// Server error message.
        message: String,
        /// Additional detail from the server.
        detail: Option<String>,
        /// Server hint.
        hint: Option<String>,
        /// Position in query (1-indexed).
        position: Option<usize>,
        /// SQLSTATE (e.g., "42P01").
        sql_state: Option<String>,
        /// Vendor-specific numeric or symbolic error code.
        error_code: Option<String>,
    },

    /// An operation exceeded its configured time limit.
    #[error("Timeout: {message}")]
    Timeout {
        /// Human-readable error message.
        message: String,
        /// The limit that was exceeded, in milliseconds.
        timeout_ms: u64,
    },
}

impl ProbeError {
    // ========== Constructors ==========

    /// Create a new connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), sql_state: None, source: None }
    }

    /// Create a new authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            hint: Some("Check username and password".to_string()),
            sql_state: None,
        }
    }

    /// Create a new query error with full server details.
    pub fn query(
        message: impl Into<String>,
        detail: Option<String>,
        hint: Option<String>,
        position: Option<usize>,
        sql_state: Option<String>,
    ) -> Self {
        Self::Query { message: message.into(), detail, hint, position, sql_state, error_code: None }
    }

    /// Attach a vendor error code to a query error. Other variants are returned unchanged.
    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        if let Self::Query { error_code, .. } = &mut self {
            *error_code = Some(code.into());
        }
        self
    }

    /// Create a new timeout error.
    pub fn timeout(message: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout { message: message.into(), timeout_ms }
    }

    // ========== Methods ==========

    /// Check if this error means the connection is no longer usable.
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "Connection",
            Self::Authentication { .. } => "Authentication",
            Self::Query { .. } => "Query",
            Self::Timeout { .. } => "Timeout",
        }
    }

    /// Get actionable hint for the user.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Connection { .. } => Some("Check that the database server is running"),
            Self::Authentication { hint, .. } => hint.as_deref(),
            Self::Query { hint, .. } => hint.as_deref(),
            Self::Timeout { .. } => Some("The server may be overloaded or unreachable"),
        }
    }

    /// Get the SQLSTATE code (if the server supplied one).
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Connection { sql_state, .. }
            | Self::Authentication { sql_state, .. }
            | Self::Query { sql_state, .. } => sql_state.as_deref(),
            _ => None,
        }
    }

    /// Get the vendor error code (if the driver supplied one).
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Query { error_code, .. } => error_code.as_deref(),
            _ => None,
        }
    }

    /// Get position in query (if applicable).
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Query { position, .. } => *position,
            _ => None,
        }
    }

    /// Convert to user-displayable error info.
    pub fn to_error_info(&self) -> ErrorInfo {
        let error_type = format!("{} Error", self.category());
        let message = self.to_string();
        let hint = self.hint().map(String::from);

        let technical_detail = match self {
            Self::Query { detail, sql_state, error_code, position, .. } => {
                let mut parts = Vec::new();
                if let Some(state) = sql_state {
                    parts.push(format!("SQLSTATE: {state}"));
                }
                if let Some(code) = error_code {
                    parts.push(format!("Code: {code}"));
                }
                if let Some(pos) = position {
                    parts.push(format!("Position: {pos}"));
                }
                if let Some(detail) = detail {
                    parts.push(format!("Detail: {detail}"));
                }
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("\n"))
                }
            }
            Self::Timeout { timeout_ms, .. } => Some(format!("Limit: {timeout_ms} ms")),
            _ => None,
        };

        ErrorInfo { error_type, message, hint, technical_detail }
    }
}

/// User-displayable error information.
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Category name (e.g., "Connection Error").
    pub error_type: String,
    /// User-friendly message.
    pub message: String,
    /// Actionable suggestion.
    pub hint: Option<String>,
    /// Technical detail (SQLSTATE, position, server detail).
    pub technical_detail: Option<String>,
}

// ========== Error Conversions ==========

/// Convert from tokio_postgres::Error to ProbeError.
impl From<tokio_postgres::Error> for ProbeError {
    fn from(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let message = db_err.message().to_string();
            let detail = db_err.detail().map(String::from);
            let hint = db_err.hint().map(String::from);
            let position = db_err.position().and_then(|p| match p {
                tokio_postgres::error::ErrorPosition::Original(pos) => Some(*pos as usize),
                tokio_postgres::error::ErrorPosition::Internal { .. } => None,
            });
            let code_str = db_err.code().code();
            let sql_state = Some(code_str.to_string());

            return match code_str {
                "28P01" => ProbeError::Authentication {
                    message,
                    hint: Some("Invalid password - check the credentials profile".to_string()),
                    sql_state,
                },
                "28000" => ProbeError::Authentication {
                    message,
                    hint: Some("Authentication failed - check username and permissions".to_string()),
                    sql_state,
                },
                _ if code_str.starts_with("08") => {
                    ProbeError::Connection { message, sql_state, source: Some(Box::new(err)) }
                }
                // PostgreSQL has no vendor code beyond SQLSTATE.
                _ => ProbeError::Query { message, detail, hint, position, sql_state, error_code: None },
            };
        }

        if err.is_closed() {
            return ProbeError::Connection {
                message: "Connection closed".to_string(),
                sql_state: None,
                source: Some(Box::new(err)),
            };
        }

        ProbeError::Connection { message: err.to_string(), sql_state: None, source: Some(Box::new(err)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_exposes_diagnostics() {
        let err = ProbeError::query(
            "relation \"testdb.missing_view\" does not exist",
            None,
            None,
            Some(22),
            Some("42P01".to_string()),
        );

        assert_eq!(err.category(), "Query");
        assert_eq!(err.sql_state(), Some("42P01"));
        assert_eq!(err.error_code(), None);
        assert_eq!(err.position(), Some(22));
        assert_eq!(err.to_string(), "relation \"testdb.missing_view\" does not exist");
    }

    #[test]
    fn test_with_error_code_only_touches_query_errors() {
        let err = ProbeError::query("boom", None, None, None, None).with_error_code("1146");
        assert_eq!(err.error_code(), Some("1146"));

        let err = ProbeError::connection("refused").with_error_code("1146");
        assert_eq!(err.error_code(), None);
    }

    #[test]
    fn test_error_info_includes_technical_detail() {
        let err = ProbeError::query(
            "syntax error",
            Some("near LIMIT".to_string()),
            None,
            Some(7),
            Some("42601".to_string()),
        );
        let info = err.to_error_info();

        assert_eq!(info.error_type, "Query Error");
        let detail = info.technical_detail.unwrap();
        assert!(detail.contains("SQLSTATE: 42601"));
        assert!(detail.contains("Position: 7"));
        assert!(detail.contains("Detail: near LIMIT"));
    }

    #[test]
    fn test_timeout_has_hint_and_limit() {
        let err = ProbeError::timeout("connection not established", 10_000);
        assert_eq!(err.category(), "Timeout");
        assert!(err.hint().is_some());
        assert_eq!(err.to_error_info().technical_detail.as_deref(), Some("Limit: 10000 ms"));
    }

    #[test]
    fn test_connection_error_is_connection_lost() {
        assert!(ProbeError::connection("gone").is_connection_lost());
        assert!(!ProbeError::timeout("slow", 1).is_connection_lost());
    }

    #[test]
    fn test_authentication_default_hint() {
        let err = ProbeError::authentication("password authentication failed");
        assert_eq!(err.hint(), Some("Check username and password"));
        assert_eq!(err.sql_state(), None);
    }
}
