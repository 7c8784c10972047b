//! View probe models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProbeError;

/// Name of a view within a schema.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewName(String);

impl ViewName {
    /// Wrap a view name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ViewName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ViewName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ViewName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ViewName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<&str> for ViewName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Diagnostics captured from a failed probe.
///
/// Fields the underlying error did not expose stay `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    /// Error message
    pub message: String,
    /// SQLSTATE, if reported
    pub sql_state: Option<String>,
    /// Vendor error code, if reported
    pub error_code: Option<String>,
}

impl ProbeFailure {
    /// Extract the reportable fields from an error.
    pub fn from_error(err: &ProbeError) -> Self {
        Self {
            message: err.to_string(),
            sql_state: err.sql_state().map(String::from),
            error_code: err.error_code().map(String::from),
        }
    }
}

/// Outcome of a single view probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ProbeRecord", try_from = "ProbeRecord")]
pub enum ProbeResult {
    /// The probe query completed.
    Success {
        /// Wall-clock time from issuing the query to receiving its result
        duration_ms: u64,
    },
    /// The probe query failed.
    Failure(ProbeFailure),
}

impl ProbeResult {
    /// Create a success result.
    pub fn success(duration_ms: u64) -> Self {
        Self::Success { duration_ms }
    }

    /// Create a failure result from an error.
    pub fn from_error(err: &ProbeError) -> Self {
        Self::Failure(ProbeFailure::from_error(err))
    }

    /// Check if the probe succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Duration of a successful probe.
    pub fn duration_ms(&self) -> Option<u64> {
        match self {
            Self::Success { duration_ms } => Some(*duration_ms),
            Self::Failure(_) => None,
        }
    }

    /// Failure diagnostics, if the probe failed.
    pub fn failure(&self) -> Option<&ProbeFailure> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}

/// Flat wire shape for [`ProbeResult`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProbeRecord {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sql_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_code: Option<String>,
}

impl From<ProbeResult> for ProbeRecord {
    fn from(result: ProbeResult) -> Self {
        match result {
            ProbeResult::Success { duration_ms } => Self {
                success: true,
                duration_ms: Some(duration_ms),
                message: None,
                sql_state: None,
                error_code: None,
            },
            ProbeResult::Failure(failure) => Self {
                success: false,
                duration_ms: None,
                message: Some(failure.message),
                sql_state: failure.sql_state,
                error_code: failure.error_code,
            },
        }
    }
}

impl TryFrom<ProbeRecord> for ProbeResult {
    type Error = String;

    fn try_from(record: ProbeRecord) -> Result<Self, Self::Error> {
        if record.success {
            let duration_ms = record.duration_ms.ok_or("successful probe requires durationMs")?;
            Ok(Self::Success { duration_ms })
        } else {
            let message = record.message.ok_or("failed probe requires message")?;
            Ok(Self::Failure(ProbeFailure {
                message,
                sql_state: record.sql_state,
                error_code: record.error_code,
            }))
        }
    }
}

/// A probed view and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOutcome {
    /// The view that was probed
    pub view: ViewName,
    /// What happened
    pub result: ProbeResult,
}

/// Results of probing every view in a schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    /// Schema that was probed
    pub schema: String,
    /// When the batch started
    pub started_at: DateTime<Utc>,
    /// One entry per view, in listing order
    pub outcomes: Vec<ViewOutcome>,
}

impl ProbeReport {
    /// Create an empty report for `schema`.
    pub fn new(schema: impl Into<String>) -> Self {
        Self { schema: schema.into(), started_at: Utc::now(), outcomes: Vec::new() }
    }

    /// Record an outcome.
    pub fn push(&mut self, view: ViewName, result: ProbeResult) {
        self.outcomes.push(ViewOutcome { view, result });
    }

    /// Number of views probed.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of successful probes.
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_success()).count()
    }

    /// Number of failed probes.
    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &ViewOutcome> {
        self.outcomes.iter().filter(|o| !o.result.is_success())
    }

    /// True when every view probed successfully (vacuously true for an empty schema).
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Sum of successful probe durations.
    pub fn total_duration_ms(&self) -> u64 {
        self.outcomes.iter().filter_map(|o| o.result.duration_ms()).sum()
    }
}
