//! Shared types for the quiz bank service and its HTTP clients.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// =====================================================
// Domain Types
// =====================================================

/// A single quiz question as authored on disk.
///
/// Records are opaque: every field is passed through untouched. Only `topic`
/// is inspected, for grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Question(Map<String, Value>);

impl Question {
    /// The record's `topic`, if present and a string.
    pub fn topic(&self) -> Option<&str> {
        self.0.get("topic").and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Question {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// How the service sources its aggregate question set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreMode {
    /// Load every month file once at startup and serve from memory.
    Preload,
    /// Re-read the data directory on every request.
    Live,
}

impl StoreMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreMode::Preload => "preload",
            StoreMode::Live => "live",
        }
    }
}

impl fmt::Display for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StoreMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preload" | "cache" | "cached" => Ok(StoreMode::Preload),
            "live" | "disk" => Ok(StoreMode::Live),
            other => Err(format!(
                "unknown store mode '{}' (expected 'preload' or 'live')",
                other
            )),
        }
    }
}

// =====================================================
// Response Types
// =====================================================

/// Body of every non-2xx JSON response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

// =====================================================
// Service Status
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub version: String,
    pub mode: StoreMode,
    pub uptime_secs: u64,
    pub question_count: usize,
    pub topic_count: usize,
    pub month_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<String>,
}
