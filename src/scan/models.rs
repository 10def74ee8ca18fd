//! Finding and scan result types

use crate::models::LineageRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Non-ready resources older than this count as stuck
pub const DEFAULT_STALL_THRESHOLD: Duration = Duration::from_secs(300);

/// Misconfiguration class a finding belongs to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Category {
    #[serde(rename = "SOURCE")]
    Source,
    #[serde(rename = "RENDER")]
    Render,
    #[serde(rename = "APPLY")]
    Apply,
    #[serde(rename = "DRIFT")]
    Drift,
    #[serde(rename = "CONFIG")]
    Config,
    #[serde(rename = "DEPEND")]
    Depend,
    #[serde(rename = "STATE")]
    State,
    #[serde(rename = "ORPHAN")]
    Orphan,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Source => "SOURCE",
            Category::Render => "RENDER",
            Category::Apply => "APPLY",
            Category::Drift => "DRIFT",
            Category::Config => "CONFIG",
            Category::Depend => "DEPEND",
            Category::State => "STATE",
            Category::Orphan => "ORPHAN",
        }
    }

    /// All categories in reporting order
    pub fn all() -> &'static [Self] {
        &[
            Category::Source,
            Category::Render,
            Category::Apply,
            Category::Drift,
            Category::Config,
            Category::Depend,
            Category::State,
            Category::Orphan,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// One detected misconfiguration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Stable catalogued id (see scan::catalog)
    pub id: String,
    pub category: Category,
    pub severity: Severity,
    pub resource: LineageRef,
    pub message: String,
    /// Suggested remediation, consumed by external executors
    pub fix: String,
}

/// Severity tallies, always recomputed from the findings list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

impl Summary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Summary::default();
        for finding in findings {
            match finding.severity {
                Severity::Critical => summary.critical += 1,
                Severity::Warning => summary.warning += 1,
                Severity::Info => summary.info += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.critical + self.warning + self.info
    }
}

/// Result of one scan invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub findings: Vec<Finding>,
    /// Data-gathering problems that did not abort the scan
    pub warnings: Vec<String>,
    pub summary: Summary,
}

impl ScanResult {
    /// Per-category count, re-derived from the findings list
    pub fn count_by_category(&self, category: Category) -> usize {
        self.findings
            .iter()
            .filter(|f| f.category == category)
            .count()
    }
}

/// Classified data-gathering failure from the fetch layer.
///
/// A missing CRD is expected in degraded environments and skipped silently;
/// everything else surfaces as a warning, never as an aborted scan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanDataError {
    #[error("required CRD not installed: {0}")]
    CrdNotInstalled(String),
    #[error("permission denied listing {kind}: {detail}")]
    PermissionDenied { kind: String, detail: String },
    #[error("{0}")]
    Other(String),
}

impl ScanDataError {
    /// None means silent skip; Some is an actionable warning string
    pub fn into_warning(self) -> Option<String> {
        match self {
            ScanDataError::CrdNotInstalled(_) => None,
            ScanDataError::PermissionDenied { kind, detail } => Some(format!(
                "permission denied listing {}: {} (grant list/get RBAC to the scanning identity)",
                kind, detail
            )),
            ScanDataError::Other(detail) => Some(detail),
        }
    }
}

/// Knobs for a single scan invocation
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub stall_threshold: Duration,
    /// Reference instant for threshold arithmetic; injectable for tests
    pub now: DateTime<Utc>,
    /// Failures collected while gathering the snapshot
    pub data_errors: Vec<ScanDataError>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            stall_threshold: DEFAULT_STALL_THRESHOLD,
            now: Utc::now(),
            data_errors: Vec::new(),
        }
    }
}
