//! Cluster misconfiguration scanner
//!
//! Runs every category detector concurrently over one immutable snapshot and
//! merges the results in fixed category order, so repeated scans of the same
//! snapshot produce byte-identical output.

pub mod catalog;
mod detectors;
mod models;

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

pub use models::{
    Category, DEFAULT_STALL_THRESHOLD, Finding, ScanDataError, ScanOptions, ScanResult,
    Severity, Summary,
};

use crate::models::Resource;
use detectors::DETECTORS;

/// Scan a snapshot for misconfigurations across all categories.
///
/// Detectors run as independent tasks; a snapshot that trips no detector
/// yields an empty findings list, never an error. Data-gathering failures
/// recorded in the options surface as warnings.
pub async fn scan(resources: Vec<Resource>, opts: ScanOptions) -> ScanResult {
    let snapshot: Arc<[Resource]> = resources.into();
    let opts = Arc::new(opts);
    let (tx, mut rx) = mpsc::unbounded_channel();

    for (category, detector) in DETECTORS {
        let snapshot = Arc::clone(&snapshot);
        let opts = Arc::clone(&opts);
        let tx = tx.clone();
        tokio::spawn(async move {
            let found = detector(&snapshot, &opts);
            // Receiver dropping early only happens on scan cancellation
            let _ = tx.send((*category, found));
        });
    }
    drop(tx);

    let mut by_category: BTreeMap<Category, Vec<Finding>> = BTreeMap::new();
    while let Some((category, found)) = rx.recv().await {
        debug!(category = %category, count = found.len(), "detector finished");
        by_category.insert(category, found);
    }

    let mut findings = Vec::new();
    for category in Category::all() {
        if let Some(found) = by_category.remove(category) {
            findings.extend(found);
        }
    }

    let mut warnings = Vec::new();
    for error in opts.data_errors.clone() {
        if let Some(warning) = error.into_warning() {
            warn!("{warning}");
            warnings.push(warning);
        }
    }

    let summary = Summary::from_findings(&findings);
    ScanResult {
        findings,
        warnings,
        summary,
    }
}
