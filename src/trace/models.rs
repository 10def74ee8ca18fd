//! Data structures for trace results

use crate::models::{LineageRef, Resource};
use crate::trace::crossref::CrossReference;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Non-ready links older than this are flagged as stalled
pub const DEFAULT_STALL_THRESHOLD: Duration = Duration::from_secs(300);

/// Chain ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceDirection {
    /// Outermost source first (source -> deployer -> resource)
    Forward,
    /// Resource first (resource -> owner chain)
    Reverse,
}

/// Knobs for a single trace invocation
#[derive(Debug, Clone)]
pub struct TraceOptions {
    pub direction: TraceDirection,
    pub stall_threshold: Duration,
    /// Reference instant for elapsed-time computation; injectable for tests
    pub now: DateTime<Utc>,
    pub max_hops: usize,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            direction: TraceDirection::Reverse,
            stall_threshold: DEFAULT_STALL_THRESHOLD,
            now: Utc::now(),
            max_hops: 12,
        }
    }
}

/// One node in the delivery chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainLink {
    pub kind: String,
    pub name: String,
    pub namespace: String,
    /// False when the object could not be fetched and only reference
    /// metadata is known (partial lineage, not failure)
    pub present: bool,
    pub ready: Option<bool>,
    pub message: String,
    pub elapsed_since_transition: Option<Duration>,
    pub stalled: bool,
}

impl ChainLink {
    /// A partial link for an object that could not be fetched
    pub fn absent(reference: &LineageRef) -> Self {
        ChainLink {
            kind: reference.kind.clone(),
            name: reference.name.clone(),
            namespace: reference.namespace.clone(),
            present: false,
            ready: None,
            message: String::new(),
            elapsed_since_transition: None,
            stalled: false,
        }
    }
}

/// The resolved delivery chain for one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceResult {
    /// The object being traced
    pub root: Resource,
    /// The chain of managing/source objects, ordered per TraceDirection;
    /// the root itself is not repeated in the chain
    pub chain: Vec<ChainLink>,
    /// Coordination-relevant references of the root workload
    pub cross_references: Vec<CrossReference>,
}
