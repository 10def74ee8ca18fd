//! ownscope library
//!
//! Deterministic ownership and lineage resolution for Kubernetes GitOps
//! resources: a priority-cascade ownership classifier, a partial-lineage
//! trace walker, a boolean query language and a categorized
//! misconfiguration scanner. All engines are pure over immutable snapshots;
//! the kube module is the only component that talks to a cluster.

pub mod cli;
pub mod kube;
pub mod models;
pub mod ownership;
pub mod query;
pub mod scan;
pub mod trace;

// Re-export commonly used types for convenience
pub use models::{LineageRef, OwnerKind, Resource, resource_key};
pub use ownership::{Confidence, Ownership, classify};
pub use scan::{ScanOptions, ScanResult, scan};
pub use trace::{TraceOptions, TraceResult, trace};
