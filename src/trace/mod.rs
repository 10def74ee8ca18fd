//! Lineage and cross-reference resolver
//!
//! Reconstructs multi-hop delivery chains (source -> deployer -> resource)
//! from a snapshot, one hop at a time, through a caller-provided fetch
//! callback. A hop that cannot be fetched never aborts the walk: it becomes an
//! explicit partial link built from whatever reference metadata is locally
//! available.

mod core;
mod crossplane;
mod crossref;
mod models;

pub use self::core::trace;
pub use crossplane::{CrossplaneLineage, LineageNode, resolve_crossplane_lineage};
pub use crossref::{
    CrossReference, ReferenceKind, ReferenceStatus, extract_cross_references,
};
pub use models::{ChainLink, TraceDirection, TraceOptions, TraceResult};
