//! Ownership classifier
//!
//! Assigns exactly one controlling authority to a resource. Detectors are an
//! ordered list of pure functions evaluated in sequence; the first to match
//! wins. Classification is total: a resource with no signal is Native, never
//! an error.

mod detectors;

pub use detectors::labels;

use crate::models::{OwnerKind, Resource};
use serde::{Deserialize, Serialize};

/// Signal strength behind a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    /// Explicit dedicated label or annotation
    High,
    /// Inferred or fallback signal
    Medium,
    /// No signal (Native)
    Low,
}

/// The single ownership verdict for a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ownership {
    pub owner: OwnerKind,
    /// Finer role within the owner's hierarchy, e.g. "Kustomization" for
    /// Flux, "claim"/"composite"/"instance" for Crossplane
    pub sub_type: Option<String>,
    /// Name of the managing object
    pub name: String,
    pub namespace: String,
    /// The literal signal examined, e.g. "label:crossplane.io/composite"
    pub source: String,
    pub confidence: Confidence,
}

impl Ownership {
    /// The default verdict when no detector matches
    pub fn native(resource: &Resource) -> Self {
        Ownership {
            owner: OwnerKind::Native,
            sub_type: None,
            name: resource.name.clone(),
            namespace: resource.namespace.clone(),
            source: "none".to_string(),
            confidence: Confidence::Low,
        }
    }
}

type Detector = fn(&Resource) -> Option<Ownership>;

/// Fixed priority cascade. Order is load-bearing: a resource carrying both
/// Flux and Helm labels must classify as Flux.
const DETECTORS: &[Detector] = &[
    detectors::detect_flux,
    detectors::detect_argocd,
    detectors::detect_helm,
    detectors::detect_terraform,
    detectors::detect_confighub,
    detectors::detect_crossplane,
    detectors::detect_owner_ref,
];

/// Classify a resource. Total and pure: always returns exactly one verdict.
pub fn classify(resource: &Resource) -> Ownership {
    for detector in DETECTORS {
        if let Some(ownership) = detector(resource) {
            return ownership;
        }
    }
    Ownership::native(resource)
}
