//! Owner kind definitions
//!
//! This module provides a centralized enum for every controlling authority
//! the classifier can assign. This eliminates hardcoded strings throughout
//! the codebase and provides type safety for ownership references.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Enumeration of all controlling authorities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerKind {
    Flux,
    #[serde(rename = "ArgoCD")]
    ArgoCd,
    Helm,
    Terraform,
    ConfigHub,
    Crossplane,
    K8sOwnerRef,
    Native,
}

impl OwnerKind {
    /// Get the display name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::Flux => "Flux",
            OwnerKind::ArgoCd => "ArgoCD",
            OwnerKind::Helm => "Helm",
            OwnerKind::Terraform => "Terraform",
            OwnerKind::ConfigHub => "ConfigHub",
            OwnerKind::Crossplane => "Crossplane",
            OwnerKind::K8sOwnerRef => "K8sOwnerRef",
            OwnerKind::Native => "Native",
        }
    }

    /// Try to parse a string into an OwnerKind, returning None if invalid
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Get all owner kinds in classification priority order
    pub fn all() -> &'static [Self] {
        &[
            OwnerKind::Flux,
            OwnerKind::ArgoCd,
            OwnerKind::Helm,
            OwnerKind::Terraform,
            OwnerKind::ConfigHub,
            OwnerKind::Crossplane,
            OwnerKind::K8sOwnerRef,
            OwnerKind::Native,
        ]
    }

    /// Try to parse a string (case-insensitive) into an OwnerKind
    ///
    /// Accepts the short aliases users type in query expressions.
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "flux" | "fluxcd" => Some(OwnerKind::Flux),
            "argocd" | "argo" => Some(OwnerKind::ArgoCd),
            "helm" => Some(OwnerKind::Helm),
            "terraform" | "tf" => Some(OwnerKind::Terraform),
            "confighub" => Some(OwnerKind::ConfigHub),
            "crossplane" | "xp" => Some(OwnerKind::Crossplane),
            "k8sownerref" | "ownerref" => Some(OwnerKind::K8sOwnerRef),
            "native" | "unmanaged" => Some(OwnerKind::Native),
            _ => None,
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<OwnerKind> for String {
    fn from(kind: OwnerKind) -> Self {
        kind.as_str().to_string()
    }
}

impl FromStr for OwnerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Flux" => Ok(OwnerKind::Flux),
            "ArgoCD" => Ok(OwnerKind::ArgoCd),
            "Helm" => Ok(OwnerKind::Helm),
            "Terraform" => Ok(OwnerKind::Terraform),
            "ConfigHub" => Ok(OwnerKind::ConfigHub),
            "Crossplane" => Ok(OwnerKind::Crossplane),
            "K8sOwnerRef" => Ok(OwnerKind::K8sOwnerRef),
            "Native" => Ok(OwnerKind::Native),
            _ => Err(format!("Unknown owner kind: {}", s)),
        }
    }
}
