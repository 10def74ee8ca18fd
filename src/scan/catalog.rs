//! Catalogued finding ids
//!
//! Each category module provides the stable id constants its detector emits.
//! Ids never change meaning once published; remediation tooling routes on
//! them.

/// Source fetch failures
pub mod source {
    /// Source object not ready
    pub const NOT_READY: &str = "CCVE-SRC-001";
    /// Source reconciliation suspended
    pub const SUSPENDED: &str = "CCVE-SRC-002";
}

/// Manifest build/render failures
pub mod render {
    /// Kustomization build failed
    pub const BUILD_FAILED: &str = "CCVE-RND-001";
    /// Helm chart packaging/pull failed
    pub const CHART_FAILED: &str = "CCVE-RND-002";
}

/// Apply/install failures
pub mod apply {
    /// Apply, install or upgrade failed outright
    pub const FAILED: &str = "CCVE-APL-001";
    /// Reconciliation stuck past the stall threshold
    pub const STUCK: &str = "CCVE-APL-002";
}

/// Desired-vs-live divergence
pub mod drift {
    /// Attempted revision was never applied
    pub const REVISION_MISMATCH: &str = "CCVE-DFT-001";
}

/// Broken configuration references
pub mod config {
    /// Workload references a ConfigMap/Secret that does not exist
    pub const MISSING_REFERENCE: &str = "CCVE-CFG-001";
}

/// Cross-owner coordination risks
pub mod depend {
    /// Referenced object is managed by a different authority
    pub const OWNER_MISMATCH: &str = "CCVE-DEP-001";
}

/// Runtime state failures
pub mod state {
    /// Workload not ready past the stall threshold
    pub const NOT_READY: &str = "CCVE-STA-001";
    /// Managed resource reports no status conditions at all
    pub const SILENT: &str = "CCVE-STA-002";
}

/// Dangling ownership
pub mod orphan {
    /// Controller owner reference points at a missing object
    pub const MISSING_OWNER: &str = "CCVE-ORP-001";
    /// GitOps deployer named by labels is missing from the cluster
    pub const MISSING_DEPLOYER: &str = "CCVE-ORP-002";
}
