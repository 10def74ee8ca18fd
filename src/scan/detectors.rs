//! Per-category scan detectors
//!
//! Each detector is an independent pure function over the immutable resource
//! snapshot. Detectors never observe each other's results; the scanner merges
//! their outputs after all complete.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::models::{LineageRef, OwnerKind, Resource, resource_key};
use crate::ownership::classify;
use crate::scan::catalog;
use crate::scan::models::{Category, Finding, ScanOptions, Severity};
use crate::trace::{ReferenceStatus, extract_cross_references};

const FLUX_SOURCE_KINDS: &[&str] = &["GitRepository", "OCIRepository", "HelmRepository", "Bucket"];
const DEPLOYER_KINDS: &[&str] = &["Kustomization", "HelmRelease"];
const WORKLOAD_KINDS: &[&str] = &[
    "Deployment",
    "StatefulSet",
    "DaemonSet",
    "ReplicaSet",
    "Job",
    "CronJob",
];

/// Condition reasons that mean the apply step itself failed
const APPLY_FAILURE_REASONS: &[&str] = &[
    "ApplyFailed",
    "InstallFailed",
    "UpgradeFailed",
    "RollbackFailed",
    "HealthCheckFailed",
];

/// Condition reasons that mean rendering/building manifests failed
const RENDER_FAILURE_REASONS: &[&str] = &["BuildFailed", "ArtifactFailed"];

/// Condition reasons that mean chart pull/packaging failed
const CHART_FAILURE_REASONS: &[&str] = &[
    "ChartPullFailed",
    "ChartPackageError",
    "InvalidChartReference",
    "StorageOperationFailed",
];

pub(super) type DetectorFn = fn(&[Resource], &ScanOptions) -> Vec<Finding>;

/// One detector per category, in reporting order
pub(super) const DETECTORS: &[(Category, DetectorFn)] = &[
    (Category::Source, detect_source),
    (Category::Render, detect_render),
    (Category::Apply, detect_apply),
    (Category::Drift, detect_drift),
    (Category::Config, detect_config),
    (Category::Depend, detect_depend),
    (Category::State, detect_state),
    (Category::Orphan, detect_orphan),
];

fn detect_source(resources: &[Resource], _opts: &ScanOptions) -> Vec<Finding> {
    let mut findings = Vec::new();
    for resource in resources {
        if !FLUX_SOURCE_KINDS.contains(&resource.kind.as_str()) {
            continue;
        }
        if resource.suspended() {
            findings.push(Finding {
                id: catalog::source::SUSPENDED.to_string(),
                category: Category::Source,
                severity: Severity::Info,
                resource: resource.lineage_ref(),
                message: format!("{} {} is suspended", resource.kind, resource.name),
                fix: format!("resume reconciliation of {} {}", resource.kind, resource.name),
            });
            continue;
        }
        if !resource.status.ready {
            findings.push(Finding {
                id: catalog::source::NOT_READY.to_string(),
                category: Category::Source,
                severity: Severity::Critical,
                resource: resource.lineage_ref(),
                message: format!(
                    "{} {} is not ready: {}",
                    resource.kind,
                    resource.name,
                    ready_message(resource)
                ),
                fix: "verify the repository URL, ref and credentials".to_string(),
            });
        }
    }
    findings
}

fn detect_render(resources: &[Resource], opts: &ScanOptions) -> Vec<Finding> {
    let mut findings = Vec::new();
    for resource in resources {
        if resource.status.ready {
            continue;
        }
        if resource.kind == "Kustomization" && ready_reason_in(resource, RENDER_FAILURE_REASONS) {
            findings.push(Finding {
                id: catalog::render::BUILD_FAILED.to_string(),
                category: Category::Render,
                severity: Severity::Critical,
                resource: resource.lineage_ref(),
                message: format!(
                    "Kustomization {} failed to build: {}",
                    resource.name,
                    ready_message(resource)
                ),
                fix: "run `kustomize build` against the configured path locally".to_string(),
            });
        }
        // A chart mid-reconcile is not a packaging failure; flag only a
        // failure reason or a chart stuck non-ready past the threshold.
        if resource.kind == "HelmChart"
            && (ready_reason_in(resource, CHART_FAILURE_REASONS)
                || not_ready_for(resource, opts)
                    .is_some_and(|elapsed| elapsed > opts.stall_threshold))
        {
            findings.push(Finding {
                id: catalog::render::CHART_FAILED.to_string(),
                category: Category::Render,
                severity: Severity::Critical,
                resource: resource.lineage_ref(),
                message: format!(
                    "HelmChart {} failed to package: {}",
                    resource.name,
                    ready_message(resource)
                ),
                fix: "check the chart name/version against the source repository".to_string(),
            });
        }
    }
    findings
}

fn detect_apply(resources: &[Resource], opts: &ScanOptions) -> Vec<Finding> {
    let mut findings = Vec::new();
    for resource in resources {
        if !DEPLOYER_KINDS.contains(&resource.kind.as_str()) || resource.status.ready {
            continue;
        }
        if resource.suspended() {
            continue;
        }
        if ready_reason_in(resource, APPLY_FAILURE_REASONS) {
            findings.push(Finding {
                id: catalog::apply::FAILED.to_string(),
                category: Category::Apply,
                severity: Severity::Critical,
                resource: resource.lineage_ref(),
                message: format!(
                    "{} {} failed to apply: {}",
                    resource.kind,
                    resource.name,
                    ready_message(resource)
                ),
                fix: "inspect the controller events and the failing object".to_string(),
            });
        } else if let Some(elapsed) = not_ready_for(resource, opts) {
            if elapsed > opts.stall_threshold {
                findings.push(Finding {
                    id: catalog::apply::STUCK.to_string(),
                    category: Category::Apply,
                    severity: Severity::Warning,
                    resource: resource.lineage_ref(),
                    message: format!(
                        "{} {} reconciliation stuck for {}s: {}",
                        resource.kind,
                        resource.name,
                        elapsed.as_secs(),
                        ready_message(resource)
                    ),
                    fix: "trigger a reconcile or check the controller logs".to_string(),
                });
            }
        }
    }
    findings
}

fn detect_drift(resources: &[Resource], _opts: &ScanOptions) -> Vec<Finding> {
    let mut findings = Vec::new();
    for resource in resources {
        let (Some(applied), Some(attempted)) = (
            resource.status.last_applied_revision.as_deref(),
            resource.status.last_attempted_revision.as_deref(),
        ) else {
            continue;
        };
        if applied != attempted {
            findings.push(Finding {
                id: catalog::drift::REVISION_MISMATCH.to_string(),
                category: Category::Drift,
                severity: Severity::Warning,
                resource: resource.lineage_ref(),
                message: format!(
                    "{} {} attempted revision {} but last applied is {}",
                    resource.kind, resource.name, attempted, applied
                ),
                fix: "inspect the failing reconciliation before the revisions diverge further"
                    .to_string(),
            });
        }
    }
    findings
}

fn detect_config(resources: &[Resource], _opts: &ScanOptions) -> Vec<Finding> {
    let index = index(resources);
    let mut findings = Vec::new();
    for resource in workloads(resources) {
        let mut lookup = |reference: &LineageRef| {
            index
                .get(&resource_key(
                    &reference.kind,
                    &reference.namespace,
                    &reference.name,
                ))
                .map(|r| classify(*r))
        };
        for cross_ref in extract_cross_references(resource, &mut lookup) {
            if cross_ref.status == ReferenceStatus::Missing {
                findings.push(Finding {
                    id: catalog::config::MISSING_REFERENCE.to_string(),
                    category: Category::Config,
                    severity: Severity::Critical,
                    resource: resource.lineage_ref(),
                    message: format!(
                        "{} {} references missing {}",
                        resource.kind, resource.name, cross_ref.referenced
                    ),
                    fix: format!("create {} or fix the reference", cross_ref.referenced),
                });
            }
        }
    }
    findings
}

fn detect_depend(resources: &[Resource], _opts: &ScanOptions) -> Vec<Finding> {
    let index = index(resources);
    let mut findings = Vec::new();
    for resource in workloads(resources) {
        let own = classify(resource);
        let mut lookup = |reference: &LineageRef| {
            index
                .get(&resource_key(
                    &reference.kind,
                    &reference.namespace,
                    &reference.name,
                ))
                .map(|r| classify(*r))
        };
        for cross_ref in extract_cross_references(resource, &mut lookup) {
            if !cross_ref.coordination_risk {
                continue;
            }
            let referenced_owner = cross_ref
                .owner_of_referenced
                .map(|o| o.as_str())
                .unwrap_or("unknown");
            findings.push(Finding {
                id: catalog::depend::OWNER_MISMATCH.to_string(),
                category: Category::Depend,
                severity: Severity::Warning,
                resource: resource.lineage_ref(),
                message: format!(
                    "{}-managed {} {} references {}-managed {}; updates to it will not trigger a redeploy",
                    own.owner,
                    resource.kind,
                    resource.name,
                    referenced_owner,
                    cross_ref.referenced
                ),
                fix: "align both objects under one delivery tool or add a reload trigger"
                    .to_string(),
            });
        }
    }
    findings
}

fn detect_state(resources: &[Resource], opts: &ScanOptions) -> Vec<Finding> {
    let mut findings = Vec::new();
    for resource in resources {
        if WORKLOAD_KINDS.contains(&resource.kind.as_str()) && !resource.status.ready {
            if let Some(elapsed) = not_ready_for(resource, opts) {
                if elapsed > opts.stall_threshold {
                    findings.push(Finding {
                        id: catalog::state::NOT_READY.to_string(),
                        category: Category::State,
                        severity: Severity::Critical,
                        resource: resource.lineage_ref(),
                        message: format!(
                            "{} {} not ready for {}s: {}",
                            resource.kind,
                            resource.name,
                            elapsed.as_secs(),
                            ready_message(resource)
                        ),
                        fix: "inspect pod events and container status".to_string(),
                    });
                }
            }
        }

        // A managed object that reports nothing is the silent-failure class:
        // its controller may have stopped reconciling it entirely.
        let reports_status = FLUX_SOURCE_KINDS.contains(&resource.kind.as_str())
            || DEPLOYER_KINDS.contains(&resource.kind.as_str())
            || WORKLOAD_KINDS.contains(&resource.kind.as_str());
        if reports_status
            && resource.status.conditions.is_empty()
            && classify(resource).owner != OwnerKind::Native
        {
            findings.push(Finding {
                id: catalog::state::SILENT.to_string(),
                category: Category::State,
                severity: Severity::Info,
                resource: resource.lineage_ref(),
                message: format!(
                    "{} {} is managed but reports no status conditions",
                    resource.kind, resource.name
                ),
                fix: "confirm the managing controller is running and watching this object"
                    .to_string(),
            });
        }
    }
    findings
}

fn detect_orphan(resources: &[Resource], _opts: &ScanOptions) -> Vec<Finding> {
    let index = index(resources);
    let mut findings = Vec::new();
    for resource in resources {
        if let Some(owner) = resource.controller_owner() {
            let key = resource_key(&owner.kind, &resource.namespace, &owner.name);
            if !index.contains_key(&key) {
                findings.push(Finding {
                    id: catalog::orphan::MISSING_OWNER.to_string(),
                    category: Category::Orphan,
                    severity: Severity::Warning,
                    resource: resource.lineage_ref(),
                    message: format!(
                        "{} {} is owned by {} {} which is absent from the snapshot",
                        resource.kind, resource.name, owner.kind, owner.name
                    ),
                    fix: "delete the orphan or restore its owner".to_string(),
                });
            }
            continue;
        }

        let ownership = classify(resource);
        if ownership.owner == OwnerKind::Flux {
            let kind = ownership.sub_type.as_deref().unwrap_or("Kustomization");
            let key = resource_key(kind, &ownership.namespace, &ownership.name);
            if !index.contains_key(&key) {
                findings.push(Finding {
                    id: catalog::orphan::MISSING_DEPLOYER.to_string(),
                    category: Category::Orphan,
                    severity: Severity::Warning,
                    resource: resource.lineage_ref(),
                    message: format!(
                        "{} {} is labelled as deployed by {} {}/{} which is absent from the snapshot",
                        resource.kind,
                        resource.name,
                        kind,
                        ownership.namespace,
                        ownership.name
                    ),
                    fix: "restore the deployer or prune the resource".to_string(),
                });
            }
        }
    }
    findings
}

fn index(resources: &[Resource]) -> BTreeMap<String, &Resource> {
    resources
        .iter()
        .map(|r| (resource_key(&r.kind, &r.namespace, &r.name), r))
        .collect()
}

fn workloads(resources: &[Resource]) -> impl Iterator<Item = &Resource> {
    resources
        .iter()
        .filter(|r| WORKLOAD_KINDS.contains(&r.kind.as_str()) || r.kind == "Pod")
}

fn ready_message(resource: &Resource) -> String {
    for condition_type in ["Ready", "Healthy", "Available"] {
        if let Some(cond) = resource.condition(condition_type) {
            if !cond.message.is_empty() {
                return cond.message.clone();
            }
        }
    }
    "no condition message".to_string()
}

fn ready_reason_in(resource: &Resource, reasons: &[&str]) -> bool {
    resource
        .condition("Ready")
        .map(|c| reasons.contains(&c.reason.as_str()))
        .unwrap_or(false)
}

fn not_ready_for(resource: &Resource, opts: &ScanOptions) -> Option<Duration> {
    for condition_type in ["Ready", "Healthy", "Available"] {
        if let Some(cond) = resource.condition(condition_type) {
            if cond.status == "True" {
                return None;
            }
            return cond
                .last_transition
                .and_then(|t| (opts.now - t).to_std().ok());
        }
    }
    None
}
