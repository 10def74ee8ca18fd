//! Cross-resource reference extraction
//!
//! Scans a workload's pod template for ConfigMap/Secret references and
//! classifies each target's owner through a caller-provided lookup. A
//! reference whose target is managed by a different authority than the
//! workload itself is a coordination risk: updates to the target will not
//! trigger a redeploy.

use std::collections::HashSet;

use crate::models::{LineageRef, OwnerKind, Resource};
use crate::ownership::{Ownership, classify};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where in the pod template the reference was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    EnvFrom,
    ValueFrom,
    Volume,
    ProjectedVolume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceStatus {
    Exists,
    Missing,
}

/// One deduplicated reference from a workload to a ConfigMap or Secret
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossReference {
    pub referenced: LineageRef,
    pub reference_kind: ReferenceKind,
    /// None when the target is missing and nothing enumerable can classify it
    pub owner_of_referenced: Option<OwnerKind>,
    pub status: ReferenceStatus,
    /// True when the target's owner differs from the workload's own owner
    pub coordination_risk: bool,
}

/// Extract all ConfigMap/Secret references from a workload's pod template.
///
/// Covers envFrom, env[].valueFrom, volumes and projected volume sources
/// across containers and init containers. Identical (target, reference-kind)
/// pairs are reported once.
pub fn extract_cross_references(
    resource: &Resource,
    fetch_ownership: &mut dyn FnMut(&LineageRef) -> Option<Ownership>,
) -> Vec<CrossReference> {
    let own = classify(resource);
    let mut out = Vec::new();
    let mut seen: HashSet<(LineageRef, ReferenceKind)> = HashSet::new();

    let Some(pod_spec) = pod_spec(resource) else {
        return out;
    };

    let mut push = |kind: &str, name: &str, reference_kind: ReferenceKind| {
        let reference = LineageRef::new(kind, &resource.namespace, name);
        if !seen.insert((reference.clone(), reference_kind)) {
            return;
        }
        let (owner_of_referenced, status) = match fetch_ownership(&reference) {
            Some(ownership) => (Some(ownership.owner), ReferenceStatus::Exists),
            None => (None, ReferenceStatus::Missing),
        };
        let coordination_risk = owner_of_referenced.is_some_and(|owner| owner != own.owner);
        out.push(CrossReference {
            referenced: reference,
            reference_kind,
            owner_of_referenced,
            status,
            coordination_risk,
        });
    };

    for key in ["containers", "initContainers"] {
        let containers = pod_spec
            .get(key)
            .and_then(|c| c.as_array())
            .cloned()
            .unwrap_or_default();
        for container in &containers {
            for source in container
                .get("envFrom")
                .and_then(|e| e.as_array())
                .into_iter()
                .flatten()
            {
                if let Some(name) = ref_name(source, "secretRef") {
                    push("Secret", name, ReferenceKind::EnvFrom);
                }
                if let Some(name) = ref_name(source, "configMapRef") {
                    push("ConfigMap", name, ReferenceKind::EnvFrom);
                }
            }
            for env in container
                .get("env")
                .and_then(|e| e.as_array())
                .into_iter()
                .flatten()
            {
                let Some(value_from) = env.get("valueFrom") else {
                    continue;
                };
                if let Some(name) = ref_name(value_from, "secretKeyRef") {
                    push("Secret", name, ReferenceKind::ValueFrom);
                }
                if let Some(name) = ref_name(value_from, "configMapKeyRef") {
                    push("ConfigMap", name, ReferenceKind::ValueFrom);
                }
            }
        }
    }

    let volumes = pod_spec
        .get("volumes")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();
    for volume in &volumes {
        if let Some(name) = volume
            .get("secret")
            .and_then(|s| s.get("secretName"))
            .and_then(|n| n.as_str())
        {
            push("Secret", name, ReferenceKind::Volume);
        }
        if let Some(name) = ref_name(volume, "configMap") {
            push("ConfigMap", name, ReferenceKind::Volume);
        }
        for source in volume
            .get("projected")
            .and_then(|p| p.get("sources"))
            .and_then(|s| s.as_array())
            .into_iter()
            .flatten()
        {
            if let Some(name) = ref_name(source, "secret") {
                push("Secret", name, ReferenceKind::ProjectedVolume);
            }
            if let Some(name) = ref_name(source, "configMap") {
                push("ConfigMap", name, ReferenceKind::ProjectedVolume);
            }
        }
    }

    out
}

/// Locate the pod spec inside the workload spec
fn pod_spec(resource: &Resource) -> Option<&Value> {
    match resource.kind.as_str() {
        "Pod" => resource.spec.as_object().map(|_| &resource.spec),
        "CronJob" => resource
            .spec
            .get("jobTemplate")?
            .get("spec")?
            .get("template")?
            .get("spec"),
        _ => resource.spec.get("template")?.get("spec"),
    }
}

fn ref_name<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key)?.get("name")?.as_str()
}
