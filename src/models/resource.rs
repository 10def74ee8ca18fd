//! Resource snapshot types
//!
//! `Resource` is an immutable snapshot of a cluster object, built once from
//! the raw JSON representation and never mutated in place. Each scan or query
//! invocation re-derives everything from fresh snapshots so identical input
//! always produces identical output.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Pointer-like identifier for a cluster object. Pure lookup key, no
/// ownership semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineageRef {
    pub kind: String,
    pub name: String,
    pub namespace: String,
}

impl LineageRef {
    pub fn new(
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for LineageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}/{}", self.kind, self.name)
        } else {
            write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
        }
    }
}

/// A Kubernetes owner reference, reduced to the fields the classifier needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRef {
    pub api_group: String,
    pub kind: String,
    pub name: String,
    pub controller: bool,
}

/// One status condition from the object's status block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    pub reason: String,
    pub message: String,
    pub last_transition: Option<DateTime<Utc>>,
}

/// Normalized status view
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceStatus {
    pub ready: bool,
    pub conditions: Vec<Condition>,
    pub last_applied_revision: Option<String>,
    pub last_attempted_revision: Option<String>,
}

/// Normalized view of a cluster object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub kind: String,
    pub api_group: String,
    pub namespace: String,
    pub name: String,
    /// Kubeconfig context this snapshot came from; empty for static manifests
    pub cluster: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub owner_refs: Vec<OwnerRef>,
    pub status: ResourceStatus,
    /// Raw spec, kept for workload pod-template scanning and source refs
    pub spec: Value,
}

impl Resource {
    /// Build a snapshot from the raw JSON representation of a cluster object
    pub fn from_json(obj: &Value) -> Result<Self> {
        let metadata = obj
            .get("metadata")
            .and_then(|m| m.as_object())
            .context("Missing metadata")?;

        let kind = obj
            .get("kind")
            .and_then(|k| k.as_str())
            .context("Missing kind")?
            .to_string();
        let api_group = obj
            .get("apiVersion")
            .and_then(|v| v.as_str())
            .map(|v| match v.split_once('/') {
                Some((group, _)) => group.to_string(),
                None => String::new(), // core group
            })
            .unwrap_or_default();
        let name = metadata
            .get("name")
            .and_then(|n| n.as_str())
            .context("Missing name")?
            .to_string();
        let namespace = metadata
            .get("namespace")
            .and_then(|n| n.as_str())
            .unwrap_or_default()
            .to_string();

        let labels = string_map(metadata.get("labels"));
        let annotations = string_map(metadata.get("annotations"));
        let owner_refs = parse_owner_refs(metadata.get("ownerReferences"));
        let status = parse_status(obj.get("status"));
        let spec = obj.get("spec").cloned().unwrap_or(Value::Null);

        Ok(Resource {
            kind,
            api_group,
            namespace,
            name,
            cluster: String::new(),
            labels,
            annotations,
            owner_refs,
            status,
            spec,
        })
    }

    pub fn lineage_ref(&self) -> LineageRef {
        LineageRef::new(&self.kind, &self.namespace, &self.name)
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    /// The owner reference marked controller=true, if any
    pub fn controller_owner(&self) -> Option<&OwnerRef> {
        self.owner_refs.iter().find(|r| r.controller)
    }

    /// Look up a status condition by type
    pub fn condition(&self, condition_type: &str) -> Option<&Condition> {
        self.status
            .conditions
            .iter()
            .find(|c| c.condition_type == condition_type)
    }

    /// True when spec.suspend is set (Flux uses "suspend", not "suspended")
    pub fn suspended(&self) -> bool {
        self.spec
            .get("suspend")
            .and_then(|s| s.as_bool())
            .unwrap_or(false)
    }
}

/// Generate a unique key for a resource
pub fn resource_key(kind: &str, namespace: &str, name: &str) -> String {
    format!("{}:{}:{}", kind, namespace, name)
}

fn string_map(value: Option<&Value>) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    if let Some(obj) = value.and_then(|v| v.as_object()) {
        for (k, v) in obj {
            if let Some(s) = v.as_str() {
                map.insert(k.clone(), s.to_string());
            }
        }
    }
    map
}

fn parse_owner_refs(value: Option<&Value>) -> Vec<OwnerRef> {
    let Some(refs) = value.and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    refs.iter()
        .filter_map(|r| {
            let kind = r.get("kind").and_then(|k| k.as_str())?;
            let name = r.get("name").and_then(|n| n.as_str())?;
            let api_group = r
                .get("apiVersion")
                .and_then(|v| v.as_str())
                .map(|v| match v.split_once('/') {
                    Some((group, _)) => group.to_string(),
                    None => String::new(),
                })
                .unwrap_or_default();
            let controller = r
                .get("controller")
                .and_then(|c| c.as_bool())
                .unwrap_or(false);
            Some(OwnerRef {
                api_group,
                kind: kind.to_string(),
                name: name.to_string(),
                controller,
            })
        })
        .collect()
}

fn parse_status(value: Option<&Value>) -> ResourceStatus {
    let Some(status) = value.and_then(|s| s.as_object()) else {
        return ResourceStatus::default();
    };

    let mut conditions = Vec::new();
    if let Some(conds) = status.get("conditions").and_then(|c| c.as_array()) {
        for cond in conds {
            let Some(condition_type) = cond.get("type").and_then(|t| t.as_str()) else {
                continue;
            };
            conditions.push(Condition {
                condition_type: condition_type.to_string(),
                status: cond
                    .get("status")
                    .and_then(|s| s.as_str())
                    .unwrap_or_default()
                    .to_string(),
                reason: cond
                    .get("reason")
                    .and_then(|r| r.as_str())
                    .unwrap_or_default()
                    .to_string(),
                message: cond
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or_default()
                    .to_string(),
                last_transition: cond
                    .get("lastTransitionTime")
                    .and_then(|t| t.as_str())
                    .and_then(|t| t.parse::<DateTime<Utc>>().ok()),
            });
        }
    }

    // Ready for Flux CRDs and ArgoCD, Available for workloads
    let ready = conditions.iter().any(|c| {
        matches!(c.condition_type.as_str(), "Ready" | "Available" | "Healthy")
            && c.status == "True"
    });

    ResourceStatus {
        ready,
        conditions,
        last_applied_revision: status
            .get("lastAppliedRevision")
            .and_then(|r| r.as_str())
            .map(|s| s.to_string()),
        last_attempted_revision: status
            .get("lastAttemptedRevision")
            .and_then(|r| r.as_str())
            .map(|s| s.to_string()),
    }
}
