//! Shared test fixtures
//!
//! `ResourceBuilder` assembles raw Kubernetes JSON and funnels it through the
//! same `Resource::from_json` path production uses, so fixtures exercise the
//! real parsing code rather than hand-built structs.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use ownscope::models::Resource;
use serde_json::{Value, json};

pub struct ResourceBuilder {
    obj: Value,
}

impl ResourceBuilder {
    pub fn new(api_version: &str, kind: &str, namespace: &str, name: &str) -> Self {
        let mut metadata = json!({"name": name});
        if !namespace.is_empty() {
            metadata["namespace"] = json!(namespace);
        }
        Self {
            obj: json!({
                "apiVersion": api_version,
                "kind": kind,
                "metadata": metadata,
            }),
        }
    }

    pub fn label(mut self, key: &str, value: &str) -> Self {
        self.obj["metadata"]["labels"][key] = json!(value);
        self
    }

    pub fn annotation(mut self, key: &str, value: &str) -> Self {
        self.obj["metadata"]["annotations"][key] = json!(value);
        self
    }

    pub fn owner_ref(mut self, api_version: &str, kind: &str, name: &str, controller: bool) -> Self {
        let refs = &mut self.obj["metadata"]["ownerReferences"];
        if refs.is_null() {
            *refs = json!([]);
        }
        refs.as_array_mut().unwrap().push(json!({
            "apiVersion": api_version,
            "kind": kind,
            "name": name,
            "controller": controller,
        }));
        self
    }

    pub fn spec(mut self, spec: Value) -> Self {
        self.obj["spec"] = spec;
        self
    }

    pub fn condition(
        mut self,
        condition_type: &str,
        status: &str,
        reason: &str,
        message: &str,
        last_transition: &str,
    ) -> Self {
        let conditions = &mut self.obj["status"]["conditions"];
        if conditions.is_null() {
            *conditions = json!([]);
        }
        conditions.as_array_mut().unwrap().push(json!({
            "type": condition_type,
            "status": status,
            "reason": reason,
            "message": message,
            "lastTransitionTime": last_transition,
        }));
        self
    }

    pub fn revisions(mut self, applied: &str, attempted: &str) -> Self {
        self.obj["status"]["lastAppliedRevision"] = json!(applied);
        self.obj["status"]["lastAttemptedRevision"] = json!(attempted);
        self
    }

    pub fn build(self) -> Resource {
        Resource::from_json(&self.obj).expect("fixture must parse")
    }
}

/// Fixed reference instant so elapsed-time assertions are exact
pub fn test_now() -> DateTime<Utc> {
    "2024-06-01T12:00:00Z".parse().unwrap()
}

/// An RFC3339 timestamp `secs` seconds before `test_now()`
pub fn seconds_ago(secs: i64) -> String {
    (test_now() - chrono::Duration::seconds(secs))
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// A Deployment carrying Flux Kustomization labels
pub fn flux_deployment(namespace: &str, name: &str, kustomization: &str) -> Resource {
    ResourceBuilder::new("apps/v1", "Deployment", namespace, name)
        .label("kustomize.toolkit.fluxcd.io/name", kustomization)
        .label("kustomize.toolkit.fluxcd.io/namespace", "flux-system")
        .condition(
            "Available",
            "True",
            "MinimumReplicasAvailable",
            "Deployment has minimum availability.",
            &seconds_ago(3600),
        )
        .build()
}

/// A ready Kustomization pointing at a GitRepository source
pub fn kustomization(namespace: &str, name: &str, source: &str) -> Resource {
    ResourceBuilder::new("kustomize.toolkit.fluxcd.io/v1", "Kustomization", namespace, name)
        .spec(json!({
            "path": "./apps",
            "sourceRef": {"kind": "GitRepository", "name": source},
        }))
        .revisions("main@sha1:abc123", "main@sha1:abc123")
        .condition(
            "Ready",
            "True",
            "ReconciliationSucceeded",
            "Applied revision: main@sha1:abc123",
            &seconds_ago(60),
        )
        .build()
}

/// A ready GitRepository
pub fn git_repository(namespace: &str, name: &str) -> Resource {
    ResourceBuilder::new("source.toolkit.fluxcd.io/v1", "GitRepository", namespace, name)
        .spec(json!({"url": "https://example.com/repo.git"}))
        .condition(
            "Ready",
            "True",
            "Succeeded",
            "stored artifact for revision 'main@sha1:abc123'",
            &seconds_ago(60),
        )
        .build()
}
