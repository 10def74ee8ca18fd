//! Snapshot providers
//!
//! The resolver, query engine and scanner all read from a `ResourceProvider`:
//! either a live cluster (dynamic typed listing over a fixed kind table) or a
//! directory of static YAML manifests. Listing failures are classified, never
//! fatal; a snapshot is always produced from whatever could be gathered.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::join_all;
use kube::api::ListParams;
use kube::core::{ApiResource, DynamicObject};
use kube::{Api, Client};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::models::{LineageRef, Resource};
use crate::scan::ScanDataError;

/// Kinds gathered into a cluster snapshot: (kind, group, version, plural).
/// Core workloads plus the CRDs of every delivery tool the classifier knows.
const KIND_TABLE: &[(&str, &str, &str, &str)] = &[
    ("Pod", "", "v1", "pods"),
    ("Service", "", "v1", "services"),
    ("ConfigMap", "", "v1", "configmaps"),
    ("Secret", "", "v1", "secrets"),
    ("Deployment", "apps", "v1", "deployments"),
    ("StatefulSet", "apps", "v1", "statefulsets"),
    ("DaemonSet", "apps", "v1", "daemonsets"),
    ("ReplicaSet", "apps", "v1", "replicasets"),
    ("Job", "batch", "v1", "jobs"),
    ("CronJob", "batch", "v1", "cronjobs"),
    ("GitRepository", "source.toolkit.fluxcd.io", "v1", "gitrepositories"),
    ("OCIRepository", "source.toolkit.fluxcd.io", "v1", "ocirepositories"),
    ("HelmRepository", "source.toolkit.fluxcd.io", "v1", "helmrepositories"),
    ("HelmChart", "source.toolkit.fluxcd.io", "v1", "helmcharts"),
    ("Bucket", "source.toolkit.fluxcd.io", "v1", "buckets"),
    ("Kustomization", "kustomize.toolkit.fluxcd.io", "v1", "kustomizations"),
    ("HelmRelease", "helm.toolkit.fluxcd.io", "v2", "helmreleases"),
    ("Application", "argoproj.io", "v1alpha1", "applications"),
    ("Terraform", "infra.contrib.fluxcd.io", "v1alpha2", "terraforms"),
    ("Provider", "pkg.crossplane.io", "v1", "providers"),
    ("Composition", "apiextensions.crossplane.io", "v1", "compositions"),
    (
        "CompositeResourceDefinition",
        "apiextensions.crossplane.io",
        "v1",
        "compositeresourcedefinitions",
    ),
];

/// Kinds in the table that exist outside any namespace
const CLUSTER_SCOPED_KINDS: &[&str] =
    &["Provider", "Composition", "CompositeResourceDefinition"];

/// Build an ApiResource for a kind in the snapshot table
fn api_resource_for(kind: &str) -> Option<ApiResource> {
    let (kind, group, version, plural) = KIND_TABLE.iter().find(|(k, ..)| *k == kind)?;
    let api_version = if group.is_empty() {
        version.to_string()
    } else {
        format!("{}/{}", group, version)
    };
    Some(ApiResource {
        group: group.to_string(),
        version: version.to_string(),
        api_version,
        kind: kind.to_string(),
        plural: plural.to_string(),
    })
}

/// One gathered view of the world plus whatever went wrong gathering it
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub resources: Vec<Resource>,
    pub errors: Vec<ScanDataError>,
}

/// Source of resource snapshots: a live cluster or static manifests
#[async_trait]
pub trait ResourceProvider {
    /// Gather every known kind into one snapshot
    async fn snapshot(&self) -> Result<Snapshot>;

    /// Fetch a single object; None when it does not exist or cannot be read
    async fn get(&self, reference: &LineageRef) -> Option<Resource>;
}

/// Live-cluster provider listing each kind from the API server
pub struct ClusterProvider {
    client: Client,
    /// Kubeconfig context name, stamped onto every snapshot resource
    context: String,
    /// None means all namespaces
    namespace: Option<String>,
}

impl ClusterProvider {
    pub fn new(client: Client, context: String, namespace: Option<String>) -> Self {
        Self {
            client,
            context,
            namespace,
        }
    }

    fn api_for(&self, api_resource: &ApiResource, namespace: &str) -> Api<DynamicObject> {
        if namespace.is_empty() {
            Api::all_with(self.client.clone(), api_resource)
        } else {
            Api::namespaced_with(self.client.clone(), namespace, api_resource)
        }
    }

    async fn list_kind(&self, kind: &'static str) -> Result<Vec<Resource>, ScanDataError> {
        let api_resource = api_resource_for(kind)
            .ok_or_else(|| ScanDataError::Other(format!("unknown kind: {}", kind)))?;
        let namespace = if CLUSTER_SCOPED_KINDS.contains(&kind) {
            ""
        } else {
            self.namespace.as_deref().unwrap_or("")
        };
        let api = self.api_for(&api_resource, namespace);

        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| classify_kube_error(kind, e))?;

        let mut resources = Vec::with_capacity(list.items.len());
        for obj in list.items {
            match normalize(obj, &api_resource, &self.context) {
                Ok(resource) => resources.push(resource),
                Err(e) => debug!(kind, "skipping malformed object: {e:#}"),
            }
        }
        Ok(resources)
    }
}

#[async_trait]
impl ResourceProvider for ClusterProvider {
    async fn snapshot(&self) -> Result<Snapshot> {
        let futures = KIND_TABLE
            .iter()
            .map(|(kind, ..)| self.list_kind(kind))
            .collect::<Vec<_>>();

        let mut snapshot = Snapshot::default();
        for result in join_all(futures).await {
            match result {
                Ok(resources) => snapshot.resources.extend(resources),
                Err(error) => snapshot.errors.push(error),
            }
        }
        Ok(snapshot)
    }

    async fn get(&self, reference: &LineageRef) -> Option<Resource> {
        let api_resource = api_resource_for(&reference.kind)?;
        let namespace = resolve_object_namespace(
            &reference.kind,
            &reference.namespace,
            self.namespace.as_deref(),
        );
        let api = self.api_for(&api_resource, &namespace);
        let obj = api.get(&reference.name).await.ok()?;
        normalize(obj, &api_resource, &self.context).ok()
    }
}

/// Pick the namespace for a single-object fetch.
///
/// A namespaced kind cannot be fetched by name through an all-namespaces
/// Api, so a bare reference falls back to the configured namespace and then
/// to "default". Cluster-scoped kinds ignore namespaces entirely.
fn resolve_object_namespace(kind: &str, requested: &str, configured: Option<&str>) -> String {
    if CLUSTER_SCOPED_KINDS.contains(&kind) {
        return String::new();
    }
    if !requested.is_empty() {
        return requested.to_string();
    }
    configured
        .filter(|ns| !ns.is_empty())
        .unwrap_or("default")
        .to_string()
}

/// Reduce a dynamic object to the normalized snapshot view.
///
/// List responses omit kind/apiVersion on the items, so both are re-stamped
/// from the ApiResource before parsing.
fn normalize(obj: DynamicObject, api_resource: &ApiResource, context: &str) -> Result<Resource> {
    let mut value = serde_json::to_value(&obj).context("Failed to serialize object to JSON")?;
    value["kind"] = Value::String(api_resource.kind.clone());
    value["apiVersion"] = Value::String(api_resource.api_version.clone());
    let mut resource = Resource::from_json(&value)?;
    resource.cluster = context.to_string();
    Ok(resource)
}

fn classify_kube_error(kind: &str, error: kube::Error) -> ScanDataError {
    match error {
        kube::Error::Api(ae) if ae.code == 404 => ScanDataError::CrdNotInstalled(kind.to_string()),
        kube::Error::Api(ae) if ae.code == 403 => ScanDataError::PermissionDenied {
            kind: kind.to_string(),
            detail: ae.message,
        },
        other => ScanDataError::Other(format!("failed to list {}: {}", kind, other)),
    }
}

/// Static provider over a directory (or single file) of YAML manifests
pub struct ManifestProvider {
    resources: Vec<Resource>,
}

impl ManifestProvider {
    /// Load all `.yaml`/`.yml` files under a path, multi-document aware
    pub fn load(path: &Path) -> Result<Self> {
        let mut resources = Vec::new();
        if path.is_dir() {
            let mut entries: Vec<_> = std::fs::read_dir(path)
                .with_context(|| format!("Failed to read directory {}", path.display()))?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    matches!(
                        p.extension().and_then(|e| e.to_str()),
                        Some("yaml") | Some("yml")
                    )
                })
                .collect();
            entries.sort();
            for file in entries {
                load_file(&file, &mut resources)?;
            }
        } else {
            load_file(path, &mut resources)?;
        }
        Ok(Self { resources })
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }
}

fn load_file(path: &Path, resources: &mut Vec<Resource>) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    for document in serde_yaml::Deserializer::from_str(&contents) {
        let value: serde_json::Value = match serde_json::Value::deserialize(document) {
            Ok(v) => v,
            Err(e) => {
                debug!(path = %path.display(), "skipping unparseable document: {e}");
                continue;
            }
        };
        if value.is_null() {
            continue;
        }
        let resource = Resource::from_json(&value)
            .with_context(|| format!("Invalid manifest in {}", path.display()))?;
        resources.push(resource);
    }
    Ok(())
}

#[async_trait]
impl ResourceProvider for ManifestProvider {
    async fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            resources: self.resources.clone(),
            errors: Vec::new(),
        })
    }

    async fn get(&self, reference: &LineageRef) -> Option<Resource> {
        self.resources
            .iter()
            .find(|r| {
                r.kind == reference.kind
                    && r.name == reference.name
                    && (reference.namespace.is_empty() || r.namespace == reference.namespace)
            })
            .cloned()
    }
}
