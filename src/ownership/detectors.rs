//! Individual ownership detectors
//!
//! Each detector inspects one family of signals and reports the literal
//! label/annotation key it matched so the verdict is auditable.

use super::{Confidence, Ownership};
use crate::models::{OwnerKind, Resource};

/// Label and annotation keys consulted by the detectors
pub mod labels {
    pub const FLUX_KUSTOMIZE_NAME: &str = "kustomize.toolkit.fluxcd.io/name";
    pub const FLUX_KUSTOMIZE_NAMESPACE: &str = "kustomize.toolkit.fluxcd.io/namespace";
    pub const FLUX_HELM_NAME: &str = "helm.toolkit.fluxcd.io/name";
    pub const FLUX_HELM_NAMESPACE: &str = "helm.toolkit.fluxcd.io/namespace";

    pub const ARGO_TRACKING_ID: &str = "argocd.argoproj.io/tracking-id";
    pub const ARGO_INSTANCE: &str = "argocd.argoproj.io/instance";
    pub const APP_INSTANCE: &str = "app.kubernetes.io/instance";

    pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";
    pub const HELM_RELEASE_NAME: &str = "meta.helm.sh/release-name";
    pub const HELM_RELEASE_NAMESPACE: &str = "meta.helm.sh/release-namespace";

    pub const TERRAFORM_RUN_ID: &str = "app.terraform.io/run-id";
    pub const GENERIC_MANAGED_BY: &str = "managed-by";

    pub const CONFIGHUB_UNIT_SLUG: &str = "confighub.com/UnitSlug";

    pub const CROSSPLANE_COMPOSITE: &str = "crossplane.io/composite";
    pub const CROSSPLANE_CLAIM_NAME: &str = "crossplane.io/claim-name";
    pub const CROSSPLANE_CLAIM_NAMESPACE: &str = "crossplane.io/claim-namespace";
}

/// API group suffixes that mark Crossplane-managed resources
const CROSSPLANE_GROUP_SUFFIXES: &[&str] = &[".crossplane.io", ".upbound.io"];

/// API groups of Crossplane control-plane objects (Providers, Compositions,
/// XRDs). Always classified as owned, never unmanaged.
const CROSSPLANE_CONTROL_PLANE_GROUPS: &[&str] =
    &["pkg.crossplane.io", "apiextensions.crossplane.io"];

pub(super) fn detect_flux(resource: &Resource) -> Option<Ownership> {
    if let Some(name) = resource.label(labels::FLUX_KUSTOMIZE_NAME) {
        return Some(Ownership {
            owner: OwnerKind::Flux,
            sub_type: Some("Kustomization".to_string()),
            name: name.to_string(),
            namespace: resource
                .label(labels::FLUX_KUSTOMIZE_NAMESPACE)
                .unwrap_or(&resource.namespace)
                .to_string(),
            source: format!("label:{}", labels::FLUX_KUSTOMIZE_NAME),
            confidence: Confidence::High,
        });
    }
    if let Some(name) = resource.label(labels::FLUX_HELM_NAME) {
        return Some(Ownership {
            owner: OwnerKind::Flux,
            sub_type: Some("HelmRelease".to_string()),
            name: name.to_string(),
            namespace: resource
                .label(labels::FLUX_HELM_NAMESPACE)
                .unwrap_or(&resource.namespace)
                .to_string(),
            source: format!("label:{}", labels::FLUX_HELM_NAME),
            confidence: Confidence::High,
        });
    }
    None
}

pub(super) fn detect_argocd(resource: &Resource) -> Option<Ownership> {
    // Tracking annotation is the strongest signal when parseable; a malformed
    // value falls through to the label path instead of erroring.
    let mut degraded = false;
    if let Some(tracking_id) = resource.annotation(labels::ARGO_TRACKING_ID) {
        if let Some((app, namespace)) = parse_tracking_id(tracking_id) {
            return Some(Ownership {
                owner: OwnerKind::ArgoCd,
                sub_type: Some("Application".to_string()),
                name: app,
                namespace,
                source: format!("annotation:{}", labels::ARGO_TRACKING_ID),
                confidence: Confidence::High,
            });
        }
        degraded = true;
    }

    match resource.label(labels::ARGO_INSTANCE) {
        Some(app) if !app.is_empty() => {
            return Some(Ownership {
                owner: OwnerKind::ArgoCd,
                sub_type: Some("Application".to_string()),
                name: app.to_string(),
                namespace: resource.namespace.clone(),
                source: format!("label:{}", labels::ARGO_INSTANCE),
                confidence: Confidence::High,
            });
        }
        Some(_) => degraded = true,
        None => {}
    }

    // app.kubernetes.io/instance alone is a Helm/operator convention; it only
    // counts as ArgoCD when an ArgoCD signal exists but is unusable.
    if degraded {
        if let Some(app) = resource.label(labels::APP_INSTANCE) {
            if !app.is_empty() {
                return Some(Ownership {
                    owner: OwnerKind::ArgoCd,
                    sub_type: Some("Application".to_string()),
                    name: app.to_string(),
                    namespace: resource.namespace.clone(),
                    source: format!("label:{}", labels::APP_INSTANCE),
                    confidence: Confidence::Medium,
                });
            }
        }
    }
    None
}

/// Parse an ArgoCD tracking id: `app-name:<group>/<kind>:<namespace>/<name>`.
/// Returns (application name, application namespace hint).
fn parse_tracking_id(tracking_id: &str) -> Option<(String, String)> {
    let mut parts = tracking_id.splitn(3, ':');
    let app = parts.next()?;
    let gk = parts.next()?;
    let nsn = parts.next()?;
    if app.is_empty() || !gk.contains('/') || !nsn.contains('/') {
        return None;
    }
    let namespace = nsn.split('/').next().unwrap_or_default();
    Some((app.to_string(), namespace.to_string()))
}

pub(super) fn detect_helm(resource: &Resource) -> Option<Ownership> {
    if resource.label(labels::MANAGED_BY) != Some("Helm") {
        return None;
    }
    let name = resource
        .annotation(labels::HELM_RELEASE_NAME)
        .unwrap_or(&resource.name)
        .to_string();
    let namespace = resource
        .annotation(labels::HELM_RELEASE_NAMESPACE)
        .unwrap_or(&resource.namespace)
        .to_string();
    Some(Ownership {
        owner: OwnerKind::Helm,
        sub_type: Some("release".to_string()),
        name,
        namespace,
        source: format!("label:{}=Helm", labels::MANAGED_BY),
        confidence: Confidence::High,
    })
}

pub(super) fn detect_terraform(resource: &Resource) -> Option<Ownership> {
    if let Some(run_id) = resource.label(labels::TERRAFORM_RUN_ID) {
        return Some(Ownership {
            owner: OwnerKind::Terraform,
            sub_type: Some("run".to_string()),
            name: run_id.to_string(),
            namespace: resource.namespace.clone(),
            source: format!("label:{}", labels::TERRAFORM_RUN_ID),
            confidence: Confidence::High,
        });
    }
    for key in [labels::MANAGED_BY, labels::GENERIC_MANAGED_BY] {
        if let Some(value) = resource.label(key) {
            if value.eq_ignore_ascii_case("terraform") {
                return Some(Ownership {
                    owner: OwnerKind::Terraform,
                    sub_type: None,
                    name: resource.name.clone(),
                    namespace: resource.namespace.clone(),
                    source: format!("label:{}={}", key, value),
                    confidence: Confidence::Medium,
                });
            }
        }
    }
    None
}

pub(super) fn detect_confighub(resource: &Resource) -> Option<Ownership> {
    let (slug, source) = if let Some(slug) = resource.label(labels::CONFIGHUB_UNIT_SLUG) {
        (slug, format!("label:{}", labels::CONFIGHUB_UNIT_SLUG))
    } else if let Some(slug) = resource.annotation(labels::CONFIGHUB_UNIT_SLUG) {
        (slug, format!("annotation:{}", labels::CONFIGHUB_UNIT_SLUG))
    } else {
        return None;
    };
    Some(Ownership {
        owner: OwnerKind::ConfigHub,
        sub_type: Some("unit".to_string()),
        name: slug.to_string(),
        namespace: resource.namespace.clone(),
        source,
        confidence: Confidence::High,
    })
}

pub(super) fn detect_crossplane(resource: &Resource) -> Option<Ownership> {
    // Composed resource pointing at its XR
    if let Some(composite) = resource.label(labels::CROSSPLANE_COMPOSITE) {
        return Some(Ownership {
            owner: OwnerKind::Crossplane,
            sub_type: Some("instance".to_string()),
            name: composite.to_string(),
            namespace: String::new(), // XRs are cluster scoped
            source: format!("label:{}", labels::CROSSPLANE_COMPOSITE),
            confidence: Confidence::High,
        });
    }

    // XR bound to a claim
    if let Some(claim) = resource.label(labels::CROSSPLANE_CLAIM_NAME) {
        return Some(Ownership {
            owner: OwnerKind::Crossplane,
            sub_type: Some("composite".to_string()),
            name: claim.to_string(),
            namespace: resource
                .label(labels::CROSSPLANE_CLAIM_NAMESPACE)
                .unwrap_or_default()
                .to_string(),
            source: format!("label:{}", labels::CROSSPLANE_CLAIM_NAME),
            confidence: Confidence::High,
        });
    }

    // Owner reference from a provider or XR group, even without labels
    for owner_ref in &resource.owner_refs {
        if CROSSPLANE_GROUP_SUFFIXES
            .iter()
            .any(|suffix| owner_ref.api_group.ends_with(suffix))
        {
            return Some(Ownership {
                owner: OwnerKind::Crossplane,
                sub_type: Some("instance".to_string()),
                name: owner_ref.name.clone(),
                namespace: String::new(),
                source: format!("ownerRef:{}/{}", owner_ref.api_group, owner_ref.kind),
                confidence: Confidence::High,
            });
        }
    }

    // Control-plane objects (Providers, Compositions, XRDs) are owned by the
    // Crossplane machinery itself, never unmanaged.
    if CROSSPLANE_CONTROL_PLANE_GROUPS.contains(&resource.api_group.as_str()) {
        return Some(Ownership {
            owner: OwnerKind::Crossplane,
            sub_type: None,
            name: resource.name.clone(),
            namespace: resource.namespace.clone(),
            source: format!("apiGroup:{}", resource.api_group),
            confidence: Confidence::High,
        });
    }

    None
}

pub(super) fn detect_owner_ref(resource: &Resource) -> Option<Ownership> {
    if let Some(owner_ref) = resource.controller_owner() {
        return Some(Ownership {
            owner: OwnerKind::K8sOwnerRef,
            sub_type: Some(owner_ref.kind.clone()),
            name: owner_ref.name.clone(),
            namespace: resource.namespace.clone(),
            source: format!(
                "ownerRef:{}/{} controller=true",
                owner_ref.api_group, owner_ref.kind
            ),
            confidence: Confidence::High,
        });
    }
    // A single non-controller reference is still an enumerable signal; more
    // than one cannot be picked deterministically, so fall through to Native.
    if let [owner_ref] = resource.owner_refs.as_slice() {
        return Some(Ownership {
            owner: OwnerKind::K8sOwnerRef,
            sub_type: Some(owner_ref.kind.clone()),
            name: owner_ref.name.clone(),
            namespace: resource.namespace.clone(),
            source: format!("ownerRef:{}/{}", owner_ref.api_group, owner_ref.kind),
            confidence: Confidence::Medium,
        });
    }
    None
}
