//! Ownership classifier tests
//!
//! Exercises the detector cascade end to end: priority between competing
//! signals, confidence grading, and the Native fallback.

mod common;

use common::ResourceBuilder;
use ownscope::models::OwnerKind;
use ownscope::ownership::{Confidence, classify};
use serde_json::json;

#[test]
fn test_flux_kustomization_labels() {
    let resource = ResourceBuilder::new("apps/v1", "Deployment", "prod", "api")
        .label("kustomize.toolkit.fluxcd.io/name", "apps")
        .label("kustomize.toolkit.fluxcd.io/namespace", "flux-system")
        .build();

    let ownership = classify(&resource);
    assert_eq!(ownership.owner, OwnerKind::Flux);
    assert_eq!(ownership.sub_type.as_deref(), Some("Kustomization"));
    assert_eq!(ownership.name, "apps");
    assert_eq!(ownership.namespace, "flux-system");
    assert_eq!(ownership.confidence, Confidence::High);
    assert_eq!(ownership.source, "label:kustomize.toolkit.fluxcd.io/name");
}

#[test]
fn test_flux_helm_labels() {
    let resource = ResourceBuilder::new("apps/v1", "Deployment", "prod", "api")
        .label("helm.toolkit.fluxcd.io/name", "podinfo")
        .label("helm.toolkit.fluxcd.io/namespace", "prod")
        .build();

    let ownership = classify(&resource);
    assert_eq!(ownership.owner, OwnerKind::Flux);
    assert_eq!(ownership.sub_type.as_deref(), Some("HelmRelease"));
    assert_eq!(ownership.name, "podinfo");
}

#[test]
fn test_flux_wins_over_helm_labels() {
    // Flux HelmRelease deployments carry both label families; the cascade
    // must attribute them to Flux, not raw Helm.
    let resource = ResourceBuilder::new("apps/v1", "Deployment", "prod", "api")
        .label("helm.toolkit.fluxcd.io/name", "podinfo")
        .label("app.kubernetes.io/managed-by", "Helm")
        .annotation("meta.helm.sh/release-name", "podinfo")
        .build();

    assert_eq!(classify(&resource).owner, OwnerKind::Flux);
}

#[test]
fn test_argocd_tracking_annotation() {
    let resource = ResourceBuilder::new("apps/v1", "Deployment", "default", "guestbook-ui")
        .annotation(
            "argocd.argoproj.io/tracking-id",
            "guestbook:apps/Deployment:default/guestbook-ui",
        )
        .build();

    let ownership = classify(&resource);
    assert_eq!(ownership.owner, OwnerKind::ArgoCd);
    assert_eq!(ownership.name, "guestbook");
    assert_eq!(ownership.namespace, "default");
    assert_eq!(ownership.confidence, Confidence::High);
}

#[test]
fn test_argocd_instance_label() {
    let resource = ResourceBuilder::new("apps/v1", "Deployment", "default", "guestbook-ui")
        .label("argocd.argoproj.io/instance", "guestbook")
        .build();

    let ownership = classify(&resource);
    assert_eq!(ownership.owner, OwnerKind::ArgoCd);
    assert_eq!(ownership.sub_type.as_deref(), Some("Application"));
    assert_eq!(ownership.name, "guestbook");
    assert_eq!(ownership.namespace, "default");
    assert_eq!(ownership.confidence, Confidence::High);
    assert_eq!(ownership.source, "label:argocd.argoproj.io/instance");
}

#[test]
fn test_argocd_empty_instance_label_falls_back_to_app_instance() {
    // The ArgoCD signal exists but carries nothing; the generic instance
    // label fills in at reduced confidence.
    let resource = ResourceBuilder::new("apps/v1", "Deployment", "default", "guestbook-ui")
        .label("argocd.argoproj.io/instance", "")
        .label("app.kubernetes.io/instance", "guestbook")
        .build();

    let ownership = classify(&resource);
    assert_eq!(ownership.owner, OwnerKind::ArgoCd);
    assert_eq!(ownership.name, "guestbook");
    assert_eq!(ownership.confidence, Confidence::Medium);
    assert_eq!(ownership.source, "label:app.kubernetes.io/instance");
}

#[test]
fn test_argocd_malformed_tracking_falls_back_to_instance_label() {
    let resource = ResourceBuilder::new("apps/v1", "Deployment", "default", "guestbook-ui")
        .annotation("argocd.argoproj.io/tracking-id", "not-a-tracking-id")
        .label("app.kubernetes.io/instance", "guestbook")
        .build();

    let ownership = classify(&resource);
    assert_eq!(ownership.owner, OwnerKind::ArgoCd);
    assert_eq!(ownership.name, "guestbook");
    assert_eq!(ownership.confidence, Confidence::Medium);
}

#[test]
fn test_instance_label_alone_is_not_argocd() {
    // app.kubernetes.io/instance is a Helm/operator convention too; without
    // an ArgoCD signal it must not claim the resource.
    let resource = ResourceBuilder::new("apps/v1", "Deployment", "default", "api")
        .label("app.kubernetes.io/instance", "api")
        .build();

    assert_eq!(classify(&resource).owner, OwnerKind::Native);
}

#[test]
fn test_helm_release_annotations() {
    let resource = ResourceBuilder::new("v1", "Service", "prod", "api")
        .label("app.kubernetes.io/managed-by", "Helm")
        .annotation("meta.helm.sh/release-name", "my-release")
        .annotation("meta.helm.sh/release-namespace", "helm-ns")
        .build();

    let ownership = classify(&resource);
    assert_eq!(ownership.owner, OwnerKind::Helm);
    assert_eq!(ownership.name, "my-release");
    assert_eq!(ownership.namespace, "helm-ns");
}

#[test]
fn test_terraform_run_id() {
    let resource = ResourceBuilder::new("v1", "Secret", "prod", "db-credentials")
        .label("app.terraform.io/run-id", "run-abc123")
        .build();

    let ownership = classify(&resource);
    assert_eq!(ownership.owner, OwnerKind::Terraform);
    assert_eq!(ownership.sub_type.as_deref(), Some("run"));
    assert_eq!(ownership.name, "run-abc123");
    assert_eq!(ownership.confidence, Confidence::High);
}

#[test]
fn test_terraform_managed_by_case_insensitive() {
    let resource = ResourceBuilder::new("v1", "Secret", "prod", "db-credentials")
        .label("managed-by", "Terraform")
        .build();

    let ownership = classify(&resource);
    assert_eq!(ownership.owner, OwnerKind::Terraform);
    assert_eq!(ownership.confidence, Confidence::Medium);
}

#[test]
fn test_confighub_annotation() {
    let resource = ResourceBuilder::new("apps/v1", "Deployment", "prod", "api")
        .annotation("confighub.com/UnitSlug", "prod-api")
        .build();

    let ownership = classify(&resource);
    assert_eq!(ownership.owner, OwnerKind::ConfigHub);
    assert_eq!(ownership.name, "prod-api");
}

#[test]
fn test_crossplane_composite_label() {
    let resource = ResourceBuilder::new("rds.aws.upbound.io/v1beta1", "Instance", "", "db-instance")
        .label("crossplane.io/composite", "xdatabase-abc")
        .build();

    let ownership = classify(&resource);
    assert_eq!(ownership.owner, OwnerKind::Crossplane);
    assert_eq!(ownership.sub_type.as_deref(), Some("instance"));
    assert_eq!(ownership.name, "xdatabase-abc");
    assert_eq!(ownership.namespace, "");
}

#[test]
fn test_crossplane_owner_ref_without_labels() {
    let resource = ResourceBuilder::new("rds.aws.upbound.io/v1beta1", "Instance", "", "db-instance")
        .owner_ref(
            "database.example.org/v1alpha1",
            "XDatabase",
            "xdatabase-abc",
            true,
        )
        .build();

    // example.org is not a Crossplane group, so this goes to K8sOwnerRef
    assert_eq!(classify(&resource).owner, OwnerKind::K8sOwnerRef);

    let resource = ResourceBuilder::new("rds.aws.upbound.io/v1beta1", "Instance", "", "db-instance")
        .owner_ref(
            "database.aws.upbound.io/v1beta1",
            "XDatabase",
            "xdatabase-abc",
            true,
        )
        .build();
    let ownership = classify(&resource);
    assert_eq!(ownership.owner, OwnerKind::Crossplane);
    assert_eq!(ownership.name, "xdatabase-abc");
}

#[test]
fn test_crossplane_control_plane_object() {
    let resource = ResourceBuilder::new("pkg.crossplane.io/v1", "Provider", "", "provider-aws")
        .build();

    let ownership = classify(&resource);
    assert_eq!(ownership.owner, OwnerKind::Crossplane);
    assert_eq!(ownership.sub_type, None);
    assert_eq!(ownership.source, "apiGroup:pkg.crossplane.io");
}

#[test]
fn test_controller_owner_ref() {
    let resource = ResourceBuilder::new("v1", "Pod", "prod", "api-5d9c7b-xyz")
        .owner_ref("apps/v1", "ReplicaSet", "api-5d9c7b", true)
        .build();

    let ownership = classify(&resource);
    assert_eq!(ownership.owner, OwnerKind::K8sOwnerRef);
    assert_eq!(ownership.sub_type.as_deref(), Some("ReplicaSet"));
    assert_eq!(ownership.name, "api-5d9c7b");
    assert_eq!(ownership.confidence, Confidence::High);
}

#[test]
fn test_single_non_controller_owner_ref_is_medium() {
    let resource = ResourceBuilder::new("v1", "ConfigMap", "prod", "shared")
        .owner_ref("apps/v1", "Deployment", "api", false)
        .build();

    let ownership = classify(&resource);
    assert_eq!(ownership.owner, OwnerKind::K8sOwnerRef);
    assert_eq!(ownership.confidence, Confidence::Medium);
}

#[test]
fn test_multiple_non_controller_owner_refs_fall_to_native() {
    let resource = ResourceBuilder::new("v1", "ConfigMap", "prod", "shared")
        .owner_ref("apps/v1", "Deployment", "api", false)
        .owner_ref("apps/v1", "Deployment", "worker", false)
        .build();

    assert_eq!(classify(&resource).owner, OwnerKind::Native);
}

#[test]
fn test_bare_resource_is_native() {
    let resource = ResourceBuilder::new("v1", "ConfigMap", "default", "manual-config").build();

    let ownership = classify(&resource);
    assert_eq!(ownership.owner, OwnerKind::Native);
    assert_eq!(ownership.name, "manual-config");
    assert_eq!(ownership.confidence, Confidence::Low);
    assert_eq!(ownership.source, "none");
}

#[test]
fn test_argocd_wins_over_helm() {
    let resource = ResourceBuilder::new("apps/v1", "Deployment", "default", "api")
        .annotation(
            "argocd.argoproj.io/tracking-id",
            "app:apps/Deployment:default/api",
        )
        .label("app.kubernetes.io/managed-by", "Helm")
        .build();

    assert_eq!(classify(&resource).owner, OwnerKind::ArgoCd);
}

#[test]
fn test_classification_is_deterministic() {
    let resource = ResourceBuilder::new("apps/v1", "Deployment", "prod", "api")
        .label("kustomize.toolkit.fluxcd.io/name", "apps")
        .label("app.kubernetes.io/managed-by", "Helm")
        .owner_ref("apps/v1", "ReplicaSet", "api-5d9c7b", true)
        .spec(json!({"replicas": 3}))
        .build();

    let first = classify(&resource);
    let second = classify(&resource);
    assert_eq!(first, second);
}
