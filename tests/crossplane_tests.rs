//! Crossplane claim/composite lineage tests
//!
//! The resolver is XR-first: composite evidence alone is sufficient, a
//! missing XR degrades to a present=false node, and the claim is enrichment.

mod common;

use common::ResourceBuilder;
use ownscope::trace::resolve_crossplane_lineage;
use serde_json::json;

fn managed_instance() -> ResourceBuilder {
    ResourceBuilder::new("rds.aws.upbound.io/v1beta1", "Instance", "", "db-instance-x7k2")
        .label("crossplane.io/composite", "xdatabase-abc")
}

fn composite_xr() -> ResourceBuilder {
    ResourceBuilder::new("database.example.org/v1alpha1", "XDatabase", "", "xdatabase-abc")
        .label("crossplane.io/claim-name", "my-database")
        .label("crossplane.io/claim-namespace", "team-a")
}

#[test]
fn test_full_hierarchy_resolves() {
    let managed = managed_instance()
        .owner_ref(
            "database.example.crossplane.io/v1alpha1",
            "XDatabase",
            "xdatabase-abc",
            true,
        )
        .build();
    let xr = composite_xr().build();
    let claim = ResourceBuilder::new("database.example.org/v1alpha1", "Database", "team-a", "my-database")
        .build();

    let lineage = resolve_crossplane_lineage(&managed, &[xr, claim]).unwrap();

    assert_eq!(lineage.managed.name, "db-instance-x7k2");
    assert!(lineage.composite.present);
    assert_eq!(lineage.composite.reference.kind, "XDatabase");
    assert_eq!(lineage.composite.reference.name, "xdatabase-abc");

    let claim = lineage.claim.unwrap();
    assert!(claim.present);
    assert_eq!(claim.reference.name, "my-database");
    assert_eq!(claim.reference.namespace, "team-a");

    assert!(lineage.evidence.iter().any(|e| e == "label:crossplane.io/composite"));
    assert!(lineage.evidence.iter().any(|e| e == "object:XDatabase/xdatabase-abc"));
}

#[test]
fn test_missing_xr_degrades_to_absent_node() {
    // RBAC often hides cluster-scoped XRs: the lineage must still resolve,
    // with the composite marked not-present and its reference populated.
    let managed = managed_instance().build();

    let lineage = resolve_crossplane_lineage(&managed, &[]).unwrap();

    assert!(!lineage.composite.present);
    assert_eq!(lineage.composite.reference.name, "xdatabase-abc");
    assert_eq!(lineage.composite.reference.namespace, "");
    assert!(lineage.claim.is_none());
}

#[test]
fn test_missing_xr_claim_from_managed_labels() {
    // Claim labels mirrored onto the composed resource still yield a claim
    // node even when the XR itself is unreadable.
    let managed = managed_instance()
        .label("crossplane.io/claim-name", "my-database")
        .label("crossplane.io/claim-namespace", "team-a")
        .build();

    let lineage = resolve_crossplane_lineage(&managed, &[]).unwrap();

    assert!(!lineage.composite.present);
    let claim = lineage.claim.unwrap();
    assert!(!claim.present);
    assert_eq!(claim.reference.name, "my-database");
    assert_eq!(claim.reference.namespace, "team-a");
}

#[test]
fn test_owner_ref_group_suffix_without_label() {
    let managed = ResourceBuilder::new("s3.aws.upbound.io/v1beta1", "Bucket", "", "bucket-k9f3")
        .owner_ref("storage.example.crossplane.io/v1", "XBucket", "xbucket-12", true)
        .build();

    let lineage = resolve_crossplane_lineage(&managed, &[]).unwrap();
    assert_eq!(lineage.composite.reference.kind, "XBucket");
    assert_eq!(lineage.composite.reference.name, "xbucket-12");
    assert!(lineage
        .evidence
        .iter()
        .any(|e| e == "ownerRef:storage.example.crossplane.io/XBucket"));
}

#[test]
fn test_claim_ref_in_spec_preferred() {
    let managed = managed_instance().build();
    let xr = ResourceBuilder::new("database.example.org/v1alpha1", "XDatabase", "", "xdatabase-abc")
        .spec(json!({
            "claimRef": {"kind": "Database", "name": "my-database", "namespace": "team-a"},
        }))
        .build();

    let lineage = resolve_crossplane_lineage(&managed, &[xr]).unwrap();
    let claim = lineage.claim.unwrap();
    assert_eq!(claim.reference.kind, "Database");
    assert!(lineage.evidence.iter().any(|e| e == "spec:claimRef"));
}

#[test]
fn test_xr_itself_resolves_with_self_composite() {
    // An XR carries claim labels but no composite pointer: it is its own
    // composite in the hierarchy.
    let xr = composite_xr().build();

    let lineage = resolve_crossplane_lineage(&xr, &[]).unwrap();
    assert!(lineage.composite.present);
    assert_eq!(lineage.composite.reference.name, "xdatabase-abc");
    assert_eq!(lineage.claim.unwrap().reference.name, "my-database");
}

#[test]
fn test_no_signal_returns_none() {
    let plain = ResourceBuilder::new("apps/v1", "Deployment", "prod", "api").build();
    assert!(resolve_crossplane_lineage(&plain, &[]).is_none());
}
