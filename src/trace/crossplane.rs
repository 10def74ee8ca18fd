//! Crossplane claim/composite lineage
//!
//! XR-first resolution: the composite reference on a managed resource is
//! authoritative and sufficient on its own; the claim is enrichment, never a
//! requirement. "Not fetched" is an explicit `present=false` node next to the
//! populated reference, distinct from "no claim at all" (`claim: None`).

use crate::models::{LineageRef, Resource};
use crate::ownership::labels;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// API group suffixes that mark Crossplane-managed resources
const CROSSPLANE_GROUP_SUFFIXES: &[&str] = &[".crossplane.io", ".upbound.io"];

/// A graph node that may or may not have been fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageNode {
    pub present: bool,
    pub reference: LineageRef,
}

/// The managed -> composite -> claim hierarchy behind one managed resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossplaneLineage {
    pub managed: LineageRef,
    pub composite: LineageNode,
    /// None when no claim metadata exists anywhere in the chain
    pub claim: Option<LineageNode>,
    /// Every signal consulted, e.g. "label:crossplane.io/composite"
    pub evidence: Vec<String>,
}

/// Resolve the Crossplane hierarchy behind `managed` against a candidate set.
///
/// Returns `None` only when the resource carries no Crossplane signal at all.
/// Missing objects degrade to `present=false` nodes, never to `None`.
pub fn resolve_crossplane_lineage(
    managed: &Resource,
    candidates: &[Resource],
) -> Option<CrossplaneLineage> {
    let mut evidence = Vec::new();

    // Composite reference: dedicated label first, then owner reference group
    let composite_ref = composite_ref_of(managed, &mut evidence);

    if let Some(reference) = composite_ref {
        let found = find_candidate(candidates, &reference);
        let composite = match found {
            Some(xr) => {
                evidence.push(format!("object:{}/{}", xr.kind, xr.name));
                LineageNode {
                    present: true,
                    reference: xr.lineage_ref(),
                }
            }
            None => LineageNode {
                present: false,
                reference,
            },
        };

        // Claim metadata can live on the XR (preferred) or be mirrored onto
        // the composed resource's own labels.
        let claim_ref = found
            .and_then(|xr| claim_ref_of(xr, &mut evidence))
            .or_else(|| claim_ref_from_labels(managed, &mut evidence));
        let claim = claim_ref.map(|reference| match find_candidate(candidates, &reference) {
            Some(obj) => LineageNode {
                present: true,
                reference: obj.lineage_ref(),
            },
            None => LineageNode {
                present: false,
                reference,
            },
        });

        return Some(CrossplaneLineage {
            managed: managed.lineage_ref(),
            composite,
            claim,
            evidence,
        });
    }

    // No composite pointer: the resource may itself be the XR
    if let Some(claim_ref) = claim_ref_from_labels(managed, &mut evidence) {
        let claim = Some(match find_candidate(candidates, &claim_ref) {
            Some(obj) => LineageNode {
                present: true,
                reference: obj.lineage_ref(),
            },
            None => LineageNode {
                present: false,
                reference: claim_ref,
            },
        });
        return Some(CrossplaneLineage {
            managed: managed.lineage_ref(),
            composite: LineageNode {
                present: true,
                reference: managed.lineage_ref(),
            },
            claim,
            evidence,
        });
    }

    None
}

fn composite_ref_of(managed: &Resource, evidence: &mut Vec<String>) -> Option<LineageRef> {
    if let Some(name) = managed.label(labels::CROSSPLANE_COMPOSITE) {
        evidence.push(format!("label:{}", labels::CROSSPLANE_COMPOSITE));
        // The label names the XR but not its kind; an owner reference from a
        // Crossplane group fills the kind in when available.
        let kind = managed
            .owner_refs
            .iter()
            .find(|o| is_crossplane_group(&o.api_group) && o.name == name)
            .map(|o| o.kind.clone())
            .unwrap_or_default();
        return Some(LineageRef::new(kind, "", name));
    }
    managed
        .owner_refs
        .iter()
        .find(|o| is_crossplane_group(&o.api_group))
        .map(|o| {
            evidence.push(format!("ownerRef:{}/{}", o.api_group, o.kind));
            LineageRef::new(&o.kind, "", &o.name)
        })
}

fn claim_ref_of(xr: &Resource, evidence: &mut Vec<String>) -> Option<LineageRef> {
    // spec.claimRef carries the full identity; labels only name/namespace
    if let Some(claim_ref) = xr.spec.get("claimRef") {
        if let Some(reference) = lineage_ref_from_claim(claim_ref) {
            evidence.push("spec:claimRef".to_string());
            return Some(reference);
        }
    }
    claim_ref_from_labels(xr, evidence)
}

fn claim_ref_from_labels(resource: &Resource, evidence: &mut Vec<String>) -> Option<LineageRef> {
    let name = resource.label(labels::CROSSPLANE_CLAIM_NAME)?;
    evidence.push(format!("label:{}", labels::CROSSPLANE_CLAIM_NAME));
    let namespace = resource
        .label(labels::CROSSPLANE_CLAIM_NAMESPACE)
        .unwrap_or_default();
    Some(LineageRef::new("", namespace, name))
}

fn lineage_ref_from_claim(value: &Value) -> Option<LineageRef> {
    let kind = value.get("kind").and_then(|k| k.as_str())?;
    let name = value.get("name").and_then(|n| n.as_str())?;
    let namespace = value
        .get("namespace")
        .and_then(|n| n.as_str())
        .unwrap_or_default();
    Some(LineageRef::new(kind, namespace, name))
}

/// Match by name, and by kind/namespace when the reference knows them
fn find_candidate<'a>(candidates: &'a [Resource], reference: &LineageRef) -> Option<&'a Resource> {
    candidates.iter().find(|c| {
        c.name == reference.name
            && (reference.kind.is_empty() || c.kind == reference.kind)
            && (reference.namespace.is_empty() || c.namespace == reference.namespace)
    })
}

fn is_crossplane_group(group: &str) -> bool {
    CROSSPLANE_GROUP_SUFFIXES
        .iter()
        .any(|suffix| group.ends_with(suffix))
}
