//! CLI subcommand handlers
//!
//! Each handler gathers a snapshot from the provider, runs the relevant
//! engine and prints either human-readable text or JSON to stdout.

use std::collections::HashMap;

use anyhow::{Result, bail};
use clap::ValueEnum;

use crate::kube::ResourceProvider;
use crate::models::{LineageRef, Resource, resource_key};
use crate::ownership::{Confidence, Ownership, classify};
use crate::query;
use crate::scan::{self, Category, ScanOptions, Severity};
use crate::trace::{
    ChainLink, CrossReference, LineageNode, ReferenceKind, ReferenceStatus, TraceOptions,
    resolve_crossplane_lineage, trace,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Classify one object and print its ownership verdict
pub async fn handle_classify(
    provider: &dyn ResourceProvider,
    kind: &str,
    namespace: &str,
    name: &str,
    output: OutputFormat,
) -> Result<()> {
    let reference = LineageRef::new(kind, namespace, name);
    let Some(resource) = provider.get(&reference).await else {
        bail!("{} not found", reference);
    };
    let ownership = classify(&resource);

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ownership)?),
        OutputFormat::Text => {
            println!("{}", reference);
            match &ownership.sub_type {
                Some(sub_type) => println!("  Owner:      {} ({})", ownership.owner, sub_type),
                None => println!("  Owner:      {}", ownership.owner),
            }
            if ownership.namespace.is_empty() {
                println!("  Managed by: {}", ownership.name);
            } else {
                println!("  Managed by: {}/{}", ownership.namespace, ownership.name);
            }
            println!(
                "  Signal:     {} ({})",
                ownership.source,
                confidence_str(ownership.confidence)
            );
        }
    }
    Ok(())
}

/// Trace one object's delivery chain and print it
pub async fn handle_trace(
    provider: &dyn ResourceProvider,
    kind: &str,
    namespace: &str,
    name: &str,
    opts: TraceOptions,
    output: OutputFormat,
) -> Result<()> {
    let snapshot = provider.snapshot().await?;
    let index = index_snapshot(&snapshot.resources);

    let root_key = resource_key(kind, namespace, name);
    let root = index.get(root_key.as_str()).cloned().cloned().or_else(|| {
        if !namespace.is_empty() {
            return None;
        }
        // A bare name resolves against the whole snapshot
        snapshot
            .resources
            .iter()
            .find(|r| r.kind == kind && r.name == name)
            .cloned()
    });
    let Some(root) = root else {
        bail!("{} not found", LineageRef::new(kind, namespace, name));
    };

    let mut fetch = |reference: &LineageRef| {
        index
            .get(resource_key(&reference.kind, &reference.namespace, &reference.name).as_str())
            .cloned()
            .cloned()
    };
    let result = trace(&root, &mut fetch, &opts);
    let crossplane = resolve_crossplane_lineage(&root, &snapshot.resources);

    match output {
        OutputFormat::Json => {
            let payload = serde_json::json!({
                "trace": result,
                "crossplane": crossplane,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputFormat::Text => {
            println!("Object: {}", result.root.lineage_ref());
            if result.chain.is_empty() {
                println!("Chain:  (none)");
            } else {
                println!("Chain:");
                for link in &result.chain {
                    println!("  {}", format_link(link));
                }
            }
            if let Some(lineage) = &crossplane {
                println!("Crossplane:");
                println!("  composite: {}", format_lineage_node(&lineage.composite));
                if let Some(claim) = &lineage.claim {
                    println!("  claim:     {}", format_lineage_node(claim));
                }
                println!("  evidence:  {}", lineage.evidence.join(", "));
            }
            if !result.cross_references.is_empty() {
                println!("Cross-references:");
                for cross_ref in &result.cross_references {
                    println!("  {}", format_cross_reference(cross_ref));
                }
            }
        }
    }
    Ok(())
}

fn format_lineage_node(node: &LineageNode) -> String {
    if node.present {
        format!("{}", node.reference)
    } else {
        format!("{} (not fetched, partial lineage)", node.reference)
    }
}

/// Scan the full snapshot for misconfigurations
pub async fn handle_scan(
    provider: &dyn ResourceProvider,
    mut opts: ScanOptions,
    output: OutputFormat,
) -> Result<()> {
    let snapshot = provider.snapshot().await?;
    opts.data_errors = snapshot.errors;
    let result = scan::scan(snapshot.resources, opts).await;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            for category in Category::all() {
                if result.count_by_category(*category) == 0 {
                    continue;
                }
                println!("{}", category);
                for finding in result.findings.iter().filter(|f| f.category == *category) {
                    println!(
                        "  [{}] {} {}: {}",
                        severity_str(finding.severity),
                        finding.id,
                        finding.resource,
                        finding.message
                    );
                    println!("    fix: {}", finding.fix);
                }
            }
            for warning in &result.warnings {
                println!("warning: {}", warning);
            }
            println!(
                "{} critical, {} warning, {} info",
                result.summary.critical, result.summary.warning, result.summary.info
            );
        }
    }

    if result.summary.critical > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Filter the snapshot by a query expression and print the matches
pub async fn handle_query(
    provider: &dyn ResourceProvider,
    expr: &str,
    output: OutputFormat,
) -> Result<()> {
    let parsed = query::parse(expr)?;
    let snapshot = provider.snapshot().await?;

    let matches: Vec<(&Resource, Ownership)> = snapshot
        .resources
        .iter()
        .map(|r| (r, classify(r)))
        .filter(|(r, ownership)| query::evaluate(&parsed, r, ownership))
        .collect();

    match output {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = matches
                .iter()
                .map(|(r, ownership)| {
                    serde_json::json!({
                        "kind": r.kind,
                        "namespace": r.namespace,
                        "name": r.name,
                        "owner": ownership,
                        "ready": r.status.ready,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            println!(
                "{:<14} {:<16} {:<32} {:<10} {:<8}",
                "KIND", "NAMESPACE", "NAME", "OWNER", "STATUS"
            );
            for (resource, ownership) in &matches {
                println!(
                    "{:<14} {:<16} {:<32} {:<10} {:<8}",
                    resource.kind,
                    resource.namespace,
                    resource.name,
                    ownership.owner.as_str(),
                    if resource.status.ready {
                        "Ready"
                    } else {
                        "NotReady"
                    }
                );
            }
        }
    }
    Ok(())
}

fn index_snapshot(resources: &[Resource]) -> HashMap<String, &Resource> {
    resources
        .iter()
        .map(|r| (resource_key(&r.kind, &r.namespace, &r.name), r))
        .collect()
}

fn format_link(link: &ChainLink) -> String {
    let reference = LineageRef::new(&link.kind, &link.namespace, &link.name);
    if !link.present {
        return format!("{}  (not found, partial lineage)", reference);
    }
    let mut line = match link.ready {
        Some(true) => format!("{}  Ready", reference),
        Some(false) => format!("{}  NotReady", reference),
        None => format!("{}  (no status)", reference),
    };
    if link.stalled {
        if let Some(elapsed) = link.elapsed_since_transition {
            line.push_str(&format!("  STALLED {}s", elapsed.as_secs()));
        }
    }
    if !link.message.is_empty() {
        line.push_str(&format!("  {}", link.message));
    }
    line
}

fn format_cross_reference(cross_ref: &CrossReference) -> String {
    let owner = cross_ref
        .owner_of_referenced
        .map(|o| o.as_str())
        .unwrap_or("unknown");
    let status = match cross_ref.status {
        ReferenceStatus::Exists => "exists",
        ReferenceStatus::Missing => "MISSING",
    };
    let mut line = format!(
        "{} ({}) owner={} {}",
        cross_ref.referenced,
        reference_kind_str(cross_ref.reference_kind),
        owner,
        status
    );
    if cross_ref.coordination_risk {
        line.push_str("  COORDINATION RISK");
    }
    line
}

fn reference_kind_str(kind: ReferenceKind) -> &'static str {
    match kind {
        ReferenceKind::EnvFrom => "envFrom",
        ReferenceKind::ValueFrom => "valueFrom",
        ReferenceKind::Volume => "volume",
        ReferenceKind::ProjectedVolume => "projected",
    }
}

fn confidence_str(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => "High",
        Confidence::Medium => "Medium",
        Confidence::Low => "Low",
    }
}

fn severity_str(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "CRITICAL",
        Severity::Warning => "WARNING",
        Severity::Info => "INFO",
    }
}
