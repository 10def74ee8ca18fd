//! ownscope - ownership and lineage resolution for Kubernetes GitOps resources
//!
//! Answers "who owns this object and how did it get here" across Flux,
//! ArgoCD, Helm, Terraform, ConfigHub and Crossplane, from a live cluster or
//! a directory of static manifests.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use ownscope::cli::{
    self, OutputFormat, handle_classify, handle_query, handle_scan, handle_trace,
};
use ownscope::kube::{ClusterProvider, ManifestProvider, ResourceProvider};
use ownscope::scan::ScanOptions;
use ownscope::trace::{TraceDirection, TraceOptions};

/// Ownership and lineage resolution for Kubernetes GitOps resources
#[derive(Parser, Debug)]
#[command(name = "ownscope")]
#[command(about = "Resolve ownership, lineage and misconfigurations of GitOps-managed resources", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    /// Read resources from a directory of YAML manifests instead of a cluster
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    /// Namespace: the object's namespace for classify/trace (empty falls
    /// back to the kubeconfig default), the snapshot scope for scan/query
    /// (empty means all namespaces)
    #[arg(long, short = 'n', global = true, default_value = "")]
    namespace: String,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify the controlling authority of one object
    Classify {
        /// Resource kind (e.g. Deployment)
        kind: String,
        /// Resource name
        name: String,
    },
    /// Trace an object's delivery chain back to its source
    Trace {
        /// Resource kind (e.g. Deployment)
        kind: String,
        /// Resource name
        name: String,
        /// Print the chain source-first instead of resource-first
        #[arg(long)]
        forward: bool,
    },
    /// Scan the snapshot for misconfigurations
    Scan {
        /// Seconds a non-ready resource may linger before counting as stuck
        #[arg(long, default_value_t = 300)]
        stall_threshold: u64,
    },
    /// Filter resources with a query expression, e.g. "owner=Flux AND status=NotReady"
    Query {
        /// Query expression
        expr: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = cli::init_logging(args.debug);
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    let provider: Box<dyn ResourceProvider> = match &args.path {
        Some(path) => Box::new(ManifestProvider::load(path)?),
        None => {
            tracing::debug!("Initializing Kubernetes client");
            let client = ownscope::kube::create_client().await?;
            let context = ownscope::kube::get_context();
            let namespace = if args.namespace.is_empty() {
                ownscope::kube::get_default_namespace()
            } else {
                Some(args.namespace.clone())
            };
            tracing::debug!("Connected to context {context}");
            Box::new(ClusterProvider::new(client, context, namespace))
        }
    };

    match &args.command {
        Command::Classify { kind, name } => {
            handle_classify(provider.as_ref(), kind, &args.namespace, name, args.output).await
        }
        Command::Trace {
            kind,
            name,
            forward,
        } => {
            let opts = TraceOptions {
                direction: if *forward {
                    TraceDirection::Forward
                } else {
                    TraceDirection::Reverse
                },
                ..Default::default()
            };
            handle_trace(
                provider.as_ref(),
                kind,
                &args.namespace,
                name,
                opts,
                args.output,
            )
            .await
        }
        Command::Scan { stall_threshold } => {
            let opts = ScanOptions {
                stall_threshold: Duration::from_secs(*stall_threshold),
                ..Default::default()
            };
            handle_scan(provider.as_ref(), opts, args.output).await
        }
        Command::Query { expr } => handle_query(provider.as_ref(), expr, args.output).await,
    }
}
