//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server and provides a configured
//! client plus the snapshot providers the resolver and scanner read from.

mod fetch;

use anyhow::Result;
use kube::{Client, Config};

pub use fetch::{ClusterProvider, ManifestProvider, ResourceProvider, Snapshot};

/// Initialize and return a Kubernetes client
///
/// Uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client() -> Result<Client> {
    let config = Config::infer().await?;
    let client = Client::try_from(config)?;
    Ok(client)
}

/// Get the current Kubernetes context name
pub fn get_context() -> String {
    let kubeconfig_path = std::env::var("KUBECONFIG").ok().or_else(|| {
        let home = std::env::var("HOME").ok()?;
        Some(format!("{}/.kube/config", home))
    });

    if let Some(path) = kubeconfig_path {
        if let Ok(contents) = std::fs::read_to_string(&path) {
            // Parse current-context from kubeconfig
            for line in contents.lines() {
                if line.trim().starts_with("current-context:") {
                    if let Some(context) = line.split(':').nth(1) {
                        return context.trim().to_string();
                    }
                }
            }
        }
    }

    "default".to_string()
}

/// Get the namespace filter for snapshot gathering
///
/// `NAMESPACE` set to empty, `all` or `-A` means every namespace, which is
/// also the default: ownership questions usually span namespaces.
pub fn get_default_namespace() -> Option<String> {
    if let Ok(ns) = std::env::var("NAMESPACE") {
        if ns.is_empty() || ns == "all" || ns == "-A" {
            return None;
        }
        return Some(ns);
    }
    None
}
