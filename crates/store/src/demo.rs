//! Demonstration dataset loaded by `fluxradar serve --seed-demo`.

use fluxradar_core::{Resource, ResourceKind, ResourceType};

fn flux(cluster: &str, kind: ResourceKind, ns: &str, name: &str, status: &str, msg: &str, ts: &str) -> Resource {
    let id = format!("{}-{}-{}", ns, kind.as_str().to_lowercase(), name);
    Resource::new(id, &kind, ResourceType::Flux, name, ns, status)
        .with_message(msg)
        .with_last_transition(ts)
        .with_cluster(cluster)
}

fn k8s(cluster: &str, kind: ResourceKind, short: &str, ns: &str, name: &str, status: &str, ts: &str) -> Resource {
    let id = format!("{}-{}-{}", ns, short, name);
    Resource::new(id, &kind, ResourceType::K8s, name, ns, status)
        .with_last_transition(ts)
        .with_cluster(cluster)
}

/// Two clusters with a mix of toolkit and native objects across every status.
pub fn demo_resources() -> Vec<Resource> {
    use ResourceKind::*;
    vec![
        flux("production", GitRepository, "flux-system", "flux-system", "Ready", "stored artifact for revision 'main@sha1:4f2a9c1'", "2024-05-20T08:12:00Z"),
        flux("production", Kustomization, "flux-system", "apps", "Ready", "Applied revision: main@sha1:4f2a9c1", "2024-05-20T08:13:10Z"),
        flux("production", Kustomization, "flux-system", "infrastructure", "Reconciling", "Reconciliation in progress", "2024-05-20T08:14:02Z"),
        flux("production", HelmRelease, "monitoring", "kube-prometheus-stack", "Ready", "Helm upgrade succeeded", "2024-05-19T22:40:51Z"),
        flux("production", HelmRelease, "ingress", "ingress-nginx", "Failed", "install retries exhausted", "2024-05-20T07:58:33Z"),
        k8s("production", Deployment, "deploy", "shop", "checkout", "Available", "2024-05-18T11:02:00Z"),
        k8s("production", Service, "svc", "shop", "checkout", "Active", ""),
        k8s("production", Pod, "pod", "shop", "checkout-7d9f8b6c5-x2lqp", "Running", "2024-05-20T06:30:00Z"),
        flux("staging", GitRepository, "flux-system", "flux-system", "Error", "failed to checkout and determine revision: authentication required", "2024-05-20T08:20:45Z"),
        flux("staging", Kustomization, "flux-system", "apps", "Suspended", "", "2024-05-17T15:00:00Z"),
        flux("staging", HelmRelease, "cert-manager", "cert-manager", "Ready", "Helm install succeeded", "2024-05-16T09:10:00Z"),
        k8s("staging", Deployment, "deploy", "shop", "checkout", "Unknown", ""),
        k8s("staging", Pod, "pod", "shop", "checkout-5c4b7f9d8-q8wzn", "Pending", "2024-05-20T08:21:00Z"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_spans_two_clusters() {
        let items = demo_resources();
        assert!(items.iter().any(|r| r.cluster() == "production"));
        assert!(items.iter().any(|r| r.cluster() == "staging"));
        assert!(items.iter().all(|r| !r.id().is_empty()));
    }
}
