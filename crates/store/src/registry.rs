//! Resource registry: the authoritative in-RAM collection of records, partitioned
//! by cluster and mutated only by whole-cluster replacement.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use arc_swap::ArcSwap;
use fluxradar_core::{RegistrySnapshot, Resource};
use metrics::{counter, gauge, histogram};
use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::Notifier;

/// Handle for readers and the single mutation path.
///
/// Readers load the current snapshot lock-free. Writers serialize on `write`
/// for the read-modify-swap; the notification goes out after the swap is
/// visible and after the lock is released, so handlers may call back into the
/// registry.
pub struct Registry {
    snap: ArcSwap<RegistrySnapshot>,
    write: Mutex<()>,
    notifier: Notifier,
}

impl Registry {
    pub fn new(notifier: Notifier) -> Self { Self::with_items(notifier, Vec::new()) }

    /// Start from a pre-populated record set (epoch 0, nothing published).
    pub fn with_items(notifier: Notifier, items: Vec<Resource>) -> Self {
        gauge!("registry_resources", items.len() as f64);
        Self {
            snap: ArcSwap::from_pointee(RegistrySnapshot { epoch: 0, items }),
            write: Mutex::new(()),
            notifier,
        }
    }

    /// Current full snapshot across all clusters.
    pub fn read_all(&self) -> Arc<RegistrySnapshot> { self.snap.load_full() }

    pub fn epoch(&self) -> u64 { self.snap.load().epoch }
    pub fn len(&self) -> usize { self.snap.load().items.len() }
    pub fn is_empty(&self) -> bool { self.snap.load().items.is_empty() }

    /// Distinct cluster names, in first-seen order.
    pub fn clusters(&self) -> Vec<String> {
        let snap = self.snap.load();
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut out = Vec::new();
        for r in snap.items.iter() {
            if seen.insert(r.cluster()) {
                out.push(r.cluster().to_string());
            }
        }
        out
    }

    pub fn notifier(&self) -> &Notifier { &self.notifier }

    /// Replace every record of `cluster` with `resources`, stamping each incoming
    /// record's `cluster` field, then publish one change notification.
    ///
    /// An empty `resources` removes the cluster entirely. Returns the new epoch.
    pub fn replace_cluster(&self, cluster: &str, resources: Vec<Resource>) -> u64 {
        let started = Instant::now();
        let incoming = resources.len();
        let (epoch, removed, total) = {
            let _guard = self.write.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let cur = self.snap.load();
            let mut items: Vec<Resource> = Vec::with_capacity(cur.items.len() + incoming);
            items.extend(cur.items.iter().filter(|r| r.cluster() != cluster).cloned());
            let removed = cur.items.len() - items.len();
            for mut r in resources {
                r.stamp_cluster(cluster);
                items.push(r);
            }
            let epoch = cur.epoch.saturating_add(1);
            let total = items.len();
            self.snap.store(Arc::new(RegistrySnapshot { epoch, items }));
            (epoch, removed, total)
        };

        counter!("registry_replace_total", 1u64);
        gauge!("registry_resources", total as f64);
        gauge!("registry_clusters", self.clusters().len() as f64);
        histogram!("registry_replace_ms", started.elapsed().as_secs_f64() * 1000.0);
        if incoming == 0 {
            info!(cluster, removed, epoch, "cluster snapshot empty; cluster cleared");
        } else {
            debug!(cluster, removed, added = incoming, total, epoch, "cluster snapshot replaced");
        }

        self.notifier.publish();
        epoch
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snap = self.snap.load();
        f.debug_struct("Registry").field("epoch", &snap.epoch).field("items", &snap.items.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxradar_core::{ResourceKind, ResourceType};

    fn pod(id: &str) -> Resource {
        Resource::new(id, &ResourceKind::Pod, ResourceType::K8s, id, "default", "Running")
    }

    #[test]
    fn within_cluster_order_follows_last_snapshot() {
        let reg = Registry::new(Notifier::new());
        reg.replace_cluster("a", vec![pod("3"), pod("1"), pod("2")]);
        let ids: Vec<_> = reg.read_all().items.iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, ["3", "1", "2"]);
    }

    #[test]
    fn clusters_in_first_seen_order() {
        let reg = Registry::new(Notifier::new());
        reg.replace_cluster("b", vec![pod("1")]);
        reg.replace_cluster("a", vec![pod("1")]);
        assert_eq!(reg.clusters(), ["b", "a"]);
        reg.replace_cluster("b", vec![pod("2")]);
        assert_eq!(reg.clusters(), ["a", "b"]);
    }

    #[test]
    fn epoch_advances_per_mutation() {
        let reg = Registry::new(Notifier::new());
        assert_eq!(reg.epoch(), 0);
        assert_eq!(reg.replace_cluster("a", vec![pod("1")]), 1);
        assert_eq!(reg.replace_cluster("a", vec![]), 2);
        assert_eq!(reg.read_all().epoch, 2);
        assert!(reg.is_empty());
    }

    #[test]
    fn handler_can_read_back_new_state() {
        let reg = Arc::new(Registry::new(Notifier::new()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (r, s) = (Arc::clone(&reg), Arc::clone(&seen));
        let _sub = reg.notifier().subscribe(move || s.lock().unwrap().push(r.len()));
        reg.replace_cluster("a", vec![pod("1"), pod("2")]);
        reg.replace_cluster("a", vec![]);
        assert_eq!(*seen.lock().unwrap(), vec![2, 0]);
    }
}
