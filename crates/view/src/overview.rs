//! Per-cluster overview computed from the full, unfiltered snapshot.

use chrono::{DateTime, FixedOffset};
use fluxradar_core::{Resource, Status};
use rustc_hash::FxHashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Record counts keyed by normalized status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCounts {
    counts: [usize; Status::ALL.len()],
    pub total: usize,
}

impl StatusCounts {
    fn slot(s: Status) -> usize {
        Status::ALL.iter().position(|x| *x == s).unwrap_or(Status::ALL.len() - 1)
    }

    pub fn add(&mut self, s: Status) {
        self.counts[Self::slot(s)] += 1;
        self.total += 1;
    }

    pub fn get(&self, s: Status) -> usize { self.counts[Self::slot(s)] }

    /// Non-zero counts in display order.
    pub fn nonzero(&self) -> impl Iterator<Item = (Status, usize)> + '_ {
        Status::ALL.iter().map(|s| (*s, self.get(*s))).filter(|(_, n)| *n > 0)
    }
}

/// Serialized as `{ "Ready": n, ..., "Total": n }`.
impl Serialize for StatusCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len() + 1))?;
        for (s, n) in Status::ALL.iter().zip(self.counts.iter()) {
            map.serialize_entry(s.as_str(), n)?;
        }
        map.serialize_entry("Total", &self.total)?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ClusterOverview {
    pub cluster: String,
    pub counts: StatusCounts,
    /// Latest `lastTransitionTime` seen in the cluster, as reported.
    pub latest: Option<String>,
    #[serde(skip)]
    latest_at: Option<DateTime<FixedOffset>>,
}

impl ClusterOverview {
    fn new(cluster: &str) -> Self {
        Self { cluster: cluster.to_string(), counts: StatusCounts::default(), latest: None, latest_at: None }
    }

    pub fn latest_at(&self) -> Option<DateTime<FixedOffset>> { self.latest_at }

    fn observe(&mut self, r: &Resource) {
        self.counts.add(r.status());
        if let Some(ts) = r.last_transition() {
            if self.latest_at.map_or(true, |cur| ts > cur) {
                self.latest_at = Some(ts);
                self.latest = Some(r.last_transition_time().to_string());
            }
        }
    }
}

/// One entry per cluster in first-seen order.
pub fn cluster_overview(items: &[Resource]) -> Vec<ClusterOverview> {
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut out: Vec<ClusterOverview> = Vec::new();
    for r in items {
        let ix = *index.entry(r.cluster()).or_insert_with(|| {
            out.push(ClusterOverview::new(r.cluster()));
            out.len() - 1
        });
        out[ix].observe(r);
    }
    out
}
