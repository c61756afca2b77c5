//! Distinct values offered as filter choices.

use std::collections::BTreeSet;

use fluxradar_core::{Field, Resource};
use rustc_hash::FxHashSet;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    /// First-seen order.
    pub clusters: Vec<String>,
    pub namespaces: Vec<String>,
    pub kinds: Vec<String>,
}

pub fn facets(items: &[Resource]) -> Facets {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut clusters = Vec::new();
    let mut namespaces = BTreeSet::new();
    let mut kinds = BTreeSet::new();
    for r in items {
        if seen.insert(r.cluster()) {
            clusters.push(r.cluster().to_string());
        }
        namespaces.insert(r.field_text(Field::Namespace).into_owned());
        kinds.insert(r.field_text(Field::Kind).into_owned());
    }
    Facets { clusters, namespaces: namespaces.into_iter().collect(), kinds: kinds.into_iter().collect() }
}
