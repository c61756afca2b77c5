//! Columns of the resource table and their cell rendering.
//!
//! This module provides:
//! - Column specs (labels, widths, backing field)
//! - Cell rendering with display placeholders for empty values

#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};

use crate::{Field, Resource, Status};

/// Placeholder shown for an absent status, message or timestamp.
pub const UNAVAILABLE: &str = "Unavailable";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Cluster,
    Kind,
    Name,
    Namespace,
    Status,
    /// Relative age of `lastTransitionTime`.
    LastUpdate,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSpec {
    pub kind: ColumnKind,
    pub label: &'static str,
    pub width: usize,
}

fn col(kind: ColumnKind, label: &'static str, width: usize) -> ColumnSpec {
    ColumnSpec { kind, label, width }
}

/// Columns of the "All Resources" table.
pub fn resource_columns(with_cluster: bool) -> Vec<ColumnSpec> {
    let mut cols = Vec::with_capacity(6);
    if with_cluster {
        cols.push(col(ColumnKind::Cluster, "CLUSTER", 14));
    }
    cols.push(col(ColumnKind::Kind, "KIND", 15));
    cols.push(col(ColumnKind::Name, "NAME", 32));
    cols.push(col(ColumnKind::Namespace, "NAMESPACE", 16));
    cols.push(col(ColumnKind::Status, "STATUS", 12));
    cols.push(col(ColumnKind::LastUpdate, "LAST UPDATE", 14));
    cols
}

/// Render one cell. A status outside the vocabulary renders as `Unknown`; the
/// stored value is left as reported. Empty values fall back to [`UNAVAILABLE`].
pub fn render_cell(r: &Resource, kind: &ColumnKind, now: DateTime<Utc>) -> String {
    let text = match kind {
        ColumnKind::Cluster => r.field_text(Field::Cluster).into_owned(),
        ColumnKind::Kind => r.field_text(Field::Kind).into_owned(),
        ColumnKind::Name => r.field_text(Field::Name).into_owned(),
        ColumnKind::Namespace => r.field_text(Field::Namespace).into_owned(),
        ColumnKind::Status => status_text(r),
        ColumnKind::LastUpdate => match r.last_transition() {
            Some(ts) => render_age(ts.with_timezone(&Utc), now),
            None => String::new(),
        },
    };
    if text.is_empty() { UNAVAILABLE.to_string() } else { text }
}

fn status_text(r: &Resource) -> String {
    let raw = r.field_text(Field::Status);
    if raw.is_empty() || Status::parse(&raw).is_some() {
        raw.into_owned()
    } else {
        r.status().as_str().to_string()
    }
}

/// Human relative age, e.g. "5 minutes ago".
pub fn render_age(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - ts).num_seconds();
    let (future, secs) = if secs < 0 { (true, -secs) } else { (false, secs) };
    let phrase = if secs < 45 {
        "less than a minute".to_string()
    } else if secs < 90 {
        "1 minute".to_string()
    } else if secs < 45 * 60 {
        format!("{} minutes", (secs + 30) / 60)
    } else if secs < 90 * 60 {
        "about 1 hour".to_string()
    } else if secs < 24 * 3600 {
        format!("about {} hours", (secs + 1800) / 3600)
    } else if secs < 48 * 3600 {
        "1 day".to_string()
    } else if secs < 30 * 86400 {
        format!("{} days", (secs + 43200) / 86400)
    } else if secs < 365 * 86400 {
        let months = (secs / (30 * 86400)).max(1);
        if months == 1 { "about 1 month".to_string() } else { format!("{months} months") }
    } else {
        let years = secs / (365 * 86400);
        if years == 1 { "about 1 year".to_string() } else { format!("about {years} years") }
    };
    if future { format!("in {phrase}") } else { format!("{phrase} ago") }
}
