//! Terminal viewer: keeps a local copy of the registry snapshot, re-fetches it
//! whenever the live-update stream signals a change, and renders the derived view.
//!
//! Fetch failures never clear the screen: the last good snapshot stays on
//! display and the stream is reconnected with capped exponential backoff.

use std::fmt::Write as _;
use std::io::{BufRead, BufReader};
use std::time::Duration;

use chrono::{DateTime, Utc};
use fluxradar_core::columns::{render_cell, resource_columns};
use fluxradar_core::Resource;
use fluxradar_view::{derive, View, ViewState};
use tracing::{debug, info, warn};

use crate::Output;

const BACKOFF_START: Duration = Duration::from_secs(1);
const BACKOFF_MAX: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("fetching {url}: {source}")]
    Read { url: String, source: ureq::Error },
    #[error("connecting to {url}: {source}")]
    Connect { url: String, source: ureq::Error },
    #[error("reading update stream: {0}")]
    Stream(#[from] std::io::Error),
}

pub struct Viewer {
    base: String,
    agent: ureq::Agent,
    state: ViewState,
    output: Output,
    cache: Vec<Resource>,
}

impl Viewer {
    pub fn new(base_url: &str, state: ViewState, output: Output) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_string(),
            agent: ureq::Agent::new_with_defaults(),
            state,
            output,
            cache: Vec::new(),
        }
    }

    fn url(&self, path: &str) -> String { format!("{}{}", self.base, path) }

    /// GET /resources into the local cache. The cache is left untouched on failure.
    pub fn refresh(&mut self) -> Result<usize, FetchError> {
        let url = self.url("/resources");
        let items = self
            .agent
            .get(&url)
            .call()
            .and_then(|resp| resp.into_body().read_json::<Vec<Resource>>())
            .map_err(|source| FetchError::Read { url, source })?;
        self.cache = items;
        Ok(self.cache.len())
    }

    fn refresh_and_render(&mut self) {
        match self.refresh() {
            Ok(n) => debug!(resources = n, "snapshot refreshed"),
            Err(e) => warn!(error = %e, "Failed to fetch resources; showing last known data"),
        }
        self.render();
    }

    pub fn render(&self) {
        let view = derive(&self.cache, &self.state);
        match self.output {
            Output::Human => println!("{}", render_human(&view, Utc::now())),
            Output::Json => match render_json(&view) {
                Ok(s) => println!("{s}"),
                Err(e) => warn!(error = %e, "failed to serialize view"),
            },
        }
    }

    /// Single fetch and render.
    pub fn once(&mut self) -> Result<(), FetchError> {
        self.refresh()?;
        self.render();
        Ok(())
    }

    /// Follow GET /updates forever, re-fetching on every `update` frame.
    pub fn follow(&mut self) {
        self.refresh_and_render();
        let mut backoff = BACKOFF_START;
        loop {
            match self.stream_updates() {
                Ok(()) => {
                    info!("update stream ended; reconnecting");
                    backoff = BACKOFF_START;
                }
                Err(e) => warn!(error = %e, retry_in = ?backoff, "update stream failed"),
            }
            std::thread::sleep(backoff);
            backoff = (backoff * 2).min(BACKOFF_MAX);
            // Changes may have happened while disconnected; nothing is replayed.
            self.refresh_and_render();
        }
    }

    fn stream_updates(&mut self) -> Result<(), FetchError> {
        let url = self.url("/updates");
        let resp = self
            .agent
            .get(&url)
            .header("Accept", "text/event-stream")
            .call()
            .map_err(|source| FetchError::Connect { url: url.clone(), source })?;
        info!(url = %url, "connected to update stream");
        let reader = BufReader::new(resp.into_body().into_reader());
        for line in reader.lines() {
            let line = line?;
            if let Some(data) = line.strip_prefix("data:") {
                if data.trim() == fluxradar_server::live::UPDATE {
                    self.refresh_and_render();
                }
            }
        }
        Ok(())
    }
}

/// Overview cards followed by the current page of the table.
pub fn render_human(view: &View<'_>, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Cluster Overview");
    if view.overview.is_empty() {
        let _ = writeln!(out, "  (no clusters reporting)");
    }
    for ov in &view.overview {
        let breakdown: Vec<String> = ov.counts.nonzero().map(|(s, n)| format!("{n} {s}")).collect();
        let last = ov.latest_at().map(|ts| ts.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string());
        let _ = writeln!(
            out,
            "  {:<16} {:>4} Resources  {}  (last update: {})",
            ov.cluster,
            ov.counts.total,
            breakdown.join(", "),
            last.as_deref().unwrap_or("N/A"),
        );
    }
    let _ = writeln!(out);

    let cols = resource_columns(true);
    let header: Vec<String> = cols.iter().map(|c| format!("{:<w$}", c.label, w = c.width)).collect();
    let _ = writeln!(out, "{}", header.join(" ").trim_end());
    if view.page.rows.is_empty() {
        let _ = writeln!(out, "No results found.");
    }
    for r in &view.page.rows {
        let cells: Vec<String> = cols
            .iter()
            .map(|c| {
                let mut cell = render_cell(r, &c.kind, now);
                if cell.chars().count() > c.width {
                    cell = cell.chars().take(c.width.saturating_sub(1)).collect::<String>() + "…";
                }
                format!("{:<w$}", cell, w = c.width)
            })
            .collect();
        let _ = writeln!(out, "{}", cells.join(" ").trim_end());
    }
    let _ = write!(
        out,
        "{} total resources. Page {} of {}",
        view.page.total, view.page.page, view.page.total_pages
    );
    out
}

pub fn render_json(view: &View<'_>) -> serde_json::Result<String> {
    let v = serde_json::json!({
        "overview": view.overview,
        "facets": view.facets,
        "page": view.page.page,
        "totalPages": view.page.total_pages,
        "total": view.page.total,
        "rows": view.page.rows,
    });
    serde_json::to_string_pretty(&v)
}
