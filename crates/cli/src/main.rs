use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use fluxradar_core::Field;
use fluxradar_server::{ServerConfig, DEFAULT_MAX_BODY_BYTES};
use fluxradar_store::{demo, Notifier, Registry};
use fluxradar_view::{choice, Direction, Filter, PageSize, SortConfig, ViewState, PAGE_SIZES};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod viewer;

#[derive(Parser, Debug)]
#[command(name = "fluxradar", version, about = "Multi-cluster GitOps resource dashboard")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the ingestion, read and live-update endpoints
    Serve {
        /// Listen address
        #[arg(long, env = "FLUXRADAR_ADDR", default_value = "0.0.0.0:8443")]
        addr: SocketAddr,
        /// Start with a demonstration dataset
        #[arg(long = "seed-demo", env = "FLUXRADAR_SEED_DEMO", action = ArgAction::SetTrue)]
        seed_demo: bool,
        /// Maximum accepted request body size
        #[arg(long = "max-body-bytes", env = "FLUXRADAR_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
        max_body_bytes: usize,
    },
    /// Follow a running server and render the dashboard in the terminal
    Watch {
        /// Server base URL, e.g. "http://localhost:8443" or "http://host/api"
        #[arg(long, env = "FLUXRADAR_URL", default_value = "http://127.0.0.1:8443")]
        url: String,
        /// Fetch and render once, then exit
        #[arg(long, action = ArgAction::SetTrue)]
        once: bool,
        #[arg(long, default_value = "all")]
        cluster: String,
        /// Resource type: flux | k8s
        #[arg(long = "type", default_value = "all")]
        resource_type: String,
        #[arg(long, default_value = "all")]
        status: String,
        #[arg(long, default_value = "all")]
        namespace: String,
        #[arg(long, default_value = "all")]
        kind: String,
        /// Case-insensitive substring of the resource name
        #[arg(long, default_value = "")]
        search: String,
        /// Sort key, e.g. name, namespace, status, kind, cluster
        #[arg(long, default_value = "name", value_parser = parse_field)]
        sort: Field,
        #[arg(long, action = ArgAction::SetTrue)]
        desc: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long = "page-size", default_value = "10", value_parser = parse_page_size)]
        page_size: PageSize,
    },
}

fn parse_field(s: &str) -> Result<Field, String> {
    Field::from_key(s).ok_or_else(|| {
        let keys: Vec<&str> = Field::ALL.iter().map(|f| f.key()).collect();
        format!("unknown field {s:?}; expected one of {}", keys.join(", "))
    })
}

fn parse_page_size(s: &str) -> Result<PageSize, String> {
    let n: usize = s.parse().map_err(|e| format!("{e}"))?;
    PageSize::new(n).ok_or_else(|| format!("page size must be one of {PAGE_SIZES:?}"))
}

const DEFAULT_LOG_FILTER: &str = "info";

/// Directives from `FLUXRADAR_LOG`, or the default when unset or unparsable.
fn log_filter(spec: Option<&str>) -> EnvFilter {
    spec.and_then(|s| EnvFilter::from_str(s).ok()).unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn init_tracing() {
    let spec = std::env::var("FLUXRADAR_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(spec.as_deref()))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    if let Some(bad) = spec.as_deref().filter(|s| EnvFilter::from_str(s).is_err()) {
        warn!(filter = bad, default = DEFAULT_LOG_FILTER, "ignoring unparsable FLUXRADAR_LOG");
    }
}

/// Scrape listener for registry and ingest metrics, from `FLUXRADAR_METRICS_ADDR`.
fn metrics_listener(raw: &str) -> Option<SocketAddr> { raw.trim().parse().ok() }

fn init_metrics() {
    let Ok(raw) = std::env::var("FLUXRADAR_METRICS_ADDR") else { return };
    let Some(sock) = metrics_listener(&raw) else {
        warn!(addr = %raw, "invalid FLUXRADAR_METRICS_ADDR; expected host:port, metrics disabled");
        return;
    };
    match metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(sock).install() {
        Ok(()) => info!(addr = %sock, "serving registry metrics for Prometheus"),
        Err(e) => warn!(error = %e, "failed to install metrics exporter; metrics disabled"),
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { addr, seed_demo, max_body_bytes } => {
            let notifier = Notifier::new();
            let registry = if seed_demo {
                let items = demo::demo_resources();
                info!(resources = items.len(), "seeding demonstration data");
                Registry::with_items(notifier, items)
            } else {
                Registry::new(notifier)
            };
            let config = ServerConfig { addr, max_body_bytes };
            if let Err(e) = fluxradar_server::serve(Arc::new(registry), config).await {
                error!(error = %e, "server failed");
                return Err(e.into());
            }
        }
        Commands::Watch { url, once, cluster, resource_type, status, namespace, kind, search, sort, desc, page, page_size } => {
            let mut state = ViewState::default();
            state.set_filter(Filter {
                cluster: choice(&cluster),
                resource_type: choice(&resource_type),
                status: choice(&status),
                namespace: choice(&namespace),
                kind: choice(&kind),
                search,
            });
            state.set_sort(SortConfig {
                key: Some(sort),
                direction: if desc { Direction::Descending } else { Direction::Ascending },
            });
            state.set_page_size(page_size);
            state.go_to(page);

            let mut viewer = viewer::Viewer::new(&url, state, cli.output);
            if once {
                viewer.once()?;
                return Ok(());
            }
            info!(url = %url, "watching");
            let task = tokio::task::spawn_blocking(move || viewer.follow());
            tokio::select! {
                res = task => res.map_err(|e| anyhow!("viewer task failed: {e}"))?,
                _ = tokio::signal::ctrl_c() => info!("interrupted"),
            }
        }
    }
    Ok(())
}
