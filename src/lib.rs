//! Utilities for building and managing Mackerel custom dashboards.
//!
//! The library loads YAML documents describing graphs, resolves each graph
//! definition into embeddable URLs, renders the result as markdown tables,
//! and exchanges dashboards with the Mackerel API through the
//! [`DashboardClient`] trait. Everything up to rendering is pure; network
//! access is confined to the client.

mod artifact;
mod client;
mod config;
mod dashboard;
mod error;
mod generate;
mod graph;
mod link;
mod migrate;
mod normalizer;
mod render;
mod retry;
mod sync;

pub use artifact::{
    artifact_file_name, read_dashboard_artifact, to_indented_json, write_dashboard_artifact,
};
pub use client::{ClientConfig, DEFAULT_API_BASE, DashboardClient, MackerelClient};
pub use config::{GraphDefinition, GraphsConfig, GraphsEntry, HostGraphsEntry};
pub use dashboard::{DashboardList, Layout, MARKDOWN_WIDGET, Organization, RemoteDashboard, Widget};
pub use error::{Error, artifact_io_error, io_error};
pub use generate::{
    GenerateOutcome, build_tables, find_by_url_path, generate_dashboard, render_document,
};
pub use graph::{DEFAULT_PERIOD, GraphSpec, RenderMode, ResolvedGraph, resolve};
pub use link::{SERVICE_ORIGIN, embed_url, permalink};
pub use migrate::{MIGRATED_LAYOUT, migrate_dashboard, run_migration, run_migration_to_stdout};
pub use normalizer::{
    DEFAULT_COLUMN_COUNT, DEFAULT_HEIGHT, DEFAULT_WIDTH, DashboardDocument, SUPPORTED_CONFIG_VERSION,
    SectionSpec, load_config, normalize_config, parse_config,
};
pub use render::{MarkdownTable, alignment_row, host_graphs_header, render_cell};
pub use retry::{RetryConfig, retry_with_backoff, retry_with_backoff_if};
pub use sync::{list_dashboards, pull_dashboards, push_dashboard};
