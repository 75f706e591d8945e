//! Configuration document types describing custom dashboards.
//!
//! The types in this module mirror the structure of the YAML documents
//! consumed by `dashboards generate`. Every field is optional at this level;
//! required values and defaults are enforced later by
//! [`normalize_config`](crate::normalize_config), which produces a fully
//! populated [`DashboardDocument`](crate::DashboardDocument).

use serde::{Deserialize, Serialize};

/// Root configuration document describing one dashboard.
///
/// `host_graphs` and `graphs` are kept as [`Option`] so that a key present
/// with an empty list can be told apart from an absent key; declaring both
/// is rejected during normalization.
///
/// # Examples
///
/// ```
/// use mkr_dashboards::GraphsConfig;
///
/// let yaml = r#"
/// config_version: "0.9"
/// title: Web servers
/// url_path: web
/// host_graphs:
///   - headline: CPU
///     host_ids: [abc123]
///     graph_names: [cpu]
/// "#;
/// let config: GraphsConfig = serde_yaml::from_str(yaml,).expect("valid configuration",);
/// assert_eq!(config.host_graphs.map(|sections| sections.len()), Some(1));
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, Default,)]
pub struct GraphsConfig
{
    /// Schema version of the document.
    #[serde(default)]
    pub config_version: Option<String,>,

    /// Dashboard title shown by Mackerel.
    #[serde(default)]
    pub title: Option<String,>,

    /// URL path of the dashboard, used to find an existing dashboard to
    /// update.
    #[serde(default)]
    pub url_path: Option<String,>,

    /// Embedding format, either `iframe` or `image`.
    #[serde(default)]
    pub format: Option<String,>,

    /// Graph height in pixels.
    #[serde(default)]
    pub height: u32,

    /// Graph width in pixels.
    #[serde(default)]
    pub width: u32,

    /// Sections rendering the same graphs for a list of hosts.
    #[serde(default)]
    pub host_graphs: Option<Vec<HostGraphsEntry,>,>,

    /// Sections listing arbitrary graph definitions.
    #[serde(default)]
    pub graphs: Option<Vec<GraphsEntry,>,>,
}

/// Section rendering every graph name for every listed host.
#[derive(Debug, Deserialize, Serialize, Clone, Default,)]
pub struct HostGraphsEntry
{
    /// Optional heading rendered above the table.
    #[serde(default)]
    pub headline: String,

    /// Hosts, one table row each.
    #[serde(default)]
    pub host_ids: Vec<String,>,

    /// Graph names, one table column each.
    #[serde(default)]
    pub graph_names: Vec<String,>,

    /// Period shared by all graphs of the section.
    #[serde(default)]
    pub period: String,
}

/// Section laying out explicit graph definitions in a fixed number of
/// columns.
#[derive(Debug, Deserialize, Serialize, Clone, Default,)]
pub struct GraphsEntry
{
    /// Optional heading rendered above the table.
    #[serde(default)]
    pub headline: String,

    /// Number of columns, `0` meaning one.
    #[serde(default)]
    pub column_count: u32,

    /// Graphs in display order.
    #[serde(default)]
    pub graph_def: Vec<GraphDefinition,>,
}

/// Raw graph definition. Which kind of graph it denotes is inferred from the
/// fields that are set, see [`resolve`](crate::resolve).
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq,)]
pub struct GraphDefinition
{
    #[serde(default)]
    pub host_id: String,

    #[serde(default)]
    pub service_name: String,

    #[serde(default)]
    pub role_name: String,

    /// Graph expression for advanced graphs.
    #[serde(default)]
    pub query: String,

    #[serde(default)]
    pub graph_name: String,

    /// Title of an expression graph.
    #[serde(default)]
    pub title: String,

    /// Unit of an expression graph.
    #[serde(default)]
    pub unit: String,

    #[serde(default)]
    pub period: String,

    /// Stack role graph series.
    #[serde(default)]
    pub stacked: bool,

    /// Render role graphs in simplified form.
    #[serde(default)]
    pub simplified: bool,
}
