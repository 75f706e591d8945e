//! Transformation logic that converts a raw dashboard configuration into a
//! validated, fully defaulted [`DashboardDocument`].
//!
//! Normalization never mutates the parsed configuration. It checks the
//! required fields in a fixed order so the first problem reported is
//! deterministic, then fills in defaults for sizes, periods and column
//! counts.

use std::{fs, path::Path};

use serde::Serialize;

use crate::{
    config::{GraphsConfig, GraphsEntry, HostGraphsEntry},
    error::{self, Error},
    graph::{DEFAULT_PERIOD, GraphSpec, RenderMode},
};

/// The only `config_version` understood by this release.
pub const SUPPORTED_CONFIG_VERSION: &str = "0.9";
/// Graph height in pixels when the configuration leaves it unset.
pub const DEFAULT_HEIGHT: u32 = 200;
/// Graph width in pixels when the configuration leaves it unset.
pub const DEFAULT_WIDTH: u32 = 400;
/// Columns of a free-form section when the configuration leaves it unset.
pub const DEFAULT_COLUMN_COUNT: usize = 1;

/// Validated dashboard description.
#[derive(Debug, Serialize, Clone, PartialEq, Eq,)]
pub struct DashboardDocument
{
    /// Dashboard title.
    pub title:       String,
    /// URL path identifying the dashboard on Mackerel.
    pub url_path:    String,
    /// Embedding format for every graph.
    pub render_mode: RenderMode,
    /// Graph height in pixels.
    pub height:      u32,
    /// Graph width in pixels.
    pub width:       u32,
    /// Sections in declaration order.
    pub sections:    Vec<SectionSpec,>,
}

/// One headline-grouped block of graphs.
#[derive(Debug, Serialize, Clone, PartialEq, Eq,)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionSpec
{
    /// Every graph name for every host; one row per host.
    HostGraphs
    {
        headline:    String,
        host_ids:    Vec<String,>,
        graph_names: Vec<String,>,
        period:      String,
    },
    /// Explicit graphs laid out in `column_count` columns.
    Graphs
    {
        headline:     String,
        column_count: usize,
        graphs:       Vec<GraphSpec,>,
    },
}

/// Loads and normalizes a dashboard configuration file.
///
/// # Errors
///
/// Returns an [`Error`] when the file cannot be read, the YAML cannot be
/// deserialized, or the configuration is incomplete.
pub fn load_config(path: &Path,) -> Result<DashboardDocument, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    parse_config(&contents,)
}

/// Parses and normalizes a dashboard configuration from a YAML string.
///
/// # Errors
///
/// Propagates [`Error::Parse`](Error::Parse) when the YAML cannot be decoded
/// and [`Error::Validation`](Error::Validation) when required entries are
/// missing or inconsistent.
pub fn parse_config(contents: &str,) -> Result<DashboardDocument, Error,>
{
    let config: GraphsConfig = serde_yaml::from_str(contents,)?;
    normalize_config(&config,)
}

/// Validates a raw configuration and applies defaults.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) when `config_version` is
/// missing or unsupported, `title` or `url_path` is missing, `format` is
/// unknown, both `host_graphs` and `graphs` are declared, or a graph
/// definition cannot be classified (see [`GraphSpec`]).
///
/// # Examples
///
/// ```
/// use mkr_dashboards::{GraphsConfig, normalize_config};
///
/// let config = GraphsConfig {
///     config_version: Some("0.9".to_owned(),),
///     title: Some("Web".to_owned(),),
///     url_path: Some("web".to_owned(),),
///     ..GraphsConfig::default()
/// };
/// let document = normalize_config(&config,).expect("valid configuration",);
/// assert_eq!((document.height, document.width), (200, 400));
/// ```
pub fn normalize_config(config: &GraphsConfig,) -> Result<DashboardDocument, Error,>
{
    let version = required(config.config_version.as_deref(), "config_version",)?;
    if version != SUPPORTED_CONFIG_VERSION {
        return Err(Error::validation(format!("config_version {version} is not supported"),),);
    }

    let title = required(config.title.as_deref(), "title",)?;
    let url_path = required(config.url_path.as_deref(), "url_path",)?;
    let render_mode = RenderMode::parse(config.format.as_deref().unwrap_or_default(),)?;

    if config.host_graphs.is_some() && config.graphs.is_some() {
        return Err(Error::validation("you cannot specify both 'graphs' and 'host_graphs'",),);
    }

    let sections = match (&config.host_graphs, &config.graphs,) {
        (Some(entries,), _,) => entries.iter().map(normalize_host_graphs,).collect(),
        (None, Some(entries,),) => entries.iter().map(normalize_graphs,).collect::<Result<_, _,>>()?,
        (None, None,) => Vec::new(),
    };

    Ok(DashboardDocument {
        title: title.to_owned(),
        url_path: url_path.to_owned(),
        render_mode,
        height: non_zero_or(config.height, DEFAULT_HEIGHT,),
        width: non_zero_or(config.width, DEFAULT_WIDTH,),
        sections,
    },)
}

fn required<'a,>(value: Option<&'a str,>, field: &str,) -> Result<&'a str, Error,>
{
    value
        .filter(|value| !value.is_empty(),)
        .ok_or_else(|| Error::validation(format!("{field} is required in yaml"),),)
}

fn non_zero_or(value: u32, default: u32,) -> u32
{
    if value == 0 { default } else { value }
}

fn normalize_host_graphs(entry: &HostGraphsEntry,) -> SectionSpec
{
    let period = if entry.period.is_empty() {
        DEFAULT_PERIOD.to_owned()
    } else {
        entry.period.clone()
    };

    SectionSpec::HostGraphs {
        headline: entry.headline.clone(),
        host_ids: entry.host_ids.clone(),
        graph_names: entry.graph_names.clone(),
        period,
    }
}

/// Classifies every definition of a free-form section. Per-graph periods
/// are defaulted by [`GraphSpec::try_from`].
fn normalize_graphs(entry: &GraphsEntry,) -> Result<SectionSpec, Error,>
{
    let column_count = match entry.column_count {
        0 => DEFAULT_COLUMN_COUNT,
        count => count as usize,
    };

    let graphs = entry.graph_def.iter().map(GraphSpec::try_from,).collect::<Result<Vec<_,>, _,>>()?;

    Ok(SectionSpec::Graphs {
        headline: entry.headline.clone(),
        column_count,
        graphs,
    },)
}
