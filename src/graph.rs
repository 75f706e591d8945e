// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Graph descriptors and their resolution from raw configuration entries.
//!
//! A [`GraphDefinition`] does not say which kind of graph it denotes; the
//! kind is inferred from the fields that are set. The inference order is
//! part of the configuration format: host, then service, then role, then
//! expression.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{config::GraphDefinition, error::Error};

/// Period applied when a graph or section does not declare one.
pub const DEFAULT_PERIOD: &str = "1h";

/// How graphs are embedded into the dashboard markdown.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Default,)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode
{
    /// `<iframe>` tag pointing at the interactive embed.
    #[default]
    Iframe,
    /// Markdown image linking to the graph permalink.
    Image,
}

impl RenderMode
{
    /// Parses the `format` configuration value. An empty value selects
    /// [`RenderMode::Iframe`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for anything other than `iframe`,
    /// `image` or an empty string.
    pub fn parse(value: &str,) -> Result<Self, Error,>
    {
        match value {
            "" | "iframe" => Ok(Self::Iframe,),
            "image" => Ok(Self::Image,),
            _ => Err(Error::validation("format should be 'iframe' or 'image'",),),
        }
    }
}

impl fmt::Display for RenderMode
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        match self {
            Self::Iframe => f.write_str("iframe",),
            Self::Image => f.write_str("image",),
        }
    }
}

/// A graph hosted by Mackerel, scoped to a host, a service, a role, or an
/// expression.
#[derive(Debug, Serialize, Clone, PartialEq, Eq, Hash,)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphSpec
{
    /// Graph of a single host.
    Host
    {
        host_id: String, graph_name: String, period: String,
    },
    /// Graph of a whole service.
    Service
    {
        service_name: String, graph_name: String, period: String,
    },
    /// Graph of a role within a service.
    Role
    {
        service_name: String,
        role_name:    String,
        graph_name:   String,
        period:       String,
        stacked:      bool,
        simplified:   bool,
    },
    /// Advanced graph driven by a query expression.
    Expression
    {
        query: String, title: String, unit: String, period: String,
    },
}

impl GraphSpec
{
    /// Short name of the graph kind, used in diagnostics.
    pub fn kind(&self,) -> &'static str
    {
        match self {
            Self::Host {
                ..
            } => "host",
            Self::Service {
                ..
            } => "service",
            Self::Role {
                ..
            } => "role",
            Self::Expression {
                ..
            } => "expression",
        }
    }

    /// Period the graph covers.
    pub fn period(&self,) -> &str
    {
        match self {
            Self::Host {
                period, ..
            }
            | Self::Service {
                period, ..
            }
            | Self::Role {
                period, ..
            }
            | Self::Expression {
                period, ..
            } => period,
        }
    }
}

impl TryFrom<&GraphDefinition,> for GraphSpec
{
    type Error = Error;

    /// Infers the graph kind from the populated fields.
    ///
    /// An empty period is replaced with [`DEFAULT_PERIOD`].
    fn try_from(definition: &GraphDefinition,) -> Result<Self, Self::Error,>
    {
        let period = if definition.period.is_empty() {
            DEFAULT_PERIOD.to_owned()
        } else {
            definition.period.clone()
        };

        if !definition.host_id.is_empty() {
            return Ok(Self::Host {
                host_id: definition.host_id.clone(),
                graph_name: required_graph_name(definition, "host",)?,
                period,
            },);
        }

        if !definition.service_name.is_empty() && definition.role_name.is_empty() {
            return Ok(Self::Service {
                service_name: definition.service_name.clone(),
                graph_name: required_graph_name(definition, "service",)?,
                period,
            },);
        }

        if !definition.service_name.is_empty() && !definition.role_name.is_empty() {
            return Ok(Self::Role {
                service_name: definition.service_name.clone(),
                role_name: definition.role_name.clone(),
                graph_name: required_graph_name(definition, "role",)?,
                period,
                stacked: definition.stacked,
                simplified: definition.simplified,
            },);
        }

        if !definition.query.is_empty() {
            return Ok(Self::Expression {
                query: definition.query.clone(),
                title: definition.title.clone(),
                unit: definition.unit.clone(),
                period,
            },);
        }

        Err(Error::validation("either host_id, service_name or query should be specified",),)
    }
}

fn required_graph_name(definition: &GraphDefinition, kind: &str,) -> Result<String, Error,>
{
    if definition.graph_name.is_empty() {
        return Err(Error::validation(format!("graph_name is required for {kind} graph"),),);
    }
    Ok(definition.graph_name.clone(),)
}

/// A graph together with the context needed to render it.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ResolvedGraph
{
    spec:   GraphSpec,
    mode:   RenderMode,
    height: u32,
    width:  u32,
}

impl ResolvedGraph
{
    /// Wraps an already classified graph.
    pub fn new(spec: GraphSpec, mode: RenderMode, height: u32, width: u32,) -> Self
    {
        Self {
            spec,
            mode,
            height,
            width,
        }
    }

    pub fn spec(&self,) -> &GraphSpec
    {
        &self.spec
    }

    pub fn mode(&self,) -> RenderMode
    {
        self.mode
    }

    pub fn height(&self,) -> u32
    {
        self.height
    }

    pub fn width(&self,) -> u32
    {
        self.width
    }
}

/// Resolves a raw graph definition into a renderable graph.
///
/// # Errors
///
/// Returns [`Error::Validation`] when a host, service or role graph has no
/// `graph_name`, or when none of `host_id`, `service_name` and `query` is
/// set.
///
/// # Examples
///
/// ```
/// use mkr_dashboards::{GraphDefinition, GraphSpec, RenderMode, resolve};
///
/// let definition = GraphDefinition {
///     host_id: "2u4PP3TJqbu".to_owned(),
///     graph_name: "loadavg".to_owned(),
///     ..GraphDefinition::default()
/// };
/// let graph = resolve(&definition, RenderMode::Image, 200, 400,).expect("valid graph",);
/// assert_eq!(graph.spec().kind(), "host");
/// assert_eq!(graph.spec().period(), "1h");
/// ```
pub fn resolve(
    definition: &GraphDefinition,
    mode: RenderMode,
    height: u32,
    width: u32,
) -> Result<ResolvedGraph, Error,>
{
    let spec = GraphSpec::try_from(definition,)?;
    Ok(ResolvedGraph::new(spec, mode, height, width,),)
}
