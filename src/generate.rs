// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Dashboard assembly: turns a [`DashboardDocument`] into markdown and
//! submits it to Mackerel.
//!
//! Graph definitions are classified during normalization, so a document
//! that reaches this module cannot hold an invalid graph. Every section is
//! rendered before anything is submitted. Sections are independent and are
//! processed in parallel; the output keeps declaration order.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    client::DashboardClient,
    dashboard::RemoteDashboard,
    error::Error,
    graph::{GraphSpec, ResolvedGraph},
    normalizer::{DashboardDocument, SectionSpec},
    render::{MarkdownTable, alignment_row, host_graphs_header},
};

/// Result of [`generate_dashboard`].
#[derive(Debug, Clone, PartialEq,)]
pub enum GenerateOutcome
{
    /// Print mode: the markdown that would have been submitted.
    Printed(String,),
    /// No dashboard had the document's URL path.
    Created(RemoteDashboard,),
    /// The dashboard with the document's URL path was replaced.
    Updated(RemoteDashboard,),
}

/// Lays out every section of the document as a table.
pub fn build_tables(document: &DashboardDocument,) -> Vec<MarkdownTable,>
{
    document.sections.par_iter().map(|section| section_table(document, section,),).collect()
}

fn section_table(document: &DashboardDocument, section: &SectionSpec,) -> MarkdownTable
{
    match section {
        SectionSpec::HostGraphs {
            headline,
            host_ids,
            graph_names,
            period,
        } => {
            let graphs = host_ids
                .iter()
                .flat_map(|host_id| {
                    graph_names.iter().map(move |graph_name| {
                        place(
                            document,
                            GraphSpec::Host {
                                host_id:    host_id.clone(),
                                graph_name: graph_name.clone(),
                                period:     period.clone(),
                            },
                        )
                    },)
                },)
                .collect();

            MarkdownTable {
                headline: headline.clone(),
                header: host_graphs_header(graph_names,),
                graphs,
                column_count: graph_names.len(),
            }
        }
        SectionSpec::Graphs {
            headline,
            column_count,
            graphs,
        } => MarkdownTable {
            headline:     headline.clone(),
            header:       alignment_row(*column_count,),
            graphs:       graphs.iter().map(|graph| place(document, graph.clone(),),).collect(),
            column_count: *column_count,
        },
    }
}

fn place(document: &DashboardDocument, spec: GraphSpec,) -> ResolvedGraph
{
    ResolvedGraph::new(spec, document.render_mode, document.height, document.width,)
}

/// Renders the whole document as markdown for organization `org`.
///
/// # Errors
///
/// Returns an [`Error`] when a graph URL cannot be built. Which error is
/// reported is unspecified when several sections fail; nothing is returned
/// for the sections that did render.
pub fn render_document(document: &DashboardDocument, org: &str,) -> Result<String, Error,>
{
    render_tables(&build_tables(document,), org,)
}

fn render_tables(tables: &[MarkdownTable], org: &str,) -> Result<String, Error,>
{
    let fragments =
        tables.par_iter().map(|table| table.render(org,),).collect::<Result<Vec<_,>, _,>>()?;
    Ok(fragments.concat(),)
}

/// Returns the first dashboard whose URL path equals `url_path`.
pub fn find_by_url_path<'a,>(
    dashboards: &'a [RemoteDashboard],
    url_path: &str,
) -> Option<&'a RemoteDashboard,>
{
    dashboards.iter().find(|dashboard| dashboard.url_path == url_path,)
}

/// Renders the document and, unless `print` is set, creates or updates the
/// dashboard sharing its URL path.
///
/// The organization name is fetched first because graph URLs embed it.
///
/// # Errors
///
/// Returns [`Error::Validation`] when a graph URL cannot be built and
/// [`Error::Service`] when an API call fails.
pub async fn generate_dashboard(
    client: &dyn DashboardClient,
    document: &DashboardDocument,
    print: bool,
) -> Result<GenerateOutcome, Error,>
{
    let tables = build_tables(document,);

    let org = client.get_org().await?;
    debug!(org = %org.name, sections = tables.len(), "rendering dashboard");
    let markdown = render_tables(&tables, &org.name,)?;

    if print {
        return Ok(GenerateOutcome::Printed(markdown,),);
    }

    let payload = RemoteDashboard {
        title: document.title.clone(),
        body_markdown: markdown,
        url_path: document.url_path.clone(),
        ..RemoteDashboard::default()
    };

    let dashboards = client.find_dashboards().await?;
    match find_by_url_path(&dashboards, &document.url_path,) {
        Some(existing,) => {
            info!(id = %existing.id, url_path = %document.url_path, "updating dashboard");
            let updated = client.update_dashboard(&existing.id, &payload,).await?;
            Ok(GenerateOutcome::Updated(updated,),)
        }
        None => {
            info!(url_path = %document.url_path, "creating dashboard");
            let created = client.create_dashboard(&payload,).await?;
            Ok(GenerateOutcome::Created(created,),)
        }
    }
}
