// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Markdown rendering for dashboard sections.
///
/// Each section becomes a markdown table whose cells are either `<iframe>`
/// tags or image links, depending on the [`RenderMode`] of the graphs.
use crate::{
    error::Error,
    graph::{RenderMode, ResolvedGraph},
    link::{embed_url, permalink},
};

/// One section of the dashboard, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct MarkdownTable
{
    /// Heading emitted as `## headline`, skipped when empty.
    pub headline:     String,
    /// Header rows emitted verbatim before the cells.
    pub header:       String,
    /// Cells in row-major order.
    pub graphs:       Vec<ResolvedGraph,>,
    /// Cells per row.
    pub column_count: usize,
}

impl MarkdownTable
{
    /// Renders the table for the given organization.
    ///
    /// A row is closed after every `column_count` cells and after the last
    /// cell, so a final row with fewer cells is still closed.
    ///
    /// # Errors
    ///
    /// Propagates URL construction failures from [`embed_url`] and
    /// [`permalink`].
    pub fn render(&self, org: &str,) -> Result<String, Error,>
    {
        let mut markdown = String::new();
        if !self.headline.is_empty() {
            markdown.push_str(&format!("## {}\n", self.headline),);
        }

        markdown.push_str(&self.header,);

        let columns = self.column_count.max(1,);
        let last = self.graphs.len().saturating_sub(1,);
        for (index, graph,) in self.graphs.iter().enumerate() {
            markdown.push('|',);
            markdown.push_str(&render_cell(graph, org,)?,);
            if index % columns == columns - 1 || index == last {
                markdown.push_str("|\n",);
            }
        }

        Ok(markdown,)
    }
}

/// Renders one graph as a table cell according to its render mode.
///
/// # Errors
///
/// Propagates URL construction failures.
pub fn render_cell(graph: &ResolvedGraph, org: &str,) -> Result<String, Error,>
{
    match graph.mode() {
        RenderMode::Iframe => Ok(format!(
            r#"<iframe src="{}" height="{}" width="{}" frameborder="0"></iframe>"#,
            embed_url(graph.spec(), org, false,)?,
            graph.height(),
            graph.width()
        ),),
        RenderMode::Image => Ok(format!(
            "[![graph]({})]({})",
            embed_url(graph.spec(), org, true,)?,
            permalink(graph.spec(), org,)?
        ),),
    }
}

/// Header for host-graph sections: one labelled column per graph name
/// followed by the alignment row.
pub fn host_graphs_header(graph_names: &[String],) -> String
{
    let mut header: String = graph_names.iter().map(|name| format!("|{name}"),).collect();
    header.push_str("|\n",);
    header.push_str(&alignment_row(graph_names.len(),),);
    header
}

/// Markdown alignment row centering `count` columns.
pub fn alignment_row(count: usize,) -> String
{
    format!("{}|\n", "|:-:".repeat(count,))
}
