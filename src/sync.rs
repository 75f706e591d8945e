// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Copies dashboards between Mackerel and local JSON artifacts.
///
/// `pull` saves every remote dashboard as `dashboard-<id>.json`; `push`
/// sends one such file back, updating the dashboard named by its `id` or
/// creating a new one when the file has none.
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::{
    artifact::{read_dashboard_artifact, to_indented_json, write_dashboard_artifact},
    client::DashboardClient,
    dashboard::RemoteDashboard,
    error::Error,
};

/// Lists every dashboard as indented JSON.
///
/// # Errors
///
/// Returns [`Error::Service`] when the API call fails.
pub async fn list_dashboards(client: &dyn DashboardClient,) -> Result<String, Error,>
{
    let dashboards = client.find_dashboards().await?;
    to_indented_json(&dashboards,)
}

/// Saves every remote dashboard into `output_dir`, one file each, and
/// returns the written paths in listing order.
///
/// # Errors
///
/// Returns [`Error::Service`] when fetching fails and [`Error::ArtifactIo`]
/// when a file cannot be written. Files written before the failure are kept.
pub async fn pull_dashboards(
    client: &dyn DashboardClient,
    output_dir: &Path,
) -> Result<Vec<PathBuf,>, Error,>
{
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style(),);

    pb.set_message("Listing dashboards...",);
    let summaries = client.find_dashboards().await?;
    debug!(count = summaries.len(), "found dashboards");

    let mut written = Vec::with_capacity(summaries.len(),);
    for (index, summary,) in summaries.iter().enumerate() {
        pb.set_message(format!(
            "Pulling dashboard {}/{} ({})...",
            index + 1,
            summaries.len(),
            summary.id
        ),);

        let dashboard = client.find_dashboard(&summary.id,).await?;
        let path = write_dashboard_artifact(output_dir, &summary.id, &dashboard,)?;
        info!("Dashboard file is saved to '{}'(title:{})", path.display(), summary.title);
        written.push(path,);
    }

    pb.finish_and_clear();
    Ok(written,)
}

/// Pushes the dashboard stored at `path`.
///
/// A file with an `id` updates that dashboard, which must already exist.
/// A file without one creates a new dashboard.
///
/// # Errors
///
/// Returns [`Error::ArtifactIo`] or [`Error::Serialize`] when the file
/// cannot be read, and [`Error::Service`] when the dashboard does not exist
/// or the API rejects the request.
pub async fn push_dashboard(
    client: &dyn DashboardClient,
    path: &Path,
) -> Result<RemoteDashboard, Error,>
{
    let dashboard = read_dashboard_artifact(path,)?;

    if dashboard.id.is_empty() {
        info!(file = %path.display(), "creating dashboard");
        return Ok(client.create_dashboard(&dashboard,).await?,);
    }

    client.find_dashboard(&dashboard.id,).await?;
    info!(id = %dashboard.id, file = %path.display(), "updating dashboard");
    Ok(client.update_dashboard(&dashboard.id, &dashboard,).await?,)
}

fn spinner_style() -> ProgressStyle
{
    ProgressStyle::default_spinner()
        .template("{spinner:.yellow} [{elapsed_precise}] {msg}",)
        .unwrap_or_else(|_| ProgressStyle::default_spinner(),)
}
