// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Migration of legacy dashboards to widget dashboards.
//!
//! Mackerel cannot convert a legacy dashboard in place, so the legacy
//! dashboard is deleted first and its replacement is created afterwards. If
//! the creation fails the replacement is saved locally so it can be pushed
//! by hand; the deleted dashboard is not restored.

use std::{
    io::{self, Write},
    path::Path,
};

use tracing::{error, info, warn};

use crate::{
    artifact::{artifact_file_name, to_indented_json, write_dashboard_artifact},
    client::DashboardClient,
    dashboard::{Layout, MARKDOWN_WIDGET, RemoteDashboard, Widget},
    error::Error,
};

/// Grid placement of the single markdown widget of a migrated dashboard.
pub const MIGRATED_LAYOUT: Layout = Layout {
    x: 0, y: 0, width: 24, height: 24,
};

/// Builds the widget dashboard replacing `legacy`.
///
/// Title, memo and URL path are kept; the markdown body moves into one
/// markdown widget covering [`MIGRATED_LAYOUT`].
///
/// # Examples
///
/// ```
/// use mkr_dashboards::{RemoteDashboard, migrate_dashboard};
///
/// let legacy = RemoteDashboard {
///     body_markdown: "# Title".to_owned(),
///     is_legacy: true,
///     ..RemoteDashboard::default()
/// };
/// let current = migrate_dashboard(&legacy,);
/// assert!(!current.is_legacy);
/// assert_eq!(current.widgets[0].markdown.as_deref(), Some("# Title"));
/// ```
pub fn migrate_dashboard(legacy: &RemoteDashboard,) -> RemoteDashboard
{
    RemoteDashboard {
        title: legacy.title.clone(),
        memo: legacy.memo.clone(),
        url_path: legacy.url_path.clone(),
        is_legacy: false,
        widgets: vec![Widget {
            kind:     MARKDOWN_WIDGET.to_owned(),
            title:    String::new(),
            markdown: Some(legacy.body_markdown.clone(),),
            layout:   MIGRATED_LAYOUT,
            extra:    Default::default(),
        }],
        ..RemoteDashboard::default()
    }
}

/// Replaces legacy dashboard `id` with its widget equivalent.
///
/// When the replacement cannot be created, it is written to
/// `<artifact_dir>/dashboard-<id>.json`, or to `fallback` when that file
/// cannot be written, and [`Error::MigrationFailed`] is returned.
///
/// # Errors
///
/// Returns [`Error::Validation`] when `id` is empty or the dashboard is not
/// a legacy one, [`Error::Service`] when fetching or deleting fails, and
/// [`Error::MigrationFailed`] when creating the replacement fails.
pub async fn run_migration<W,>(
    client: &dyn DashboardClient,
    id: &str,
    artifact_dir: &Path,
    fallback: &mut W,
) -> Result<RemoteDashboard, Error,>
where
    W: Write,
{
    if id.is_empty() {
        return Err(Error::validation("--id is required",),);
    }

    let legacy = client.find_dashboard(id,).await?;
    if !legacy.is_legacy {
        return Err(Error::validation(format!("dashboard {id} is not a legacy dashboard"),),);
    }

    info!("Deleting legacy dashboard {id}");
    client.delete_dashboard(id,).await?;

    let current = migrate_dashboard(&legacy,);
    info!("Creating new dashboard {id}");
    let create_error = match client.create_dashboard(&current,).await {
        Ok(created,) => return Ok(created,),
        Err(error,) => error,
    };

    error!("Failed to create a new dashboard. {create_error}");
    let artifact = save_for_retry(artifact_dir, id, &current, fallback,)?;
    Err(Error::MigrationFailed {
        id: id.to_owned(),
        artifact,
    },)
}

/// Persists the migrated document and returns where it went (`-` for the
/// fallback writer).
fn save_for_retry<W,>(
    artifact_dir: &Path,
    id: &str,
    current: &RemoteDashboard,
    fallback: &mut W,
) -> Result<String, Error,>
where
    W: Write,
{
    let file_name = artifact_file_name(id,);
    warn!("A new dashboard JSON saving to {file_name}");

    match write_dashboard_artifact(artifact_dir, id, current,) {
        Ok(path,) => {
            let shown = path.display().to_string();
            warn!("Please try later. > dashboards push --file-path {shown}");
            Ok(shown,)
        }
        Err(Error::ArtifactIo {
            source, ..
        },) => {
            warn!("Failed to create a new file. {source}");
            warn!("Dump to STDOUT");
            let content = to_indented_json(current,)?;
            if let Err(write_error,) = writeln!(fallback, "{content}") {
                warn!("Failed to write to STDOUT. {write_error}");
                warn!("{content}");
            }
            Ok("-".to_owned(),)
        }
        Err(other,) => Err(other,),
    }
}

/// Convenience wrapper writing the fallback to standard output.
///
/// # Errors
///
/// See [`run_migration`].
pub async fn run_migration_to_stdout(
    client: &dyn DashboardClient,
    id: &str,
    artifact_dir: &Path,
) -> Result<RemoteDashboard, Error,>
{
    let mut buffer = Vec::new();
    let result = run_migration(client, id, artifact_dir, &mut buffer,).await;
    if !buffer.is_empty() {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if let Err(error,) = handle.write_all(&buffer,) {
            warn!("Failed to write to STDOUT. {error}");
        }
    }
    result
}

#[cfg(test)]
mod tests
{
    use tempfile::tempdir;

    use super::*;
    use crate::{
        artifact::read_dashboard_artifact,
        client::testing::{Call, FakeClient},
    };

    fn legacy(id: &str,) -> RemoteDashboard
    {
        RemoteDashboard {
            id: id.to_owned(),
            title: "Ops".to_owned(),
            body_markdown: "# Title".to_owned(),
            url_path: "ops".to_owned(),
            memo: "notes".to_owned(),
            is_legacy: true,
            ..RemoteDashboard::default()
        }
    }

    #[test]
    fn legacy_body_moves_into_single_markdown_widget()
    {
        let current = migrate_dashboard(&legacy("1",),);

        assert_eq!(current.widgets.len(), 1);
        let widget = &current.widgets[0];
        assert_eq!(widget.kind, "markdown");
        assert_eq!(widget.title, "");
        assert_eq!(widget.markdown.as_deref(), Some("# Title"));
        assert_eq!(widget.layout, Layout { x: 0, y: 0, width: 24, height: 24 });

        assert!(current.id.is_empty());
        assert!(current.body_markdown.is_empty());
        assert!(!current.is_legacy);
        assert_eq!((current.title.as_str(), current.memo.as_str(), current.url_path.as_str()), ("Ops", "notes", "ops"));
    }

    #[tokio::test]
    async fn successful_migration_deletes_then_creates()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let client = FakeClient::with_dashboards(vec![legacy("1",)],);
        let mut fallback = Vec::new();

        run_migration(&client, "1", temp.path(), &mut fallback,).await.expect("migration",);

        match &client.calls()[..] {
            [Call::Delete(id,), Call::Create(payload,)] => {
                assert_eq!(id, "1");
                assert_eq!(payload, &migrate_dashboard(&legacy("1",),));
            }
            other => panic!("unexpected calls: {other:?}"),
        }
        assert!(fallback.is_empty());
    }

    #[tokio::test]
    async fn non_legacy_dashboard_is_left_alone()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let current = RemoteDashboard {
            is_legacy: false, ..legacy("1",)
        };
        let client = FakeClient::with_dashboards(vec![current],);

        let error = run_migration(&client, "1", temp.path(), &mut Vec::new(),)
            .await
            .expect_err("expected validation error",);

        assert!(matches!(error, Error::Validation { .. }));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_id_is_rejected()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let client = FakeClient::default();
        let error = run_migration(&client, "", temp.path(), &mut Vec::new(),)
            .await
            .expect_err("expected validation error",);
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn failed_create_saves_artifact()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let client = FakeClient {
            fail_create: true, ..FakeClient::with_dashboards(vec![legacy("1",)],)
        };
        let mut fallback = Vec::new();

        let error = run_migration(&client, "1", temp.path(), &mut fallback,)
            .await
            .expect_err("expected migration failure",);

        let path = temp.path().join("dashboard-1.json",);
        match error {
            Error::MigrationFailed {
                id,
                artifact,
            } => {
                assert_eq!(id, "1");
                assert_eq!(artifact, path.display().to_string());
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
        assert_eq!(read_dashboard_artifact(&path).expect("artifact"), migrate_dashboard(&legacy("1")));
        assert!(fallback.is_empty());
        assert!(matches!(&client.calls()[..], [Call::Delete(_)]));
    }

    #[tokio::test]
    async fn failed_delete_stops_before_create()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let client = FakeClient {
            fail_delete: true, ..FakeClient::with_dashboards(vec![legacy("1",)],)
        };
        let mut fallback = Vec::new();

        let error = run_migration(&client, "1", temp.path(), &mut fallback,)
            .await
            .expect_err("expected delete failure",);

        assert!(matches!(error, Error::Service { .. }));
        assert!(client.calls().is_empty());
        assert!(fallback.is_empty());
        assert!(!temp.path().join("dashboard-1.json").exists());
    }

    #[tokio::test]
    async fn unwritable_artifact_falls_back_to_writer()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let client = FakeClient {
            fail_create: true, ..FakeClient::with_dashboards(vec![legacy("1",)],)
        };
        let mut fallback = Vec::new();

        let error = run_migration(&client, "1", &temp.path().join("missing",), &mut fallback,)
            .await
            .expect_err("expected migration failure",);

        assert!(matches!(error, Error::MigrationFailed { ref artifact, .. } if artifact == "-"));
        let dumped = String::from_utf8(fallback,).expect("utf8",);
        let restored: RemoteDashboard = serde_json::from_str(&dumped,).expect("valid dashboard json",);
        assert_eq!(restored.widgets[0].markdown.as_deref(), Some("# Title"));
    }
}
