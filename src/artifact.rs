// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Local dashboard artifacts.
///
/// Dashboards are stored as `dashboard-<id>.json`, indented with four
/// spaces. The same files are produced by `pull`, by a failed migration, and
/// consumed by `push`.
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::warn;

use crate::{
    dashboard::RemoteDashboard,
    error::{self, Error},
};

/// File name of the artifact holding dashboard `id`.
pub fn artifact_file_name(id: &str,) -> String
{
    format!("dashboard-{id}.json")
}

/// Serializes a value as JSON indented with four spaces.
///
/// # Errors
///
/// Returns [`Error::Serialize`] when the value cannot be encoded.
pub fn to_indented_json<T,>(value: &T,) -> Result<String, Error,>
where
    T: Serialize + ?Sized,
{
    let mut buffer = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    ",),);
    value.serialize(&mut serializer,)?;
    // serde_json only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&buffer,).into_owned(),)
}

/// Writes `dashboard` to `<dir>/dashboard-<id>.json`, replacing any existing
/// file, and returns the path written.
///
/// # Errors
///
/// Returns [`Error::ArtifactIo`] when the file cannot be created or written,
/// and [`Error::Serialize`] when encoding fails. A partially written file is
/// removed before the error is returned.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use mkr_dashboards::{RemoteDashboard, write_dashboard_artifact};
///
/// # fn example() -> Result<(), mkr_dashboards::Error> {
/// let dashboard = RemoteDashboard {
///     id: "2c5bLca8d".to_owned(),
///     ..RemoteDashboard::default()
/// };
/// let path = write_dashboard_artifact(Path::new("."), "2c5bLca8d", &dashboard,)?;
/// println!("saved {}", path.display());
/// # Ok(())
/// # }
/// ```
pub fn write_dashboard_artifact(
    dir: &Path,
    id: &str,
    dashboard: &RemoteDashboard,
) -> Result<PathBuf, Error,>
{
    let path = dir.join(artifact_file_name(id,),);
    let content = to_indented_json(dashboard,)?;

    let file = fs::File::create(&path,).map_err(|source| error::artifact_io_error(&path, source,),)?;
    write_or_remove(&path, file, content.as_bytes(),)?;

    Ok(path,)
}

/// Writes `content` through `writer`, deleting the file at `path` if the
/// write does not complete.
fn write_or_remove<W,>(path: &Path, mut writer: W, content: &[u8],) -> Result<(), Error,>
where
    W: Write,
{
    let written = writer.write_all(content,).and_then(|()| writer.flush(),);
    drop(writer,);

    written.map_err(|source| {
        if let Err(remove_error,) = fs::remove_file(path,) {
            warn!(path = %path.display(), %remove_error, "failed to remove partial artifact");
        }
        error::artifact_io_error(path, source,)
    },)
}

/// Reads a dashboard from a JSON file.
///
/// # Errors
///
/// Returns [`Error::ArtifactIo`] when the file cannot be read and
/// [`Error::Serialize`] when it is not a dashboard document.
pub fn read_dashboard_artifact(path: &Path,) -> Result<RemoteDashboard, Error,>
{
    let content =
        fs::read_to_string(path,).map_err(|source| error::artifact_io_error(path, source,),)?;
    Ok(serde_json::from_str(&content,)?,)
}

#[cfg(test)]
mod tests
{
    use tempfile::tempdir;

    use super::*;
    use crate::dashboard::{Layout, MARKDOWN_WIDGET, Widget};

    fn sample() -> RemoteDashboard
    {
        RemoteDashboard {
            id: "2c5bLca8d".to_owned(),
            title: "Ops".to_owned(),
            url_path: "ops".to_owned(),
            widgets: vec![Widget {
                kind:     MARKDOWN_WIDGET.to_owned(),
                title:    String::new(),
                markdown: Some("# Title".to_owned(),),
                layout:   Layout {
                    x: 0, y: 0, width: 24, height: 24,
                },
                extra:    Default::default(),
            }],
            ..RemoteDashboard::default()
        }
    }

    #[test]
    fn file_name_embeds_id()
    {
        assert_eq!(artifact_file_name("abc"), "dashboard-abc.json");
    }

    #[test]
    fn indented_json_uses_four_spaces()
    {
        let json = to_indented_json(&serde_json::json!({"a": [1]}),).expect("serialization",);
        assert_eq!(json, "{\n    \"a\": [\n        1\n    ]\n}");
    }

    #[test]
    fn written_artifact_reads_back()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = write_dashboard_artifact(temp.path(), "2c5bLca8d", &sample(),)
            .expect("failed to write artifact",);

        assert_eq!(path, temp.path().join("dashboard-2c5bLca8d.json"));
        let content = fs::read_to_string(&path,).expect("failed to read artifact",);
        assert!(content.starts_with("{\n    \"id\": \"2c5bLca8d\""));

        let restored = read_dashboard_artifact(&path,).expect("failed to read artifact",);
        assert_eq!(restored, sample());
    }

    #[test]
    fn missing_directory_is_artifact_error()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let error = write_dashboard_artifact(&temp.path().join("missing",), "x", &sample(),)
            .expect_err("expected io error",);
        assert!(matches!(error, Error::ArtifactIo { .. }));
    }

    struct FailingWriter;

    impl Write for FailingWriter
    {
        fn write(&mut self, _buf: &[u8],) -> std::io::Result<usize,>
        {
            Err(std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full",),)
        }

        fn flush(&mut self,) -> std::io::Result<(),>
        {
            Ok((),)
        }
    }

    #[test]
    fn interrupted_write_removes_partial_file()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("dashboard-1.json",);
        fs::write(&path, "{\n    \"id\"",).expect("failed to write file",);

        let error = write_or_remove(&path, FailingWriter, b"{}",).expect_err("expected io error",);

        assert!(matches!(error, Error::ArtifactIo { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn invalid_json_is_serialize_error()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("broken.json",);
        fs::write(&path, "not json",).expect("failed to write file",);

        let error = read_dashboard_artifact(&path,).expect_err("expected decode error",);
        assert!(matches!(error, Error::Serialize { .. }));
    }
}
