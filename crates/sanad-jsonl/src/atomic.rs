//! Atomic write operations for JSONL files.
//!
//! Data is written to `<file>.tmp`, flushed, then renamed over the target.
//! Renames within one filesystem are atomic on POSIX, so a crash mid-write
//! leaves the previous snapshot intact.

use crate::{JsonlWriter, Result};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// Atomically writes a slice of values to a JSONL file.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written, a
/// value fails to serialize, or the final rename fails. On failure the
/// original file is left unchanged.
pub async fn write_jsonl_atomic<T, P>(path: P, values: &[T]) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_jsonl_atomic_iter(path, values.iter()).await
}

/// Atomically writes an iterator of values to a JSONL file.
///
/// # Errors
///
/// See [`write_jsonl_atomic`].
pub async fn write_jsonl_atomic_iter<T, I, P>(path: P, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let temp_path = make_temp_path(path);

    if let Err(e) = write_to_temp_file(&temp_path, values).await {
        // Best-effort cleanup; the write error is what matters
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    tokio::fs::rename(&temp_path, path).await?;
    tracing::debug!(path = %path.display(), "Wrote JSONL snapshot");
    Ok(())
}

/// `graph.jsonl` becomes `graph.jsonl.tmp`; `graph` becomes `graph.tmp`.
fn make_temp_path(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let extension = match path.extension() {
        Some(ext) => {
            let mut ext = ext.to_os_string();
            ext.push(".tmp");
            ext
        }
        None => OsString::from("tmp"),
    };
    temp_path.set_extension(extension);
    temp_path
}

async fn write_to_temp_file<T, I>(temp_path: &Path, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let file = File::create(temp_path).await?;
    let mut writer = JsonlWriter::new(file);
    writer.write_all(values).await?;
    writer.flush().await?;
    writer.into_inner().sync_all().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Serialize;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Row {
        id: u32,
    }

    #[rstest]
    #[case::with_extension("/data/graph.jsonl", "/data/graph.jsonl.tmp")]
    #[case::without_extension("/data/graph", "/data/graph.tmp")]
    #[case::multiple_extensions("/data/graph.tar.gz", "/data/graph.tar.gz.tmp")]
    #[case::relative("graph.jsonl", "graph.jsonl.tmp")]
    fn temp_path_appends_tmp(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(make_temp_path(Path::new(input)), Path::new(expected));
    }

    #[tokio::test]
    async fn atomic_write_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("graph.jsonl");
        tokio::fs::write(&target, "old content\n").await.unwrap();

        write_jsonl_atomic(&target, &[Row { id: 42 }]).await.unwrap();

        let contents = tokio::fs::read_to_string(&target).await.unwrap();
        assert_eq!(contents, "{\"id\":42}\n");
        assert!(!dir.path().join("graph.jsonl.tmp").exists());
    }

    #[tokio::test]
    async fn atomic_write_of_nothing_creates_empty_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("empty.jsonl");

        write_jsonl_atomic::<Row, _>(&target, &[]).await.unwrap();

        let metadata = tokio::fs::metadata(&target).await.unwrap();
        assert_eq!(metadata.len(), 0);
    }

    #[tokio::test]
    async fn failed_write_leaves_original_untouched() {
        let dir = TempDir::new().unwrap();
        // Target inside a directory that does not exist: temp file creation fails
        let target = dir.path().join("missing").join("graph.jsonl");

        let result = write_jsonl_atomic(&target, &[Row { id: 1 }]).await;
        assert!(result.is_err());
        assert!(!target.exists());
    }
}
