//! Writing a streamed artifact to disk.
//!
//! Bytes go to a temporary file beside the destination, which is renamed
//! over the destination only once every chunk is written and synced. The
//! temporary file is removed on any error, and also when the future is
//! dropped mid-copy, so the destination never holds a partial artifact.

use crate::error::{GotenbergError, Result};
use crate::stream::ByteStream;
use futures::stream::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Permissions of a stored artifact on Unix: owner read/write, others read.
#[cfg(unix)]
const OUTPUT_MODE: u32 = 0o644;

/// Copy `stream` into `path`, creating parent directories as needed.
///
/// Returns the number of bytes written.
pub async fn write_stream(path: impl AsRef<Path>, mut stream: ByteStream) -> Result<u64> {
    let path = path.as_ref();
    let write_failed = |source| GotenbergError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = parent_dir(path);
    tokio::fs::create_dir_all(&dir).await.map_err(write_failed)?;

    let tmp = tempfile::Builder::new()
        .prefix(".gotenberg-")
        .suffix(".part")
        .tempfile_in(&dir)
        .map_err(write_failed)?;
    let std_file = tmp.as_file().try_clone().map_err(write_failed)?;
    let mut file = tokio::fs::File::from_std(std_file);

    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await.map_err(write_failed)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(write_failed)?;
    file.sync_all().await.map_err(write_failed)?;
    drop(file);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(OUTPUT_MODE))
            .await
            .map_err(write_failed)?;
    }

    tmp.persist(path).map_err(|e| write_failed(e.error))?;
    debug!("Wrote {} bytes to {}", written, path.display());
    Ok(written)
}

/// Directory that will hold `path`; the current directory for bare names.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;

    fn chunks(parts: Vec<Result<Bytes>>) -> ByteStream {
        Box::pin(stream::iter(parts))
    }

    fn leftovers(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".part"))
            .collect()
    }

    #[tokio::test]
    async fn writes_all_chunks_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested/out/result.pdf");
        let n = write_stream(
            &dest,
            chunks(vec![Ok(Bytes::from_static(b"%PDF-1.4")), Ok(Bytes::from_static(b"..."))]),
        )
        .await
        .unwrap();
        assert_eq!(n, 11);
        assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.4...");
        assert!(leftovers(dest.parent().unwrap()).is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn output_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("result.pdf");
        write_stream(&dest, chunks(vec![Ok(Bytes::from_static(b"x"))]))
            .await
            .unwrap();
        let mode = std::fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[tokio::test]
    async fn failed_stream_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("result.pdf");
        let err = write_stream(
            &dest,
            chunks(vec![
                Ok(Bytes::from_static(b"%PDF")),
                Err(GotenbergError::EncoderCloseFailed(std::io::Error::other("cut"))),
            ]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GotenbergError::EncoderCloseFailed(_)));
        assert!(!dest.exists());
        assert!(leftovers(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn existing_destination_is_replaced_whole() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("result.pdf");
        std::fs::write(&dest, b"old contents that are longer").unwrap();
        write_stream(&dest, chunks(vec![Ok(Bytes::from_static(b"new"))]))
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[test]
    fn bare_filename_uses_current_dir() {
        assert_eq!(parent_dir(Path::new("out.pdf")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("/tmp/out.pdf")), PathBuf::from("/tmp"));
    }
}
