//! Building [`PickedFile`] handles from the local file system.

use std::io;
use std::path::Path;

use thumbforge_core::types::PickedFile;

/// Describe the file at `path` as a picker would, reading only metadata.
///
/// The MIME type comes from the extension; the bytes are read when the
/// request is built.
pub async fn pick_file(path: impl AsRef<Path>) -> io::Result<PickedFile> {
    let path = path.as_ref();
    let meta = tokio::fs::metadata(path).await?;
    if !meta.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", path.display()),
        ));
    }
    Ok(PickedFile::for_path(path, meta.len()))
}

#[cfg(test)]
mod tests {
    use thumbforge_core::types::VideoSource;

    use super::*;

    #[tokio::test]
    async fn pick_reads_size_and_mime() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("clip.mp4");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();

        let file = pick_file(&path).await.unwrap();
        assert_eq!(file.name, "clip.mp4");
        assert_eq!(file.size_bytes, 2048);
        assert_eq!(file.mime_type.as_deref(), Some("video/mp4"));
        assert_eq!(file.source, VideoSource::Path(path));
    }

    #[tokio::test]
    async fn pick_directory_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let err = pick_file(tmp.path()).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn pick_missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = pick_file(tmp.path().join("nope.mp4")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
