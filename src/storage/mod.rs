use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const DEFAULT_FILE_NAME: &str = "unknown.png";
const TEMP_SUFFIX: &str = ".nanoedit-tmp";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("path {path} has no file name")]
    MissingFileName { path: PathBuf },
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Byte-level image persistence. Decoding and encoding stay with the editor.
pub trait ImageStorage {
    fn read_image(&self, path: &Path) -> StorageResult<Vec<u8>>;
    fn write_image(&self, path: &Path, bytes: &[u8]) -> StorageResult<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FileStorage;

impl ImageStorage for FileStorage {
    fn read_image(&self, path: &Path) -> StorageResult<Vec<u8>> {
        let bytes = fs::read(path).map_err(io_error(path))?;
        tracing::debug!(path = %path.display(), len = bytes.len(), "read image file");
        Ok(bytes)
    }

    fn write_image(&self, path: &Path, bytes: &[u8]) -> StorageResult<()> {
        write_atomic(path, bytes)
    }
}

/// Writes to a sibling temp file, then renames over `destination`, so readers
/// never observe a half-written image.
pub fn write_atomic(destination: &Path, bytes: &[u8]) -> StorageResult<()> {
    let file_name = destination
        .file_name()
        .ok_or_else(|| StorageError::MissingFileName {
            path: destination.to_path_buf(),
        })?;
    let parent = destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(io_error(parent))?;

    let mut temp_name = file_name.to_os_string();
    temp_name.push(format!("{TEMP_SUFFIX}-{}", std::process::id()));
    let temp_path = parent.join(temp_name);

    if let Err(err) = fs::write(&temp_path, bytes) {
        let _ = fs::remove_file(&temp_path);
        return Err(io_error(&temp_path)(err));
    }
    if let Err(err) = fs::rename(&temp_path, destination) {
        let _ = fs::remove_file(&temp_path);
        return Err(io_error(destination)(err));
    }
    tracing::debug!(path = %destination.display(), len = bytes.len(), "wrote image file");
    Ok(())
}

/// File name offered by a save dialog: the current file's name, else `unknown.png`.
pub fn suggested_file_name(current: Option<&Path>) -> String {
    current
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .map_or_else(|| DEFAULT_FILE_NAME.to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nanoedit-storage-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn suggested_name_falls_back_to_unknown_png() {
        assert_eq!(suggested_file_name(None), "unknown.png");
        assert_eq!(
            suggested_file_name(Some(Path::new("/home/test/Pictures/cat.png"))),
            "cat.png"
        );
    }

    #[test]
    fn atomic_write_creates_parent_and_replaces_content() {
        let dir = scratch_dir("replace");
        let target = dir.join("nested").join("out.png");
        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"second");

        let leftovers = fs::read_dir(target.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().contains(TEMP_SUFFIX))
            .count();
        assert_eq!(leftovers, 0);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn file_storage_round_trips_bytes() {
        let dir = scratch_dir("roundtrip");
        let target = dir.join("image.png");
        let storage = FileStorage;
        storage.write_image(&target, b"\x89PNG data").unwrap();
        assert_eq!(storage.read_image(&target).unwrap(), b"\x89PNG data");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn reading_missing_file_reports_path() {
        let err = FileStorage
            .read_image(Path::new("/definitely/missing/file.png"))
            .unwrap_err();
        assert!(
            matches!(err, StorageError::Io { ref path, .. } if path == Path::new("/definitely/missing/file.png"))
        );
    }

    #[test]
    fn writing_to_root_path_without_file_name_fails() {
        let err = write_atomic(Path::new("/"), b"x").unwrap_err();
        assert!(matches!(err, StorageError::MissingFileName { .. }));
    }
}
