use crate::error::MetasiftError;
use chrono::{DateTime, Local};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Identity of the inspected file, independent of what ExifTool reports.
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    /// Absolute, canonical path.
    pub path: PathBuf,
    pub size: u64,
    /// Lowercase extension including the dot, empty if there is none.
    pub extension: String,
    pub modified: Option<DateTime<Local>>,
    /// Not every platform/filesystem reports a creation time.
    pub created: Option<DateTime<Local>>,
    pub sha256: String,
}

impl FileInfo {
    pub fn collect(path: &Path) -> Result<Self, MetasiftError> {
        let path = fs::canonicalize(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => MetasiftError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => MetasiftError::Io(e),
        })?;
        let metadata = fs::metadata(&path)?;

        Ok(Self {
            extension: extension_of(&path),
            size: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
            created: metadata.created().ok().map(DateTime::<Local>::from),
            sha256: sha256_file(&path)?,
            path,
        })
    }

    pub fn size_kb(&self) -> f64 {
        self.size as f64 / 1024.0
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// SHA-256 of the file contents as lowercase hex.
pub fn sha256_file(path: &Path) -> Result<String, MetasiftError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_collect() -> Result<(), MetasiftError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("Holiday.JPG");
        fs::write(&path, b"abc")?;

        let info = FileInfo::collect(&path)?;
        assert!(info.path.is_absolute());
        assert!(info.path.ends_with("Holiday.JPG"));
        assert_eq!(info.size, 3);
        assert_eq!(info.extension, ".jpg");
        assert!(info.modified.is_some());
        assert_eq!(
            info.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        Ok(())
    }

    #[test]
    fn test_size_kb() -> Result<(), MetasiftError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("noext");
        fs::write(&path, vec![0u8; 2048])?;

        let info = FileInfo::collect(&path)?;
        assert_eq!(info.extension, "");
        assert!((info.size_kb() - 2.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn test_collect_missing_file() {
        let missing = Path::new("data/does_not_exist.png");
        assert_matches!(
            FileInfo::collect(missing),
            Err(MetasiftError::FileNotFound { path }) if path == missing
        );
    }

    #[test]
    fn test_sha256_of_empty_file() -> Result<(), MetasiftError> {
        let file = tempfile::NamedTempFile::new()?;
        assert_eq!(
            sha256_file(file.path())?,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        Ok(())
    }
}
