//! Upload intake: filename sanitization, batch validation, and upload-store
//! housekeeping.
//!
//! Batch validation is all-or-nothing: the first file that violates a
//! constraint fails the whole batch by name, and nothing is ingested.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::Error;
use crate::normalize;

/// One file handed over by the upload surface.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// Reduce an upload name to a bare file name.
///
/// Takes the final path component, then drops any remaining `..` and
/// separator characters. An upload whose name dissolves entirely is rejected.
pub fn sanitize_file_name(name: &str) -> Result<String, Error> {
    let component = Path::new(name)
        .file_name()
        .and_then(|os| os.to_str())
        .unwrap_or("");

    let cleaned: String = component
        .replace("..", "")
        .chars()
        .filter(|c| *c != '/' && *c != '\\')
        .collect();

    if cleaned.is_empty() {
        return Err(Error::InvalidUpload {
            file: name.to_string(),
            reason: "file name is empty after sanitization".to_string(),
        });
    }
    Ok(cleaned)
}

/// Check every file in the batch before any of them is stored. Returns the
/// sanitized names, in input order.
pub fn validate_batch(files: &[UploadFile], max_bytes: u64) -> Result<Vec<String>, Error> {
    let mut names = Vec::with_capacity(files.len());
    for file in files {
        let safe_name = sanitize_file_name(&file.name)?;
        if !normalize::is_supported_extension(Path::new(&safe_name)) {
            return Err(Error::InvalidUpload {
                file: file.name.clone(),
                reason: format!(
                    "unsupported extension (supported: {})",
                    normalize::SUPPORTED_EXTENSIONS.join(", ")
                ),
            });
        }
        if file.data.len() as u64 > max_bytes {
            return Err(Error::InvalidUpload {
                file: file.name.clone(),
                reason: format!(
                    "exceeds the {} byte size limit ({} bytes)",
                    max_bytes,
                    file.data.len()
                ),
            });
        }
        names.push(safe_name);
    }
    Ok(names)
}

/// Validate the whole batch, then write every file into the upload store
/// under its sanitized name, overwriting same-named prior uploads.
pub fn store_batch(
    files: &[UploadFile],
    upload_dir: &Path,
    max_bytes: u64,
) -> Result<Vec<PathBuf>, Error> {
    let names = validate_batch(files, max_bytes)?;
    fs::create_dir_all(upload_dir)?;

    let mut stored = Vec::with_capacity(files.len());
    for (file, name) in files.iter().zip(&names) {
        let path = upload_dir.join(name);
        fs::write(&path, &file.data)?;
        stored.push(path);
    }
    info!("Stored {} uploaded files", stored.len());
    Ok(stored)
}

/// Enumerate regular files in the upload store with a supported extension,
/// sorted by file name so downstream pair generation is deterministic.
/// Unsupported files are silently excluded. An absent directory is an error.
pub fn list_upload_candidates(upload_dir: &Path) -> Result<Vec<PathBuf>, Error> {
    if !upload_dir.is_dir() {
        return Err(Error::MissingUploadDir(upload_dir.to_path_buf()));
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(upload_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if normalize::is_supported_extension(&path) {
            candidates.push(path);
        }
    }
    candidates.sort();
    Ok(candidates)
}

/// Delete every entry directly under `dir`. Missing directory is a no-op.
pub fn clear_directory(dir: &Path) -> io::Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    for entry in entries {
        let path = entry?.path();
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        if let Err(err) = removed {
            warn!("Could not remove {}: {}", path.display(), err);
        }
    }
    Ok(())
}

/// Create the upload, preprocessed and results directories up front.
pub fn initialize_directories(config: &AppConfig) -> io::Result<()> {
    fs::create_dir_all(&config.upload_dir)?;
    fs::create_dir_all(&config.preprocessed_dir)?;
    if let Some(parent) = config.results_path.parent() {
        fs::create_dir_all(parent)?;
    }
    if let Some(parent) = config.progress_path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, data: &[u8]) -> UploadFile {
        UploadFile {
            name: name.to_string(),
            data: data.to_vec(),
        }
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_file_name("../../etc/passwd.py").unwrap(), "passwd.py");
        assert_eq!(sanitize_file_name("dir/sub/a.py").unwrap(), "a.py");
        assert_eq!(sanitize_file_name("..\\evil.py").unwrap(), "evil.py");
        assert_eq!(sanitize_file_name("ok.java").unwrap(), "ok.java");
    }

    #[test]
    fn test_sanitize_rejects_dissolved_names() {
        assert!(sanitize_file_name("..").is_err());
        assert!(sanitize_file_name("").is_err());
    }

    #[test]
    fn test_validate_rejects_unsupported_extension() {
        let files = vec![upload("a.py", b"x"), upload("notes.txt", b"x")];
        let err = validate_batch(&files, 1024).unwrap_err();
        match err {
            Error::InvalidUpload { file, reason } => {
                assert_eq!(file, "notes.txt");
                assert!(reason.contains("unsupported extension"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_rejects_oversized_file() {
        let files = vec![upload("big.py", &[b'x'; 32])];
        let err = validate_batch(&files, 16).unwrap_err();
        match err {
            Error::InvalidUpload { file, reason } => {
                assert_eq!(file, "big.py");
                assert!(reason.contains("size limit"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_is_all_or_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let files = vec![upload("good.py", b"x"), upload("bad.txt", b"x")];
        assert!(store_batch(&files, tmp.path(), 1024).is_err());
        // the valid file must not have been partially ingested
        assert!(!tmp.path().join("good.py").exists());
    }

    #[test]
    fn test_store_and_list_candidates() {
        let tmp = tempfile::tempdir().unwrap();
        let files = vec![upload("b.py", b"print(2)"), upload("a.py", b"print(1)")];
        let stored = store_batch(&files, tmp.path(), 1024).unwrap();
        assert_eq!(stored.len(), 2);

        // a non-source file in the directory is silently excluded
        fs::write(tmp.path().join("readme.md"), "hi").unwrap();

        let candidates = list_upload_candidates(tmp.path()).unwrap();
        let names: Vec<_> = candidates
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.py", "b.py"]);
    }

    #[test]
    fn test_list_candidates_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(
            list_upload_candidates(&missing),
            Err(Error::MissingUploadDir(_))
        ));
    }
}
