//! Parallel preprocessing driver: normalize every upload and write the result
//! to a per-file artifact keyed by the original file name.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::error;

use crate::error::Error;
use crate::normalize::{self, Dialect};

/// One entry per input file, success or failure.
#[derive(Debug, Clone)]
pub struct PreprocessOutcome {
    pub source: PathBuf,
    /// Path of the written artifact, or `None` when this file failed.
    pub artifact: Option<PathBuf>,
}

/// Normalize a single file and write the artifact, overwriting any prior
/// artifact of the same name.
pub fn preprocess_file(source: &Path, out_dir: &Path) -> Result<PathBuf, Error> {
    let file_name = source
        .file_name()
        .and_then(|os| os.to_str())
        .ok_or_else(|| Error::InvalidUpload {
            file: source.display().to_string(),
            reason: "path has no usable file name".to_string(),
        })?;

    let raw = fs::read(source)?;
    let text = normalize::decode_lossy(&raw);
    let normalized = Dialect::from_path(source).normalize(&text);

    let out_path = out_dir.join(file_name);
    fs::write(&out_path, &normalized)?;
    Ok(out_path)
}

/// Run every file through the normalizer on the worker pool.
///
/// A failing file is logged and yields a `None` artifact; it never aborts the
/// run. Exactly one outcome is produced per input.
pub fn preprocess_all(files: &[PathBuf], out_dir: &Path) -> Vec<PreprocessOutcome> {
    files
        .par_iter()
        .map(|source| match preprocess_file(source, out_dir) {
            Ok(artifact) => PreprocessOutcome {
                source: source.clone(),
                artifact: Some(artifact),
            },
            Err(err) => {
                error!("Error preprocessing {}: {}", source.display(), err);
                PreprocessOutcome {
                    source: source.clone(),
                    artifact: None,
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_writes_canonical_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("a.py");
        fs::write(&src, "import os\n#hi\nPRINT(1)\n").unwrap();

        let out = preprocess_file(&src, tmp.path()).unwrap();
        assert_eq!(fs::read_to_string(out).unwrap(), "print(1)");
    }

    #[test]
    fn test_preprocess_all_isolates_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let out_dir = tmp.path().join("pre");
        fs::create_dir_all(&out_dir).unwrap();

        let good = tmp.path().join("good.py");
        fs::write(&good, "x = 1\n").unwrap();
        let missing = tmp.path().join("missing.py");

        let outcomes = preprocess_all(&[good.clone(), missing.clone()], &out_dir);
        assert_eq!(outcomes.len(), 2);

        let by_source = |p: &Path| {
            outcomes
                .iter()
                .find(|o| o.source == p)
                .expect("outcome for every input")
                .clone()
        };
        assert!(by_source(&good).artifact.is_some());
        assert!(by_source(&missing).artifact.is_none());
    }

    #[test]
    fn test_rerun_overwrites_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("a.py");

        fs::write(&src, "x = 1\n").unwrap();
        let first = preprocess_file(&src, tmp.path()).unwrap();
        fs::write(&src, "y = 2\n").unwrap();
        let second = preprocess_file(&src, tmp.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(second).unwrap(), "y = 2");
    }
}
