//! Durable results table: `File 1, File 2, Similarity %`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::score::SimilarityResult;

pub const RESULT_HEADERS: [&str; 3] = ["File 1", "File 2", "Similarity %"];

/// Write the results table, replacing any table already at `path`.
///
/// Rows carry only the two file identities and the two-decimal percentage;
/// normalized texts and match blocks are never persisted. The table is
/// written to a temporary sibling and renamed into place so a failed write
/// cannot leave a truncated file that parses as a complete table.
pub fn persist_results(results: &[SimilarityResult], path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = staging_path(path);

    let write = |tmp: &Path| -> Result<(), Error> {
        let mut writer = csv::Writer::from_path(tmp)?;
        writer.write_record(RESULT_HEADERS)?;
        for result in results {
            let score = format!("{:.2}", result.score);
            writer.write_record([
                result.file_a.as_str(),
                result.file_b.as_str(),
                score.as_str(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    };

    if let Err(err) = write(&tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Read a persisted table back as `(file_a, file_b, score)` rows.
pub fn load_results(path: &Path) -> Result<Vec<(String, String, f64)>, Error> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let score: f64 = record
            .get(2)
            .unwrap_or_default()
            .parse()
            .map_err(|_| Error::InvalidUpload {
                file: path.display().to_string(),
                reason: format!("malformed similarity value in row {:?}", record),
            })?;
        rows.push((
            record.get(0).unwrap_or_default().to_string(),
            record.get(1).unwrap_or_default().to_string(),
            score,
        ));
    }
    Ok(rows)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|os| os.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
