use std::fs;
use std::path::Path;

use tempfile::tempdir;

use simcheck_core::progress::ProgressFile;
use simcheck_core::store;
use simcheck_core::{AppConfig, CompareEngine, Error, SilentReporter};

fn test_config(root: &Path) -> AppConfig {
    AppConfig {
        upload_dir: root.join("uploads"),
        preprocessed_dir: root.join("preprocessed"),
        results_path: root.join("results").join("similarity_results.csv"),
        progress_path: root.join("progress.json"),
        max_file_size_mib: 10,
        worker_threads: 2,
    }
}

/// Seed an upload store with three Python files. `a.py` and `b.py` differ
/// only in comments and imports; `c.py` shares nothing with either.
fn seed_uploads(upload_dir: &Path) {
    fs::create_dir_all(upload_dir).unwrap();
    fs::write(upload_dir.join("a.py"), "import os\n#hi\nprint(1)").unwrap();
    fs::write(upload_dir.join("b.py"), "print(1)").unwrap();
    fs::write(upload_dir.join("c.py"), "zzzz").unwrap();
}

fn row_for<'a>(
    rows: &'a [(String, String, f64)],
    a: &str,
    b: &str,
) -> &'a (String, String, f64) {
    rows.iter()
        .find(|(fa, fb, _)| (fa == a && fb == b) || (fa == b && fb == a))
        .unwrap_or_else(|| panic!("no row for {a}/{b}"))
}

#[test]
fn test_full_pipeline() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    seed_uploads(&config.upload_dir);

    let engine = CompareEngine::new(config.clone());
    let report = engine.run(&SilentReporter).unwrap();

    assert_eq!(report.files_in, 3);
    assert_eq!(report.files_normalized, 3);
    assert_eq!(report.pair_count, 3); // C(3, 2)
    assert!(report.cpu_cores > 0);

    // Artifacts exist, keyed by original file name, with canonical content.
    let artifact = config.preprocessed_dir.join("a.py");
    assert_eq!(fs::read_to_string(artifact).unwrap(), "print(1)");

    // Results table has one row per unordered pair with expected scores.
    let rows = store::load_results(&config.results_path).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(row_for(&rows, "a.py", "b.py").2, 100.0);
    assert_eq!(row_for(&rows, "a.py", "c.py").2, 0.0);
    assert_eq!(row_for(&rows, "b.py", "c.py").2, 0.0);

    // Final snapshot reflects the completed persistence stage.
    let snapshot = ProgressFile::new(&config.progress_path).read().unwrap();
    assert_eq!(snapshot.stage, "saving_csv");
    assert_eq!(snapshot.completed_pairs, 1);
    assert_eq!(snapshot.total_pairs, 1);
    assert!(snapshot.cpu_cores_used > 0);
}

#[test]
fn test_missing_upload_dir_fails() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    // upload dir intentionally not created

    let engine = CompareEngine::new(config);
    assert!(matches!(
        engine.run(&SilentReporter),
        Err(Error::MissingUploadDir(_))
    ));
}

#[test]
fn test_empty_upload_dir_fails_with_no_usable_files() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    fs::create_dir_all(&config.upload_dir).unwrap();

    let engine = CompareEngine::new(config.clone());
    assert!(matches!(
        engine.run(&SilentReporter),
        Err(Error::NoUsableFiles)
    ));

    // A failed run leaves the terminal error stage behind for pollers.
    let snapshot = ProgressFile::new(&config.progress_path).read().unwrap();
    assert_eq!(snapshot.stage, "error");
}

#[test]
fn test_unsupported_files_are_silently_excluded() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    seed_uploads(&config.upload_dir);
    fs::write(config.upload_dir.join("notes.txt"), "not source").unwrap();

    let engine = CompareEngine::new(config.clone());
    let report = engine.run(&SilentReporter).unwrap();

    assert_eq!(report.files_in, 3);
    assert!(!config.preprocessed_dir.join("notes.txt").exists());
}

#[test]
fn test_single_file_produces_empty_results_table() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    fs::create_dir_all(&config.upload_dir).unwrap();
    fs::write(config.upload_dir.join("only.py"), "print(1)").unwrap();

    let engine = CompareEngine::new(config.clone());
    let report = engine.run(&SilentReporter).unwrap();

    assert_eq!(report.pair_count, 0);
    assert!(store::load_results(&config.results_path).unwrap().is_empty());
}

#[test]
fn test_rerun_overwrites_results() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    seed_uploads(&config.upload_dir);

    let engine = CompareEngine::new(config.clone());
    engine.run(&SilentReporter).unwrap();

    // Second run with one file removed must leave a smaller table, not a
    // stale mix of the two runs.
    fs::remove_file(config.upload_dir.join("c.py")).unwrap();
    engine.run(&SilentReporter).unwrap();

    let rows = store::load_results(&config.results_path).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].2, 100.0);
}

#[test]
fn test_empty_files_score_full_match() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    fs::create_dir_all(&config.upload_dir).unwrap();
    fs::write(config.upload_dir.join("e1.py"), "").unwrap();
    fs::write(config.upload_dir.join("e2.py"), "").unwrap();

    let engine = CompareEngine::new(config.clone());
    engine.run(&SilentReporter).unwrap();

    let rows = store::load_results(&config.results_path).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].2, 100.0);
}
