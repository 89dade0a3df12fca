//! Run progress: in-process reporter callbacks and the polled snapshot file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sysinfo::System;
use tracing::warn;

/// Callbacks fired as the pipeline advances.
///
/// The CLI implements this with indicatif; library embedders can implement
/// their own. All methods default to no-ops.
pub trait ProgressReporter: Send + Sync {
    fn on_preprocess_start(&self, _total_files: usize) {}
    fn on_preprocess_complete(&self, _normalized: usize, _total_files: usize, _duration_secs: f64) {
    }
    fn on_score_start(&self, _total_pairs: usize) {}
    fn on_score_progress(&self, _completed: usize, _total_pairs: usize) {}
    fn on_score_complete(&self, _total_pairs: usize, _duration_secs: f64) {}
    fn on_persist_start(&self) {}
    fn on_persist_complete(&self, _rows: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

/// Pipeline stage names as persisted in the snapshot file.
pub mod stage {
    pub const PREPROCESSING: &str = "preprocessing";
    pub const COMPARISON: &str = "comparison";
    pub const SAVING_CSV: &str = "saving_csv";
    pub const ERROR: &str = "error";
}

/// The single current snapshot of a run, overwritten on every update.
/// Absence of the file means no run has started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub stage: String,
    pub completed_pairs: u64,
    pub total_pairs: u64,
    pub elapsed_time_seconds: f64,
    pub cpu_usage_percent: f64,
    pub cpu_cores_used: usize,
    pub updated_at: String,
}

/// Snapshot file owner. Only the orchestrating process writes it, between
/// pool phases; worker tasks never touch it, so two processes never interleave
/// writes to the same file.
pub struct ProgressFile {
    path: PathBuf,
}

impl ProgressFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the snapshot. Written to a temporary sibling and renamed so a
    /// concurrent reader observes either the previous or the new snapshot.
    /// Failure to write progress is logged, never fatal to the run.
    pub fn write(&self, snapshot: &ProgressSnapshot) {
        if let Err(err) = self.try_write(snapshot) {
            warn!("Error writing progress snapshot: {}", err);
        }
    }

    fn try_write(&self, snapshot: &ProgressSnapshot) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec(snapshot)?;
        let mut tmp_name = self
            .path
            .file_name()
            .map(|os| os.to_os_string())
            .unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Read the current snapshot. A missing file or content that does not
    /// parse (a write in flight, a stale partial file) is "no progress
    /// available", not an error.
    pub fn read(&self) -> Option<ProgressSnapshot> {
        let bytes = fs::read(&self.path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// System CPU telemetry attached to snapshots and the run report.
pub struct CpuMonitor {
    sys: System,
}

impl CpuMonitor {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        Self { sys }
    }

    /// Current global CPU usage percentage and logical core count. Usage is
    /// computed against the previous refresh, so sample after some work has
    /// happened.
    pub fn sample(&mut self) -> (f64, usize) {
        self.sys.refresh_cpu_usage();
        let usage = self.sys.global_cpu_info().cpu_usage() as f64;
        let cores = self.sys.cpus().len();
        (usage, cores)
    }
}

impl Default for CpuMonitor {
    fn default() -> Self {
        Self::new()
    }
}
