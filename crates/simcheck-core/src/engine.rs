use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::Error;
use crate::intake;
use crate::preprocess;
use crate::progress::{stage, CpuMonitor, ProgressFile, ProgressReporter, ProgressSnapshot};
use crate::score;
use crate::store;

pub struct CompareEngine {
    config: AppConfig,
}

#[derive(Debug)]
pub struct RunReport {
    pub preprocess_duration: Duration,
    pub score_duration: Duration,
    pub persist_duration: Duration,
    pub files_in: usize,
    pub files_normalized: usize,
    pub pair_count: usize,
    pub results_path: PathBuf,
    pub cpu_usage_percent: f64,
    pub cpu_cores: usize,
}

impl CompareEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the full comparison pipeline:
    /// 1. Parallel preprocessing (normalize each upload to an artifact)
    /// 2. All-pairs similarity scoring over the artifacts
    /// 3. Write the results table
    ///
    /// The progress snapshot file is written by this process only, between
    /// pool phases; worker tasks never write it.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<RunReport, Error> {
        let progress = ProgressFile::new(self.config.progress_path.clone());
        let mut cpu = CpuMonitor::new();
        let started = Instant::now();

        match self.run_pipeline(reporter, &progress, &mut cpu, started) {
            Ok(report) => Ok(report),
            Err(err) => {
                let (usage, cores) = cpu.sample();
                progress.write(&snapshot(stage::ERROR, 0, 0, started, usage, cores));
                Err(err)
            }
        }
    }

    fn run_pipeline(
        &self,
        reporter: &dyn ProgressReporter,
        progress: &ProgressFile,
        cpu: &mut CpuMonitor,
        started: Instant,
    ) -> Result<RunReport, Error> {
        let candidates = intake::list_upload_candidates(&self.config.upload_dir)?;
        if candidates.is_empty() {
            return Err(Error::NoUsableFiles);
        }
        fs::create_dir_all(&self.config.preprocessed_dir)?;

        // Both phases run on one fixed-size pool; 0 threads means one per
        // logical core.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.worker_threads)
            .build()?;

        // Phase 1: preprocess
        info!("Preprocessing {} files...", candidates.len());
        let (usage, cores) = cpu.sample();
        progress.write(&snapshot(
            stage::PREPROCESSING,
            0,
            candidates.len() as u64,
            started,
            usage,
            cores,
        ));
        reporter.on_preprocess_start(candidates.len());

        let preprocess_start = Instant::now();
        let outcomes = pool.install(|| {
            preprocess::preprocess_all(&candidates, &self.config.preprocessed_dir)
        });
        let preprocess_duration = preprocess_start.elapsed();

        let normalized: Vec<String> = outcomes
            .iter()
            .filter_map(|outcome| outcome.artifact.as_deref())
            .filter_map(|artifact| artifact.file_name())
            .filter_map(|name| name.to_str())
            .map(|name| name.to_string())
            .collect();

        reporter.on_preprocess_complete(
            normalized.len(),
            candidates.len(),
            preprocess_duration.as_secs_f64(),
        );
        let (usage, cores) = cpu.sample();
        progress.write(&snapshot(
            stage::PREPROCESSING,
            normalized.len() as u64,
            candidates.len() as u64,
            started,
            usage,
            cores,
        ));
        debug!(
            "Preprocessing completed in {:.2}s — {}/{} files normalized",
            preprocess_duration.as_secs_f64(),
            normalized.len(),
            candidates.len(),
        );

        if normalized.is_empty() {
            return Err(Error::NoUsableFiles);
        }

        // Phase 2: all-pairs scoring
        let pairs = score::generate_pairs(&normalized);
        let total_pairs = pairs.len();
        info!("Comparing {} file pairs...", total_pairs);
        progress.write(&snapshot(
            stage::COMPARISON,
            0,
            total_pairs as u64,
            started,
            usage,
            cores,
        ));
        reporter.on_score_start(total_pairs);

        let score_start = Instant::now();
        let results = pool
            .install(|| score::score_all(&self.config.preprocessed_dir, &pairs, reporter))?;
        let score_duration = score_start.elapsed();

        reporter.on_score_complete(total_pairs, score_duration.as_secs_f64());
        let (usage, cores) = cpu.sample();
        progress.write(&snapshot(
            stage::COMPARISON,
            total_pairs as u64,
            total_pairs as u64,
            started,
            usage,
            cores,
        ));
        debug!(
            "Comparison completed in {:.2}s — {} pairs scored",
            score_duration.as_secs_f64(),
            results.len(),
        );

        // Phase 3: persist
        info!("Saving results table...");
        progress.write(&snapshot(stage::SAVING_CSV, 0, 1, started, usage, cores));
        reporter.on_persist_start();

        let persist_start = Instant::now();
        store::persist_results(&results, &self.config.results_path)?;
        let persist_duration = persist_start.elapsed();

        reporter.on_persist_complete(results.len(), persist_duration.as_secs_f64());
        let (cpu_usage_percent, cpu_cores) = cpu.sample();
        progress.write(&snapshot(
            stage::SAVING_CSV,
            1,
            1,
            started,
            cpu_usage_percent,
            cpu_cores,
        ));
        debug!(
            "Results table written in {:.2}s — {} rows",
            persist_duration.as_secs_f64(),
            results.len(),
        );

        Ok(RunReport {
            preprocess_duration,
            score_duration,
            persist_duration,
            files_in: candidates.len(),
            files_normalized: normalized.len(),
            pair_count: total_pairs,
            results_path: self.config.results_path.clone(),
            cpu_usage_percent,
            cpu_cores,
        })
    }
}

fn snapshot(
    stage: &str,
    completed: u64,
    total: u64,
    started: Instant,
    cpu_usage_percent: f64,
    cpu_cores_used: usize,
) -> ProgressSnapshot {
    ProgressSnapshot {
        stage: stage.to_string(),
        completed_pairs: completed,
        total_pairs: total,
        elapsed_time_seconds: started.elapsed().as_secs_f64(),
        cpu_usage_percent,
        cpu_cores_used,
        updated_at: chrono::Utc::now().to_rfc3339(),
    }
}
