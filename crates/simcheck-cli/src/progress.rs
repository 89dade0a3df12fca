use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use simcheck_core::ProgressReporter;

/// CLI progress reporter using indicatif progress bars.
///
/// - Preprocess phase: spinner (finishes in one pool pass)
/// - Scoring phase: progress bar (pair total known upfront)
/// - Save phase: spinner
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }

    fn spinner(&self, message: String) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(message);
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }
}

impl ProgressReporter for CliReporter {
    fn on_preprocess_start(&self, total_files: usize) {
        self.spinner(format!("Preprocessing {} files...", total_files));
    }

    fn on_preprocess_complete(&self, normalized: usize, total_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Preprocess complete: {}/{} files in {:.2}s",
            normalized, total_files, duration_secs
        );
    }

    fn on_score_start(&self, total_pairs: usize) {
        let pb = ProgressBar::new(total_pairs as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Comparing [{bar:30.cyan/dim}] {pos}/{len} pairs ({eta} remaining)",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_score_progress(&self, completed: usize, _total_pairs: usize) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_position(completed as u64);
        }
    }

    fn on_score_complete(&self, total_pairs: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Comparison complete: {} pairs in {:.2}s",
            total_pairs, duration_secs
        );
    }

    fn on_persist_start(&self) {
        self.spinner("Saving results table...".to_string());
    }

    fn on_persist_complete(&self, rows: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Results saved: {} rows in {:.2}s",
            rows, duration_secs
        );
    }
}
