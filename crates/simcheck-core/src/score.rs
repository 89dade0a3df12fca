//! All-pairs similarity scoring over preprocessed artifacts.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::error::Error;
use crate::matcher::{round2, MatchBlock, SequenceMatcher};
use crate::normalize;
use crate::progress::ProgressReporter;

/// Score for one unordered file pair. `file_a`/`file_b` order is generation
/// order over the supplied file list, not a ranking.
#[derive(Debug, Clone)]
pub struct SimilarityResult {
    pub file_a: String,
    pub file_b: String,
    /// Percentage in [0, 100], rounded to two decimals.
    pub score: f64,
    /// Normalized texts and matched blocks, kept only for highlight
    /// rendering. Never persisted.
    pub detail: Option<MatchDetail>,
}

#[derive(Debug, Clone)]
pub struct MatchDetail {
    pub text_a: String,
    pub text_b: String,
    pub blocks: Vec<MatchBlock>,
}

/// Every unordered pair of distinct entries, exactly C(n, 2) of them, in a
/// deterministic order: `(names[i], names[j])` for all `i < j`. No self-pairs,
/// no duplicates. Zero or one input names produce no pairs.
pub fn generate_pairs(names: &[String]) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(names.len() * names.len().saturating_sub(1) / 2);
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            pairs.push((names[i].clone(), names[j].clone()));
        }
    }
    pairs
}

/// Read two artifacts and score them. Pure function of the two files; safe to
/// run on any worker thread.
pub fn score_pair(
    preprocessed_dir: &Path,
    file_a: &str,
    file_b: &str,
    keep_detail: bool,
) -> Result<SimilarityResult, Error> {
    let text_a = read_artifact(preprocessed_dir, file_a)?;
    let text_b = read_artifact(preprocessed_dir, file_b)?;

    let matcher = SequenceMatcher::new(&text_a, &text_b);
    let score = round2(matcher.ratio() * 100.0);
    let detail = keep_detail.then(|| MatchDetail {
        blocks: matcher.matching_blocks().to_vec(),
        text_a,
        text_b,
    });

    Ok(SimilarityResult {
        file_a: file_a.to_string(),
        file_b: file_b.to_string(),
        score,
        detail,
    })
}

fn read_artifact(dir: &Path, name: &str) -> Result<String, Error> {
    let raw = fs::read(dir.join(name))?;
    Ok(normalize::decode_lossy(&raw))
}

/// Score every pair on the worker pool, one task per pair, no shared mutable
/// state between tasks.
///
/// Failure policy is uniform: any unreadable artifact fails the whole run.
/// Nothing is fabricated and no gap is silently skipped.
pub fn score_all(
    preprocessed_dir: &Path,
    pairs: &[(String, String)],
    reporter: &dyn ProgressReporter,
) -> Result<Vec<SimilarityResult>, Error> {
    let total = pairs.len();
    let completed = AtomicUsize::new(0);

    pairs
        .par_iter()
        .map(|(file_a, file_b)| {
            let result = score_pair(preprocessed_dir, file_a, file_b, false)?;
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            reporter.on_score_progress(done, total);
            Ok(result)
        })
        .collect()
}
