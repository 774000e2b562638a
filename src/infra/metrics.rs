// ============================================================
// Layer 6 — Metrics
// ============================================================
// Two kinds of numbers:
//
// 1. Training curves — one CSV row per epoch:
//      epoch,train_loss,val_loss,token_acc
//      1,0.912300,0.870100,0.612000
//    token_acc counts only positions that carry a real target
//    (Ignore positions are skipped).
//
// 2. Span scores — predicted spans against a label file, per
//    class, measured in characters:
//      precision = |pred ∩ gold| / |pred|
//      recall    = |pred ∩ gold| / |gold|
//    so a prediction split into per-word spans and one covering
//    the whole question score the same on the characters they
//    share.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    collections::HashSet,
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

use crate::domain::labels::{LabelSet, SpanClass};
use crate::domain::span::PredictedSpan;

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:      usize,
    pub train_loss: f64,
    pub val_loss:   f64,
    pub token_acc:  f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, token_acc: f64) -> Self {
        Self { epoch, train_loss, val_loss, token_acc }
    }

    /// Returns true if this epoch improved over the previous best val_loss
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

/// Appends epoch metrics to `metrics.csv`.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the logger, writing the CSV header if the file is new.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,val_loss,token_acc")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.train_loss, m.val_loss, m.token_acc,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Span scoring ─────────────────────────────────────────────────────────────

/// Character-level scores for one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassScore {
    pub class:     SpanClass,
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
}

/// Score predictions of `class` against the gold ranges of the same class.
pub fn score_class(predicted: &[PredictedSpan], gold: &LabelSet, class: SpanClass) -> ClassScore {
    let pred_chars: HashSet<usize> = predicted
        .iter()
        .filter(|s| s.class == class)
        .flat_map(|s| s.start..s.end)
        .collect();
    let gold_chars: HashSet<usize> = gold
        .of(class)
        .iter()
        .flat_map(|&(s, e)| s..e)
        .collect();

    let hits = pred_chars.intersection(&gold_chars).count() as f64;
    let precision = ratio(hits, pred_chars.len() as f64);
    let recall    = ratio(hits, gold_chars.len() as f64);
    let f1        = ratio(2.0 * precision * recall, precision + recall);

    ClassScore { class, precision, recall, f1 }
}

/// Scores for Question then Answer
pub fn score_spans(predicted: &[PredictedSpan], gold: &LabelSet) -> [ClassScore; 2] {
    [
        score_class(predicted, gold, SpanClass::Question),
        score_class(predicted, gold, SpanClass::Answer),
    ]
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 2.5, 2.3, 0.2);
        assert!(m.is_improvement(3.0));
        assert!(!m.is_improvement(2.0));
    }

    #[test]
    fn test_logger_appends_rows() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path().to_string_lossy()).unwrap();
        logger.log(&EpochMetrics::new(1, 1.0, 0.9, 0.5)).unwrap();
        logger.log(&EpochMetrics::new(2, 0.8, 0.7, 0.6)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "epoch,train_loss,val_loss,token_acc");
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("2,0.800000"));
    }

    #[test]
    fn test_perfect_prediction_scores_one() {
        let gold = LabelSet::new(vec![(0, 20)], vec![(21, 24), (25, 27)]);
        let pred = vec![
            PredictedSpan::new(0, 20, SpanClass::Question),
            PredictedSpan::new(21, 24, SpanClass::Answer),
            PredictedSpan::new(25, 27, SpanClass::Answer),
        ];
        for score in score_spans(&pred, &gold) {
            assert_eq!(score.f1, 1.0);
        }
    }

    #[test]
    fn test_partial_overlap() {
        let gold  = LabelSet::new(vec![(0, 10)], vec![]);
        let pred  = vec![PredictedSpan::new(5, 15, SpanClass::Question)];
        let score = score_class(&pred, &gold, SpanClass::Question);
        assert_eq!(score.precision, 0.5);
        assert_eq!(score.recall, 0.5);
        assert_eq!(score.f1, 0.5);
    }

    #[test]
    fn test_wrong_class_does_not_count() {
        let gold  = LabelSet::new(vec![(0, 10)], vec![]);
        let pred  = vec![PredictedSpan::new(0, 10, SpanClass::Answer)];
        let score = score_class(&pred, &gold, SpanClass::Question);
        assert_eq!(score.recall, 0.0);
        assert_eq!(score.f1, 0.0);
    }
}
