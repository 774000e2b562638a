// ============================================================
// Layer 2 — Evaluate Use Case
// ============================================================
// Scores a predictions file against a label file locally,
// before anything is uploaded for remote evaluation.

use anyhow::{bail, Result};
use std::path::Path;

use crate::application::predict_use_case::read_predictions;
use crate::data::loader::load_labels;
use crate::infra::metrics::{score_spans, ClassScore};

/// Check bounds, then score. `doc_len` is the survey length in chars.
pub fn evaluate(predictions: &Path, labels: &Path, doc_len: usize) -> Result<[ClassScore; 2]> {
    let spans = read_predictions(predictions)?;
    let gold  = load_labels(labels)?;

    if let Some(bad) = spans.iter().find(|s| !s.is_within(doc_len)) {
        bail!(
            "Prediction [{}, {}) is outside the document ({} chars); the harness would reject it",
            bad.start, bad.end, doc_len
        );
    }

    let scores = score_spans(&spans, &gold);
    for s in &scores {
        tracing::info!(
            "{}: precision={:.4} recall={:.4} f1={:.4}",
            s.class.tag(), s.precision, s.recall, s.f1
        );
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_evaluate_files() {
        let dir = tempfile::tempdir().unwrap();
        let pred = dir.path().join("pred.json");
        let gold = dir.path().join("gold.json");
        fs::write(&pred, r#"[[0,20,"Q"],[21,24,"A"]]"#).unwrap();
        fs::write(&gold, r#"{"q": [[0, 20]], "a": [[21, 24], [25, 27]]}"#).unwrap();

        let [q, a] = evaluate(&pred, &gold, 27).unwrap();
        assert_eq!(q.f1, 1.0);
        assert_eq!(a.precision, 1.0);
        assert!(a.recall < 1.0);
    }

    #[test]
    fn test_out_of_bounds_prediction_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let pred = dir.path().join("pred.json");
        let gold = dir.path().join("gold.json");
        fs::write(&pred, r#"[[20,40,"Q"]]"#).unwrap();
        fs::write(&gold, r#"{"q": [], "a": []}"#).unwrap();

        assert!(evaluate(&pred, &gold, 27).is_err());
    }
}
