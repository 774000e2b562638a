// ============================================================
// Layer 3 — Survey Document
// ============================================================
// One plain-text survey plus, when available, its ground truth.
// All label and prediction offsets are character offsets into
// `text` exactly as loaded — the text is never rewritten after
// loading, otherwise the offsets would drift.

use serde::{Deserialize, Serialize};

use crate::domain::labels::LabelSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyDocument {
    /// The filename or path, kept for traceability
    pub source: String,

    /// The canonical clean text
    pub text: String,

    /// Question/answer ranges, absent for unlabelled input
    pub labels: Option<LabelSet>,
}

impl SurveyDocument {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text:   text.into(),
            labels: None,
        }
    }

    pub fn with_labels(mut self, labels: LabelSet) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Length in characters, the unit of every offset
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// The text between two character offsets
    pub fn slice(&self, start: usize, end: usize) -> String {
        self.text
            .chars()
            .skip(start)
            .take(end.saturating_sub(start))
            .collect()
    }
}
