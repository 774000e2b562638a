// ============================================================
// Layer 3 — Predicted Spans
// ============================================================
// The evaluation harness wants (start, end, tag) triples with
// tag in {"Q", "A"} and 0 <= start < end <= len(text).
// PredictedSpan serialises to exactly that triple:
//
//   [12, 19, "Q"]

use serde::{Deserialize, Serialize};

use crate::domain::labels::SpanClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize, SpanClass)", into = "(usize, usize, SpanClass)")]
pub struct PredictedSpan {
    pub start: usize,
    pub end:   usize,
    pub class: SpanClass,
}

impl PredictedSpan {
    pub fn new(start: usize, end: usize, class: SpanClass) -> Self {
        Self { start, end, class }
    }

    /// True when the span is non-empty and lies inside a text of `len` chars
    pub fn is_within(&self, len: usize) -> bool {
        self.start < self.end && self.end <= len
    }
}

impl From<(usize, usize, SpanClass)> for PredictedSpan {
    fn from((start, end, class): (usize, usize, SpanClass)) -> Self {
        Self { start, end, class }
    }
}

impl From<PredictedSpan> for (usize, usize, SpanClass) {
    fn from(span: PredictedSpan) -> Self {
        (span.start, span.end, span.class)
    }
}
