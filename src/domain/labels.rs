// ============================================================
// Layer 3 — Labels
// ============================================================
// Ground truth arrives as two lists of character ranges over the
// clean survey text, one for questions and one for answers:
//
//   {"q": [[0, 20], ...], "a": [[21, 24], [25, 27], ...]}
//
// Every range is half-open: [start, end).
//
// During training each token gets a TokenLabel. Ignore marks
// positions that take no part in the loss (special tokens and
// every sub-word piece after the first one of a word). Other is
// a real negative class and must never be confused with Ignore.

use serde::{Deserialize, Serialize};

/// Target value for positions excluded from the loss.
pub const IGNORE_INDEX: i64 = -100;

/// Number of classes the model predicts: Other, Question, Answer.
pub const NUM_CLASSES: usize = 3;

/// The two kinds of span the competition asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpanClass {
    #[serde(rename = "Q")]
    Question,
    #[serde(rename = "A")]
    Answer,
}

impl SpanClass {
    /// The single-letter tag used by the evaluation harness
    pub fn tag(self) -> &'static str {
        match self {
            SpanClass::Question => "Q",
            SpanClass::Answer   => "A",
        }
    }
}

/// A classified character range of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabeledRange {
    pub start: usize,
    pub end:   usize,
    pub class: SpanClass,
}

impl LabeledRange {
    pub fn new(start: usize, end: usize, class: SpanClass) -> Self {
        Self { start, end, class }
    }

    pub fn bounds(&self) -> (usize, usize) {
        (self.start, self.end)
    }
}

/// The label file for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSet {
    /// Question ranges
    #[serde(rename = "q", default)]
    pub questions: Vec<(usize, usize)>,

    /// Answer ranges
    #[serde(rename = "a", default)]
    pub answers: Vec<(usize, usize)>,
}

impl LabelSet {
    #[cfg(test)]
    pub fn new(questions: Vec<(usize, usize)>, answers: Vec<(usize, usize)>) -> Self {
        Self { questions, answers }
    }

    /// The ranges of one class
    pub fn of(&self, class: SpanClass) -> &[(usize, usize)] {
        match class {
            SpanClass::Question => &self.questions,
            SpanClass::Answer   => &self.answers,
        }
    }

    /// Every range of both classes, questions first
    pub fn ranges(&self) -> impl Iterator<Item = LabeledRange> + '_ {
        let q = self.questions.iter().map(|&(s, e)| LabeledRange::new(s, e, SpanClass::Question));
        let a = self.answers.iter().map(|&(s, e)| LabeledRange::new(s, e, SpanClass::Answer));
        q.chain(a)
    }
}

/// Per-token label used both as a training target and as a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenLabel {
    Ignore,
    Other,
    Question,
    Answer,
}

impl TokenLabel {
    /// Encode as a cross-entropy target
    pub fn target(self) -> i64 {
        match self {
            TokenLabel::Ignore   => IGNORE_INDEX,
            TokenLabel::Other    => 0,
            TokenLabel::Question => 1,
            TokenLabel::Answer   => 2,
        }
    }

    /// Decode a class index produced by the model's argmax.
    /// Anything outside 0..NUM_CLASSES decodes to Other.
    pub fn from_class_index(index: i64) -> Self {
        match index {
            1 => TokenLabel::Question,
            2 => TokenLabel::Answer,
            _ => TokenLabel::Other,
        }
    }

    pub fn span_class(self) -> Option<SpanClass> {
        match self {
            TokenLabel::Question => Some(SpanClass::Question),
            TokenLabel::Answer   => Some(SpanClass::Answer),
            TokenLabel::Ignore | TokenLabel::Other => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TokenLabel::Ignore   => "IGNORE",
            TokenLabel::Other    => "O",
            TokenLabel::Question => "Q",
            TokenLabel::Answer   => "A",
        }
    }
}

impl From<SpanClass> for TokenLabel {
    fn from(class: SpanClass) -> Self {
        match class {
            SpanClass::Question => TokenLabel::Question,
            SpanClass::Answer   => TokenLabel::Answer,
        }
    }
}
