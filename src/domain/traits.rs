// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits, so the
// trained transformer, the random baseline and test stubs are
// interchangeable.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::document::SurveyDocument;
use crate::domain::labels::TokenLabel;
use crate::domain::span::PredictedSpan;
use crate::domain::token::Chunk;

// ─── DocumentSource ───────────────────────────────────────────────────────────
/// Any component that can load survey documents.
///
/// Implementations:
///   - CorpusLoader → a directory of .txt files with .json labels
pub trait DocumentSource {
    fn load_all(&self) -> Result<Vec<SurveyDocument>>;
}

// ─── TokenClassifier ──────────────────────────────────────────────────────────
/// Predicts one label per token of a chunk.
///
/// The returned Vec must have exactly `chunk.len()` entries.
/// Predictions are never `TokenLabel::Ignore`; the merger rejects them.
pub trait TokenClassifier {
    fn classify(&self, chunk: &Chunk) -> Result<Vec<TokenLabel>>;
}

// ─── SpanPredictor ────────────────────────────────────────────────────────────
/// End-to-end predictor: text in, evaluation triples out.
///
/// Implementations:
///   - PredictUseCase → tokenizer + model + chunk merger
///   - RandomBaseline → random tags on every word
pub trait SpanPredictor {
    fn predict(&self, text: &str) -> Result<Vec<PredictedSpan>>;
}
