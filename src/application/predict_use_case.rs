// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// Text in, evaluation triples out:
//
//   text
//     → Chunker          overlapping windows
//     → TokenClassifier  one label per token per window
//     → ChunkMerger      first-seen-wins, no duplicate spans
//     → join_spans       (optional) whole-question granularity
//   [(start, end, "Q" | "A"), ...]

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::data::{
    chunker::Chunker,
    merger::{join_spans, ChunkMerger, ChunkPrediction},
};
use crate::domain::span::PredictedSpan;
use crate::domain::traits::{SpanPredictor, TokenClassifier};
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::ml::inferencer::Inferencer;

pub struct PredictUseCase {
    chunker:    Chunker,
    classifier: Box<dyn TokenClassifier>,
    join:       bool,
}

impl PredictUseCase {
    pub fn new(chunker: Chunker, classifier: Box<dyn TokenClassifier>, join: bool) -> Self {
        Self { chunker, classifier, join }
    }

    /// Rebuild tokenizer, window settings and model from a training run.
    pub fn from_checkpoint(checkpoint_dir: &str, join: bool) -> Result<Self> {
        let ckpt      = CheckpointManager::new(checkpoint_dir);
        let cfg       = ckpt.load_config()?;
        let tokenizer = TokenizerStore::new(checkpoint_dir).load()?;
        let chunker   = Chunker::new(&tokenizer, cfg.max_seq_len, cfg.stride)?;
        let model     = Inferencer::from_checkpoint(&ckpt)?;
        Ok(Self::new(chunker, Box::new(model), join))
    }
}

impl SpanPredictor for PredictUseCase {
    fn predict(&self, text: &str) -> Result<Vec<PredictedSpan>> {
        predict_spans(text, &self.chunker, self.classifier.as_ref(), self.join)
    }
}

/// Run the classifier over every window of `text` and merge the results.
pub fn predict_spans(
    text:       &str,
    chunker:    &Chunker,
    classifier: &dyn TokenClassifier,
    join:       bool,
) -> Result<Vec<PredictedSpan>> {
    let chunks = chunker.chunk(text)?;
    let doc_len = text.chars().count();

    let mut predictions = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let labels = classifier
            .classify(chunk)
            .with_context(|| format!("Classifier failed on window {i}"))?;
        predictions.push(ChunkPrediction::from_chunk(i, chunk, &labels)?);
    }

    let spans = ChunkMerger::new(predictions, doc_len)
        .collect::<Result<Vec<_>, _>>()
        .context("Merged prediction falls outside the document")?;
    tracing::info!("Predicted {} spans over {} windows", spans.len(), chunks.len());

    if join {
        let joined = join_spans(&spans, text);
        tracing::debug!("Joined {} spans into {}", spans.len(), joined.len());
        Ok(joined)
    } else {
        Ok(spans)
    }
}

/// Write spans as a JSON array of [start, end, tag] triples,
/// to `output` or to stdout when no path is given.
pub fn write_predictions(spans: &[PredictedSpan], output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string(spans)?;
    match output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Cannot write predictions to '{}'", path.display()))?;
            tracing::info!("Wrote {} predictions to '{}'", spans.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Read a predictions file written by `write_predictions`
pub fn read_predictions(path: &Path) -> Result<Vec<PredictedSpan>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read predictions '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Malformed predictions in '{}'", path.display()))
}
