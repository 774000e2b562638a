// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load labelled surveys       (Layer 4 - data)
//   Step 2: Build / load tokenizer      (Layer 6 - infra)
//   Step 3: Chunk + align labels        (Layer 4 - data)
//   Step 4: Train / validation split    (Layer 4 - data)
//   Step 5: Save config                 (Layer 6 - infra)
//   Step 6: Run training loop           (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{
    aligner::LabelAligner,
    chunker::{check_window, Chunker},
    dataset::{TokenDataset, TokenSample},
    loader::CorpusLoader,
    splitter::split_train_val,
};
use crate::domain::document::SurveyDocument;
use crate::domain::traits::DocumentSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    tokenizer_store::{pad_id, TokenizerStore, TEMPLATE_SPECIAL_TOKENS},
};
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// Serialisable so inference can rebuild the model and use the
// same window size and stride.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:       String,
    pub checkpoint_dir: String,
    /// Pretrained tokenizer.json; a word-level one is built when absent
    #[serde(default)]
    pub tokenizer:      Option<String>,
    pub max_seq_len:    usize,
    pub stride:         usize,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub d_model:        usize,
    pub num_heads:      usize,
    pub num_layers:     usize,
    pub d_ff:           usize,
    pub dropout:        f64,
    pub vocab_size:     usize,
    pub train_fraction: f64,
    pub seed:           u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:       "data".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            tokenizer:      None,
            max_seq_len:    256,
            stride:         64,
            batch_size:     8,
            epochs:         10,
            lr:             2e-4,
            d_model:        256,
            num_heads:      8,
            num_layers:     6,
            d_ff:           1024,
            dropout:        0.1,
            vocab_size:     30522,
            train_fraction: 0.8,
            seed:           42,
        }
    }
}

impl TrainConfig {
    /// Reject settings that would fail deep inside the pipeline
    pub fn validate(&self) -> Result<()> {
        // A pretrained tokenizer may add other specials; Chunker::new checks those
        check_window(self.max_seq_len, self.stride, TEMPLATE_SPECIAL_TOKENS)
            .context("Invalid --max-seq-len / --stride")?;
        if self.num_heads == 0 || self.d_model % self.num_heads != 0 {
            bail!("d_model ({}) must be divisible by num_heads ({})", self.d_model, self.num_heads);
        }
        if !(0.0..=1.0).contains(&self.train_fraction) {
            bail!("train_fraction ({}) must be within [0, 1]", self.train_fraction);
        }
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let mut cfg = self.config.clone();
        cfg.validate()?;

        // ── Step 1: Load labelled surveys ────────────────────────────────────
        tracing::info!("Loading surveys from '{}'", cfg.data_dir);
        let docs: Vec<SurveyDocument> = CorpusLoader::new(&cfg.data_dir)
            .load_all()?
            .into_iter()
            .filter(|d| {
                if d.labels.is_none() {
                    tracing::warn!("Skipping '{}': no label file", d.source);
                }
                d.labels.is_some()
            })
            .collect();
        if docs.is_empty() {
            bail!("No labelled surveys found in '{}'", cfg.data_dir);
        }
        tracing::info!("Loaded {} labelled surveys", docs.len());

        // ── Step 2: Build / load tokenizer ───────────────────────────────────
        let texts: Vec<String> = docs.iter().map(|d| d.text.clone()).collect();
        let tokenizer = TokenizerStore::new(&cfg.checkpoint_dir).load_or_build(
            cfg.tokenizer.as_deref().map(Path::new),
            &texts,
            cfg.vocab_size,
        )?;
        // The embedding table must cover every id the tokenizer can emit
        cfg.vocab_size = tokenizer.get_vocab_size(true);

        // ── Step 3: Chunk and align ──────────────────────────────────────────
        let chunker = Chunker::new(&tokenizer, cfg.max_seq_len, cfg.stride)?;
        let samples = build_samples(&docs, &chunker, pad_id(&tokenizer))?;
        let scored: usize = samples.iter().map(TokenSample::scored_positions).sum();
        tracing::info!("Built {} training windows ({} scored tokens)", samples.len(), scored);

        // ── Step 4: Train / validation split ─────────────────────────────────
        let (train_samples, val_samples) = split_train_val(samples, cfg.train_fraction, cfg.seed);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len()
        );
        let train_dataset = TokenDataset::new(train_samples);
        let val_dataset   = TokenDataset::new(val_samples);

        // ── Step 5: Save config for inference ────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(&cfg)?;

        // ── Step 6: Run training loop (Layer 5) ──────────────────────────────
        run_training(&cfg, train_dataset, val_dataset, ckpt_manager)
    }
}

/// Chunk every labelled survey and align its labels, one sample per window.
pub fn build_samples(
    docs:    &[SurveyDocument],
    chunker: &Chunker,
    pad_id:  u32,
) -> Result<Vec<TokenSample>> {
    let mut samples = Vec::new();

    for doc in docs {
        let Some(labels) = &doc.labels else { continue };

        let aligner = LabelAligner::from_labels(labels, doc.char_len())
            .with_context(|| format!("Bad labels for '{}'", doc.source))?;
        let chunks = chunker
            .chunk(&doc.text)
            .with_context(|| format!("Cannot tokenise '{}'", doc.source))?;
        let aligned = aligner
            .align(&chunks)
            .with_context(|| format!("Cannot align '{}'", doc.source))?;

        samples.extend(
            chunks
                .iter()
                .zip(&aligned)
                .map(|(chunk, labels)| TokenSample::from_chunk(chunk, labels, chunker.max_len(), pad_id)),
        );

        tracing::debug!("'{}' → {} windows", doc.source, chunks.len());
    }

    Ok(samples)
}
