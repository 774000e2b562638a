// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Rebuilds the trained model from its checkpoint and labels the
// tokens of one chunk at a time.
use anyhow::Result;
use burn::prelude::*;

use crate::domain::labels::TokenLabel;
use crate::domain::token::Chunk;
use crate::domain::traits::TokenClassifier;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{predicted_classes, TokenClassifierModel};
use crate::ml::trainer::model_config;

type InferBackend = burn::backend::Wgpu;

pub struct Inferencer {
    model:       TokenClassifierModel<InferBackend>,
    max_seq_len: usize,
    device:      burn::backend::wgpu::WgpuDevice,
}

impl Inferencer {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        let mut cfg = ckpt_manager.load_config()?;
        cfg.dropout = 0.0;
        let model: TokenClassifierModel<InferBackend> = model_config(&cfg).init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");
        Ok(Self { model, max_seq_len: cfg.max_seq_len, device })
    }
}

impl TokenClassifier for Inferencer {
    fn classify(&self, chunk: &Chunk) -> Result<Vec<TokenLabel>> {
        if chunk.is_empty() {
            return Ok(Vec::new());
        }
        if chunk.len() > self.max_seq_len {
            anyhow::bail!(
                "Chunk of {} tokens exceeds the model window of {}",
                chunk.len(),
                self.max_seq_len
            );
        }

        let seq_len = chunk.len();
        let ids: Vec<i64> = chunk.tokens.iter().map(|t| t.id as i64).collect();
        let mask = vec![1i64; seq_len];

        let input_ids = Tensor::<InferBackend, 1, Int>::from_ints(
            ids.as_slice(), &self.device,
        ).reshape([1, seq_len]);
        let attention_mask = Tensor::<InferBackend, 1, Int>::from_ints(
            mask.as_slice(), &self.device,
        ).reshape([1, seq_len]);

        let logits  = self.model.forward(input_ids, attention_mask);
        let classes = predicted_classes(logits)
            .into_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .map_err(|e| anyhow::anyhow!("Cannot read predictions: {e:?}"))?;

        tracing::debug!("Classified chunk of {} tokens", seq_len);
        Ok(classes.into_iter().map(TokenLabel::from_class_index).collect())
    }
}
