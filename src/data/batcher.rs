// ============================================================
// Layer 4 — Token Batcher
// ============================================================
// Implements Burn's Batcher trait to stack TokenSamples into
// tensors the model can consume.
//
//   Input:  Vec of N TokenSamples, each padded to length S
//   Output: TokenBatch with tensors of shape [N, S]
//
// Every sample is already padded to max_seq_len, so batching
// is a flatten + reshape.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::TokenSample;

/// A batch of aligned windows ready for the forward pass.
#[derive(Debug, Clone)]
pub struct TokenBatch<B: Backend> {
    /// Token ids — shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// 1 = real token, 0 = padding — shape: [batch_size, seq_len]
    pub attention_mask: Tensor<B, 2, Int>,

    /// Class targets, IGNORE_INDEX where excluded — shape: [batch_size, seq_len]
    pub labels: Tensor<B, 2, Int>,
}

#[derive(Clone, Debug, Default)]
pub struct TokenBatcher;

impl TokenBatcher {
    pub fn new() -> Self {
        Self
    }
}

impl<B: Backend> Batcher<B, TokenSample, TokenBatch<B>> for TokenBatcher {
    fn batch(&self, items: Vec<TokenSample>, device: &B::Device) -> TokenBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map(|s| s.input_ids.len()).unwrap_or(0);

        let input_flat: Vec<i64> = items
            .iter()
            .flat_map(|s| s.input_ids.iter().map(|&x| x as i64))
            .collect();

        let mask_flat: Vec<i64> = items
            .iter()
            .flat_map(|s| s.attention_mask.iter().map(|&x| x as i64))
            .collect();

        let label_flat: Vec<i64> = items
            .iter()
            .flat_map(|s| s.labels.iter().copied())
            .collect();

        let input_ids = Tensor::<B, 1, Int>::from_ints(
            input_flat.as_slice(), device
        ).reshape([batch_size, seq_len]);

        let attention_mask = Tensor::<B, 1, Int>::from_ints(
            mask_flat.as_slice(), device
        ).reshape([batch_size, seq_len]);

        let labels = Tensor::<B, 1, Int>::from_ints(
            label_flat.as_slice(), device
        ).reshape([batch_size, seq_len]);

        TokenBatch { input_ids, attention_mask, labels }
    }
}
