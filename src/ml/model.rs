// ============================================================
// Layer 5 — Token Classification Transformer
// ============================================================
// A BERT-style encoder with a per-token classification head:
//
//   input_ids [B, S]
//     → token embedding + position embedding
//     → N × EncoderBlock (self-attention with padding mask, GELU FFN)
//     → LayerNorm
//     → Linear(d_model → 3)         Other / Question / Answer
//   logits [B, S, 3]
//
// Loss is cross-entropy over positions whose target is not
// IGNORE_INDEX; ignored positions add nothing to the loss.
//
// Reference: Burn Book §3 (Building Blocks)
//            Vaswani et al. (2017) Attention Is All You Need

use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation,
};

use crate::domain::labels::{IGNORE_INDEX, NUM_CLASSES};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct TokenClassifierConfig {
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    pub dropout:     f64,
}

impl TokenClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TokenClassifierModel<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.d_model).init(device);
        let classifier = LinearConfig::new(self.d_model, NUM_CLASSES).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        TokenClassifierModel {
            token_embedding, position_embedding, layers,
            final_norm, classifier, dropout,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    /// `pad_mask` is true at padding positions, which no token may attend to.
    pub fn forward(&self, x: Tensor<B, 3>, pad_mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let input = MhaInput::self_attn(x.clone()).mask_pad(pad_mask);
        let attn_output = self.self_attn.forward(input).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct TokenClassifierModel<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub layers:             Vec<EncoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub classifier:         Linear<B>,
    pub dropout:            Dropout,
}

impl<B: Backend> TokenClassifierModel<B> {
    /// input_ids, attention_mask: [batch, seq_len] → logits: [batch, seq_len, NUM_CLASSES]
    pub fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 3> {
        let [batch_size, seq_len] = input_ids.dims();
        let pad_mask = attention_mask.equal_elem(0);

        let tok_emb = self.token_embedding.forward(input_ids);

        // Self-attention is permutation-invariant, so position must be injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .reshape([1, seq_len])
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for layer in &self.layers {
            x = layer.forward(x, pad_mask.clone());
        }
        let x = self.final_norm.forward(x);

        self.classifier.forward(x)
    }

    /// Forward pass plus the masked cross-entropy loss.
    pub fn forward_loss(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
        labels:         Tensor<B, 2, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 3>) {
        let logits = self.forward(input_ids, attention_mask);
        let loss   = masked_cross_entropy(logits.clone(), labels);
        (loss, logits)
    }
}

/// Mean cross-entropy over positions whose target is not IGNORE_INDEX.
///
/// logits: [batch, seq_len, classes], targets: [batch, seq_len]
pub fn masked_cross_entropy<B: Backend>(logits: Tensor<B, 3>, targets: Tensor<B, 2, Int>) -> Tensor<B, 1> {
    let [batch_size, seq_len, classes] = logits.dims();
    let n = batch_size * seq_len;

    let logits  = logits.reshape([n, classes]);
    let targets = targets.reshape([n]);

    let keep = targets.clone().not_equal_elem(IGNORE_INDEX).float();
    // Ignored rows still need a valid index for the gather; their loss is masked out
    let safe = targets.clamp(0, classes as i64 - 1).reshape([n, 1]);

    let log_probs = activation::log_softmax(logits, 1);
    let picked    = log_probs.gather(1, safe).reshape([n]);

    let scored = keep.clone().sum().clamp_min(1.0);
    (picked * keep).sum().neg() / scored
}

/// Argmax class per position: [batch, seq_len, classes] → [batch, seq_len]
pub fn predicted_classes<B: Backend>(logits: Tensor<B, 3>) -> Tensor<B, 2, Int> {
    let [batch_size, seq_len, _] = logits.dims();
    logits.argmax(2).reshape([batch_size, seq_len])
}
