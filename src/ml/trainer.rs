// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam.
//
//   - Training uses MyBackend (Autodiff<Wgpu>) for gradients
//   - model.valid() returns the model on MyInnerBackend (Wgpu)
//   - Validation loader is built for MyInnerBackend too
//   - Accuracy counts only positions whose target is not ignored
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{TokenBatch, TokenBatcher},
    dataset::TokenDataset,
};
use crate::domain::labels::IGNORE_INDEX;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{masked_cross_entropy, predicted_classes, TokenClassifierConfig, TokenClassifierModel};

type MyBackend      = burn::backend::Autodiff<burn::backend::Wgpu>;
type MyInnerBackend = burn::backend::Wgpu;

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: TokenDataset,
    val_dataset:   TokenDataset,
    ckpt_manager:  CheckpointManager,
) -> Result<()> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop(cfg, train_dataset, val_dataset, ckpt_manager, device)
}

fn train_loop(
    cfg:           &TrainConfig,
    train_dataset: TokenDataset,
    val_dataset:   TokenDataset,
    ckpt_manager:  CheckpointManager,
    device:        burn::backend::wgpu::WgpuDevice,
) -> Result<()> {
    let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: TokenClassifierModel<MyBackend> = model_config(cfg).init(&device);
    tracing::info!("Model ready: {} layers, d_model={}", cfg.num_layers, cfg.d_model);

    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader = DataLoaderBuilder::<MyBackend, _, _>::new(TokenBatcher::new())
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .set_device(device.clone())
        .build(train_dataset);

    let val_loader = DataLoaderBuilder::<MyInnerBackend, _, _>::new(TokenBatcher::new())
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .set_device(device.clone())
        .build(val_dataset);

    let mut best_val_loss = f64::INFINITY;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.input_ids, batch.attention_mask, batch.labels);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase (dropout disabled) ───────────────────────────────
        let model_valid = model.valid();

        let mut val_loss_sum = 0.0f64;
        let mut val_batches  = 0usize;
        let mut correct      = 0usize;
        let mut scored       = 0usize;

        for batch in val_loader.iter() {
            let (batch_loss, batch_correct, batch_scored) = evaluate_batch(&model_valid, batch);
            val_loss_sum += batch_loss;
            val_batches  += 1;
            correct      += batch_correct;
            scored       += batch_scored;
        }

        let avg_val_loss = if val_batches > 0 { val_loss_sum / val_batches as f64 } else { f64::NAN };
        let token_acc    = if scored > 0 { correct as f64 / scored as f64 } else { 0.0 };

        let row = EpochMetrics::new(epoch, avg_train_loss, avg_val_loss, token_acc);
        metrics.log(&row)?;

        tracing::info!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | token_acc={:.1}%",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss, token_acc * 100.0,
        );

        ckpt_manager.save_model(&model, epoch)?;
        if row.is_improvement(best_val_loss) {
            best_val_loss = row.val_loss;
            tracing::info!("New best validation loss at epoch {}", epoch);
        }
    }

    tracing::info!("Training complete! Metrics in '{}'", metrics.csv_path().display());
    Ok(())
}

/// Loss, correct predictions and scored positions for one validation batch.
fn evaluate_batch<B: Backend>(
    model: &TokenClassifierModel<B>,
    batch: TokenBatch<B>,
) -> (f64, usize, usize) {
    let logits = model.forward(batch.input_ids, batch.attention_mask);
    let loss: f64 = masked_cross_entropy(logits.clone(), batch.labels.clone())
        .into_scalar()
        .elem::<f64>();

    let keep = batch.labels.clone().not_equal_elem(IGNORE_INDEX);
    let hits = predicted_classes(logits).equal(batch.labels).bool_and(keep.clone());

    let correct: i64 = hits.int().sum().into_scalar().elem::<i64>();
    let scored:  i64 = keep.int().sum().into_scalar().elem::<i64>();

    (loss, correct as usize, scored as usize)
}

/// Model architecture for a training configuration
pub fn model_config(cfg: &TrainConfig) -> TokenClassifierConfig {
    TokenClassifierConfig::new(
        cfg.vocab_size, cfg.max_seq_len, cfg.d_model,
        cfg.num_heads, cfg.num_layers, cfg.d_ff, cfg.dropout,
    )
}
