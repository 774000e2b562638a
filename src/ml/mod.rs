// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn framework specific code lives here.
//
//   model.rs      — transformer encoder with a per-token
//                   3-class head and the masked loss
//   trainer.rs    — epoch loop: forward, masked loss, backward,
//                   Adam step, validation, checkpointing
//   inferencer.rs — loads a checkpoint and labels chunks
//   baseline.rs   — random word tagger, no model at all
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Transformer token classifier architecture
pub mod model;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Inference engine — loads checkpoint and labels tokens
pub mod inferencer;

/// Random Q/A tagger
pub mod baseline;
