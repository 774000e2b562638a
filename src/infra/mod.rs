// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by several layers:
//
//   checkpoint.rs      — model weights (Burn CompactRecorder)
//                        and train_config.json
//   tokenizer_store.rs — tokenizer.json: load, import or build
//   metrics.rs         — epoch CSV log and span scoring
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Tokenizer persistence
pub mod tokenizer_store;

/// Training metrics and span scores
pub mod metrics;
