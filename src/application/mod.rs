// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one goal each. No model
// math and no printing here — only workflow coordination.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// Model (or baseline) predictions for a survey
pub mod predict_use_case;

// Token-by-token view of the label alignment
pub mod align_use_case;

// Local scoring of a predictions file
pub mod evaluate_use_case;
