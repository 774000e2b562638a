// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust types that describe the tagging problem:
// what a labelled range is, what a token looks like once the
// tokenizer has produced it, and what a prediction is.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, traits and errors
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

// A survey text loaded from disk, with optional ground truth
pub mod document;

// Character ranges, span classes and per-token labels
pub mod labels;

// Tokens and tokenizer windows
pub mod token;

// Output spans in the evaluation triple format
pub mod span;

// Typed errors for the alignment and merging contracts
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
