// ============================================================
// Layer 3 — Domain Errors
// ============================================================
// The alignment and merging steps have small, precise contracts,
// so their failures are typed. Everything above the domain layer
// wraps these into anyhow::Error with extra context.
//
// Reference: Rust Book §9 (Recoverable Errors with Result)

use thiserror::Error;

/// A label range that cannot be indexed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("range [{start}, {end}) starts after it ends")]
    Inverted { start: usize, end: usize },

    #[error("range [{start}, {end}) exceeds document length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },
}

/// Failures while turning label ranges into token labels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignError {
    #[error("invalid label range: {0}")]
    Range(#[from] RangeError),

    #[error("token {position} of chunk {chunk} has text but no word index")]
    MissingWordIndex { chunk: usize, position: usize },
}

/// A merged prediction that would be rejected by the evaluation harness.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanError {
    #[error("span [{start}, {end}) is not inside a document of {len} chars")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("chunk {chunk} has {tokens} tokens but {labels} predicted labels")]
    LengthMismatch { chunk: usize, tokens: usize, labels: usize },

    #[error("token {position} of chunk {chunk} was predicted IGNORE, which is a training-only label")]
    IgnorePredicted { chunk: usize, position: usize },
}
