// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a survey on disk and a tensor batch, and
// back from per-token predictions to evaluation spans.
//
//   survey.txt + survey.json
//       │
//       ▼
//   CorpusLoader      → reads text and label ranges
//       │
//       ▼
//   Chunker           → tokenizer windows with stride overlap
//       │
//       ▼
//   LabelAligner      → one TokenLabel per token (IntervalIndex)
//       │
//       ▼
//   TokenDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   TokenBatcher      → stacks samples into tensor batches
//
// and at inference time:
//
//   Chunker → model → ChunkMerger → (join_spans) → triples
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Loads .txt surveys and .json labels from a directory
pub mod loader;

/// Sorted-array overlap queries over label ranges
pub mod interval_index;

/// Character ranges → per-token labels
pub mod aligner;

/// Tokenizer windows with overlap
pub mod chunker;

/// First-seen-wins merge of overlapping chunk predictions
pub mod merger;

/// Implements Burn's Dataset trait for aligned windows
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
