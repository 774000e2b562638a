// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Four subcommands:
//   train    : fit the token classifier on labelled surveys
//   align    : print the per-token training labels of one survey
//   predict  : write (start, end, tag) triples for a survey
//   evaluate : score a predictions file against a label file
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the token classifier on labelled surveys
    Train(TrainArgs),

    /// Show how label ranges map onto tokens
    Align(AlignArgs),

    /// Predict question and answer spans in a survey
    Predict(PredictArgs),

    /// Score predictions against ground truth
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory of survey .txt files with sibling .json labels
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Directory to save model checkpoints and tokenizer
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Pretrained tokenizer.json to use instead of building one
    #[arg(long)]
    pub tokenizer: Option<String>,

    /// Maximum tokens per window, special tokens included
    #[arg(long, default_value_t = 256)]
    pub max_seq_len: usize,

    /// Tokens shared by neighbouring windows
    #[arg(long, default_value_t = 64)]
    pub stride: usize,

    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 2e-4)]
    pub lr: f64,

    /// Hidden dimension of the transformer
    #[arg(long, default_value_t = 256)]
    pub d_model: usize,

    /// Attention heads; d_model must be divisible by this
    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    #[arg(long, default_value_t = 6)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 1024)]
    pub d_ff: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Vocabulary size when building a tokenizer from the corpus
    #[arg(long, default_value_t = 30522)]
    pub vocab_size: usize,

    /// Share of windows used for training, the rest validates
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,

    /// Seed for the split and the data loader shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:       a.data_dir,
            checkpoint_dir: a.checkpoint_dir,
            tokenizer:      a.tokenizer,
            max_seq_len:    a.max_seq_len,
            stride:         a.stride,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            d_model:        a.d_model,
            num_heads:      a.num_heads,
            num_layers:     a.num_layers,
            d_ff:           a.d_ff,
            dropout:        a.dropout,
            vocab_size:     a.vocab_size,
            train_fraction: a.train_fraction,
            seed:           a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct AlignArgs {
    /// Survey text file
    #[arg(long)]
    pub text: PathBuf,

    /// Label file; defaults to the text path with a .json extension
    #[arg(long)]
    pub labels: Option<PathBuf>,

    /// Directory holding tokenizer.json (and train_config.json)
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Window size; read from train_config.json when omitted
    #[arg(long)]
    pub max_seq_len: Option<usize>,

    /// Window overlap; read from train_config.json when omitted
    #[arg(long)]
    pub stride: Option<usize>,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Survey text file
    #[arg(long)]
    pub text: PathBuf,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Write predictions here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Fuse neighbouring word spans of the same class
    #[arg(long)]
    pub join: bool,

    /// Ignore the model and tag words at random
    #[arg(long)]
    pub baseline: bool,

    /// Seed for --baseline
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Predictions JSON written by `predict`
    #[arg(long)]
    pub predictions: PathBuf,

    /// Survey text file the predictions were made on
    #[arg(long)]
    pub text: PathBuf,

    /// Ground truth; defaults to the text path with a .json extension
    #[arg(long)]
    pub labels: Option<PathBuf>,
}
