// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes each subcommand to its
// use case. All printing for the user happens here.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use commands::{AlignArgs, Commands, EvaluateArgs, PredictArgs, TrainArgs};

use crate::application::{
    align_use_case::{align_document, label_counts},
    evaluate_use_case::evaluate,
    predict_use_case::{write_predictions, PredictUseCase},
    train_use_case::TrainUseCase,
};
use crate::data::{
    chunker::Chunker,
    loader::{load_document, load_labels},
    merger::join_spans,
};
use crate::domain::traits::SpanPredictor;
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::ml::baseline::RandomBaseline;

#[derive(Parser, Debug)]
#[command(
    name = "survey-qa-tagger",
    version,
    about = "Find survey questions and answers in plain text with a token classifier."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Align(args)    => run_align(args),
            Commands::Predict(args)  => run_predict(args),
            Commands::Evaluate(args) => run_evaluate(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    tracing::info!("Starting training on surveys in: {}", args.data_dir);
    TrainUseCase::new(args.into()).execute()?;
    println!("Training complete. Checkpoint saved.");
    Ok(())
}

fn run_align(args: AlignArgs) -> Result<()> {
    let mut doc = load_document(&args.text)?;
    if let Some(labels) = &args.labels {
        doc = doc.with_labels(load_labels(labels)?);
    }

    // Window settings: flags win, then the training config, then defaults
    let saved = CheckpointManager::new(&args.checkpoint_dir).load_config_if_present()?;
    let defaults = saved.unwrap_or_default();
    let max_len = args.max_seq_len.unwrap_or(defaults.max_seq_len);
    let stride  = args.stride.unwrap_or(defaults.stride);

    let tokenizer = TokenizerStore::new(&args.checkpoint_dir).load()?;
    let chunker   = Chunker::new(&tokenizer, max_len, stride)?;
    let rows      = align_document(&doc, &chunker)?;

    println!("chunk\tpos\tstart\tend\tlabel\ttext");
    for r in &rows {
        println!("{}\t{}\t{}\t{}\t{}\t{}", r.chunk, r.position, r.start, r.end, r.label, r.text);
    }
    let summary: Vec<String> = label_counts(&rows)
        .iter()
        .map(|(label, n)| format!("{}={}", label.name(), n))
        .collect();
    println!("\n{} tokens: {}", rows.len(), summary.join(" "));
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let text = fs::read_to_string(&args.text)
        .with_context(|| format!("Cannot read '{}'", args.text.display()))?;

    let predictor: Box<dyn SpanPredictor> = if args.baseline {
        tracing::info!("Using random baseline (seed {})", args.seed);
        Box::new(RandomBaseline::new(args.seed)?)
    } else {
        Box::new(PredictUseCase::from_checkpoint(&args.checkpoint_dir, args.join)?)
    };

    let spans = predictor.predict(&text)?;
    // The model path joins inside the use case; the baseline joins here
    let spans = if args.baseline && args.join { join_spans(&spans, &text) } else { spans };
    write_predictions(&spans, args.output.as_deref())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let text = fs::read_to_string(&args.text)
        .with_context(|| format!("Cannot read '{}'", args.text.display()))?;
    let labels = args
        .labels
        .clone()
        .unwrap_or_else(|| sibling_labels(&args.text));

    let scores = evaluate(&args.predictions, &labels, text.chars().count())?;

    println!("class\tprecision\trecall\tf1");
    for s in &scores {
        println!("{}\t{:.4}\t{:.4}\t{:.4}", s.class.tag(), s.precision, s.recall, s.f1);
    }
    Ok(())
}

fn sibling_labels(text: &Path) -> PathBuf {
    text.with_extension("json")
}
