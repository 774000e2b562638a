// ============================================================
// Layer 2 — Align Use Case
// ============================================================
// Shows what the model will be trained on: every token of every
// window with its character range, its text and its label.
//
//   chunk  pos  start  end  label   text
//   0      1    0      2    Q       Do
//   0      5    15     19   IGNORE  ious

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::{aligner::LabelAligner, chunker::Chunker};
use crate::domain::document::SurveyDocument;
use crate::domain::labels::TokenLabel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignedToken {
    pub chunk:    usize,
    pub position: usize,
    pub start:    usize,
    pub end:      usize,
    pub label:    &'static str,
    pub text:     String,
}

/// Tokenize and align one labelled survey.
pub fn align_document(doc: &SurveyDocument, chunker: &Chunker) -> Result<Vec<AlignedToken>> {
    let labels = doc
        .labels
        .as_ref()
        .with_context(|| format!("'{}' has no label file", doc.source))?;

    let aligner = LabelAligner::from_labels(labels, doc.char_len())
        .with_context(|| format!("Bad labels for '{}'", doc.source))?;
    let chunks  = chunker.chunk(&doc.text)?;
    let aligned = aligner.align(&chunks)?;

    let rows = chunks
        .iter()
        .zip(&aligned)
        .enumerate()
        .flat_map(|(c, (chunk, labels))| {
            chunk.tokens.iter().zip(labels).enumerate().map(move |(p, (t, l))| {
                let (start, end) = t.offsets();
                AlignedToken {
                    chunk:    c,
                    position: p,
                    start,
                    end,
                    label:    l.name(),
                    text:     doc.slice(start, end),
                }
            })
        })
        .collect();

    Ok(rows)
}

/// Count of labels per kind, for the summary line
pub fn label_counts(rows: &[AlignedToken]) -> [(TokenLabel, usize); 4] {
    let count = |l: TokenLabel| rows.iter().filter(|r| r.label == l.name()).count();
    [
        (TokenLabel::Question, count(TokenLabel::Question)),
        (TokenLabel::Answer,   count(TokenLabel::Answer)),
        (TokenLabel::Other,    count(TokenLabel::Other)),
        (TokenLabel::Ignore,   count(TokenLabel::Ignore)),
    ]
}
