// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Loads survey texts from a directory. Each `name.txt` may have a
// sibling `name.json` holding its question/answer ranges:
//
//   data/
//     survey_01.txt     ← canonical clean text
//     survey_01.json    ← {"q": [[s, e], ...], "a": [[s, e], ...]}
//     survey_02.txt     ← unlabelled, still usable for prediction
//
// Texts are read verbatim: any rewriting would shift the offsets
// in the label files.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::domain::document::SurveyDocument;
use crate::domain::labels::LabelSet;
use crate::domain::traits::DocumentSource;

/// Loads every .txt survey (and its labels) from a directory.
pub struct CorpusLoader {
    dir: String,
}

impl CorpusLoader {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DocumentSource for CorpusLoader {
    fn load_all(&self) -> Result<Vec<SurveyDocument>> {
        let dir = Path::new(&self.dir);

        if !dir.exists() {
            tracing::warn!(
                "Data directory '{}' does not exist — returning empty corpus",
                self.dir
            );
            return Ok(Vec::new());
        }

        let mut paths: Vec<_> = fs::read_dir(dir)
            .with_context(|| format!("Cannot read directory '{}'", self.dir))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("txt"))
            .collect();
        // read_dir order is platform dependent
        paths.sort();

        let mut docs = Vec::with_capacity(paths.len());
        for path in paths {
            match load_document(&path) {
                Ok(doc) => {
                    tracing::debug!(
                        "Loaded: {} ({} chars, labelled: {})",
                        doc.source,
                        doc.char_len(),
                        doc.labels.is_some()
                    );
                    docs.push(doc);
                }
                Err(e) => {
                    tracing::warn!("Skipping '{}': {:#}", path.display(), e);
                }
            }
        }

        Ok(docs)
    }
}

/// Load one text file plus its sibling label file, if any.
pub fn load_document(path: &Path) -> Result<SurveyDocument> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    let doc = SurveyDocument::new(path.display().to_string(), text);

    let label_path = path.with_extension("json");
    if label_path.exists() {
        Ok(doc.with_labels(load_labels(&label_path)?))
    } else {
        Ok(doc)
    }
}

/// Parse a label file of the form {"q": [[s, e], ...], "a": [[s, e], ...]}
pub fn load_labels(path: &Path) -> Result<LabelSet> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read labels '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Malformed labels in '{}'", path.display()))
}
