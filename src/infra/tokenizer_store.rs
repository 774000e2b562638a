// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Keeps the tokenizer used for training and inference in sync.
//
// Three ways to get a tokenizer, in order of preference:
//   1. tokenizer.json already in the checkpoint directory
//   2. a pretrained tokenizer.json supplied by the user,
//      copied into the checkpoint directory
//   3. a word-level tokenizer built from the training corpus
//
// The built tokenizer mirrors the BERT layout: BertNormalizer,
// whitespace pre-tokenization, and a [CLS] $A [SEP] template so
// every window carries its special tokens.
//
// Reference: HuggingFace tokenizers JSON format

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

/// Special tokens and their fixed ids at the front of the vocabulary
const SPECIAL_TOKENS: [&str; 5] = ["[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]"];

/// Tokens the built template adds to every window: [CLS] and [SEP].
pub const TEMPLATE_SPECIAL_TOKENS: usize = 2;

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join("tokenizer.json")
    }

    /// Load the stored tokenizer, or create one from `pretrained` / the corpus.
    pub fn load_or_build(
        &self,
        pretrained: Option<&Path>,
        texts:      &[String],
        vocab_size: usize,
    ) -> Result<Tokenizer> {
        if self.path().exists() {
            tracing::info!("Loading existing tokenizer from disk");
            return self.load();
        }
        match pretrained {
            Some(src) => {
                tracing::info!("Using pretrained tokenizer '{}'", src.display());
                self.import(src)
            }
            None => {
                tracing::info!("Building new tokenizer (vocab_size={})", vocab_size);
                self.build(texts, vocab_size)
            }
        }
    }

    /// Load a previously saved tokenizer from JSON file
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.path();
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", path.display(), e
            ))
    }

    /// Copy a pretrained tokenizer.json into the store and load it
    pub fn import(&self, src: &Path) -> Result<Tokenizer> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        std::fs::copy(src, self.path())
            .with_context(|| format!("Cannot copy tokenizer from '{}'", src.display()))?;
        self.load()
    }

    /// Build a word-level vocabulary from the corpus and write it
    /// as a tokenizer JSON next to the checkpoints.
    pub fn build(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        // ── Step 1: Count words ──────────────────────────────────────────────
        let mut freq: HashMap<String, usize> = HashMap::new();
        for text in texts {
            for word in text.split_whitespace() {
                let w = word.to_lowercase();
                let w = w.trim_matches(|c: char| !c.is_alphanumeric());
                if !w.is_empty() {
                    *freq.entry(w.to_string()).or_insert(0) += 1;
                }
            }
        }

        // Most frequent first; ties broken alphabetically so builds are reproducible
        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(vocab_size.saturating_sub(SPECIAL_TOKENS.len()));

        // ── Step 2: Vocabulary, specials first ───────────────────────────────
        let mut vocab = serde_json::Map::new();
        for (id, tok) in SPECIAL_TOKENS.iter().enumerate() {
            vocab.insert(tok.to_string(), serde_json::json!(id));
        }
        for (word, _) in &words {
            if !vocab.contains_key(word) {
                let id = vocab.len();
                vocab.insert(word.clone(), serde_json::json!(id));
            }
        }
        let size = vocab.len();

        let added_tokens: Vec<serde_json::Value> = SPECIAL_TOKENS
            .iter()
            .enumerate()
            .map(|(id, tok)| serde_json::json!({
                "id": id, "content": tok, "single_word": false, "lstrip": false,
                "rstrip": false, "normalized": false, "special": true
            }))
            .collect();

        let cls = special_id("[CLS]");
        let sep = special_id("[SEP]");

        // ── Step 3: Write tokenizer JSON in HuggingFace format ───────────────
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": added_tokens,
            "normalizer": {
                "type": "BertNormalizer",
                "clean_text": true,
                "handle_chinese_chars": true,
                "strip_accents": null,
                "lowercase": true
            },
            "pre_tokenizer": {
                "type": "Whitespace"
            },
            "post_processor": {
                "type": "TemplateProcessing",
                "single": [
                    {"SpecialToken": {"id": "[CLS]", "type_id": 0}},
                    {"Sequence": {"id": "A", "type_id": 0}},
                    {"SpecialToken": {"id": "[SEP]", "type_id": 0}}
                ],
                "pair": [
                    {"SpecialToken": {"id": "[CLS]", "type_id": 0}},
                    {"Sequence": {"id": "A", "type_id": 0}},
                    {"SpecialToken": {"id": "[SEP]", "type_id": 0}},
                    {"Sequence": {"id": "B", "type_id": 1}},
                    {"SpecialToken": {"id": "[SEP]", "type_id": 1}}
                ],
                "special_tokens": {
                    "[CLS]": {"id": "[CLS]", "ids": [cls], "tokens": ["[CLS]"]},
                    "[SEP]": {"id": "[SEP]", "ids": [sep], "tokens": ["[SEP]"]}
                }
            },
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "[UNK]"
            }
        });

        let tok_path = self.path();
        std::fs::write(
            &tok_path,
            serde_json::to_string_pretty(&tokenizer_json)?
        ).with_context(|| "Cannot write tokenizer JSON")?;

        tracing::info!(
            "Tokenizer built with {} entries, saved to '{}'",
            size,
            tok_path.display()
        );

        Tokenizer::from_file(&tok_path)
            .map_err(|e| anyhow::anyhow!("Cannot reload tokenizer: {e}"))
    }
}

fn special_id(token: &str) -> usize {
    SPECIAL_TOKENS.iter().position(|t| *t == token).unwrap_or(0)
}

/// Id of the padding token, falling back to 0
pub fn pad_id(tokenizer: &Tokenizer) -> u32 {
    tokenizer.token_to_id("[PAD]").unwrap_or(0)
}
