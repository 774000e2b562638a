// ============================================================
// Layer 4 — Tokenizer Chunker
// ============================================================
// Tokenizes a whole survey and cuts it into model-sized windows.
//
// Transformer models have a maximum input length (max_seq_len).
// A survey is usually much longer, so we let the tokenizer's own
// truncation produce overflow windows, each sharing `stride`
// tokens with the previous one:
//
//   max_len = 6 (incl. [CLS]/[SEP]), stride = 2
//
//   Survey:   A B C D E F G H
//   Chunk 1:  [CLS] A B C D [SEP]
//   Chunk 2:  [CLS] C D E F [SEP]
//   Chunk 3:  [CLS] E F G H [SEP]
//
// Offsets are requested in CHARACTERS, not bytes, so they index
// the same positions as the label file and the evaluation harness.
//
// Reference: HuggingFace tokenizers — TruncationParams, Encoding
//            Devlin et al. (2019) BERT paper - sliding window approach

use anyhow::{bail, Result};
use tokenizers::{Encoding, PostProcessor, Tokenizer, TruncationParams};

use crate::domain::token::{Chunk, Token};

pub struct Chunker {
    /// Tokenizer configured to truncate with overflow
    tokenizer: Tokenizer,
    max_len:   usize,
    stride:    usize,
}

impl Chunker {
    /// Create a new Chunker around a tokenizer.
    ///
    /// Fails unless the window leaves room for at least one text token
    /// besides the special tokens, and `stride` is smaller than that room.
    pub fn new(tokenizer: &Tokenizer, max_len: usize, stride: usize) -> Result<Self> {
        let added = tokenizer
            .get_post_processor()
            .map_or(0, |p| p.added_tokens(false));
        check_window(max_len, stride, added)?;

        let mut tokenizer = tokenizer.clone();
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_len,
                stride,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Cannot configure truncation: {e}"))?;
        // Windows are padded later, when samples are built
        tokenizer.with_padding(None);

        Ok(Self { tokenizer, max_len, stride })
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Tokenize `text` and return every window, in document order.
    pub fn chunk(&self, text: &str) -> Result<Vec<Chunk>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let mut encoding = self
            .tokenizer
            .encode_char_offsets(text, true)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;

        let overflow = encoding.take_overflowing();
        let mut chunks = Vec::with_capacity(overflow.len() + 1);
        chunks.push(to_chunk(&encoding)?);
        for window in &overflow {
            chunks.push(to_chunk(window)?);
        }

        tracing::debug!(
            "Chunked {} chars into {} windows (max_len={}, stride={})",
            text.chars().count(),
            chunks.len(),
            self.max_len,
            self.stride,
        );
        Ok(chunks)
    }
}

/// Window settings the tokenizer can truncate with, given `added` special
/// tokens per window.
pub fn check_window(max_len: usize, stride: usize, added: usize) -> Result<()> {
    if max_len <= added {
        bail!("max_len ({max_len}) must exceed the {added} special tokens of each window");
    }
    let room = max_len - added;
    if stride >= room {
        bail!(
            "stride ({stride}) must be less than the {room} text tokens of a window \
             (max_len {max_len} minus {added} special tokens)"
        );
    }
    Ok(())
}

/// Copy the per-token metadata out of a tokenizer Encoding.
fn to_chunk(encoding: &Encoding) -> Result<Chunk> {
    let ids      = encoding.get_ids();
    let offsets  = encoding.get_offsets();
    let specials = encoding.get_special_tokens_mask();
    let words    = encoding.get_word_ids();

    if offsets.len() != ids.len() || specials.len() != ids.len() || words.len() != ids.len() {
        bail!(
            "Tokenizer returned inconsistent metadata: {} ids, {} offsets, {} special flags, {} word ids",
            ids.len(), offsets.len(), specials.len(), words.len()
        );
    }

    let tokens = (0..ids.len())
        .map(|i| Token {
            id:         ids[i],
            char_start: offsets[i].0,
            char_end:   offsets[i].1,
            is_special: specials[i] == 1,
            word_index: words[i],
        })
        .collect();

    Ok(Chunk::new(tokens))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aligner::LabelAligner;
    use crate::domain::labels::{LabelSet, TokenLabel};
    use crate::infra::tokenizer_store::TokenizerStore;

    const DOC: &str = "Do you feel anxious? Yes No";

    fn tokenizer(dir: &tempfile::TempDir) -> Tokenizer {
        let store = TokenizerStore::new(dir.path().to_string_lossy());
        store.build(&[DOC.to_string()], 100).unwrap()
    }

    #[test]
    fn test_short_text_gives_one_chunk_with_specials() {
        let dir    = tempfile::tempdir().unwrap();
        let chunks = Chunker::new(&tokenizer(&dir), 64, 8).unwrap().chunk(DOC).unwrap();

        assert_eq!(chunks.len(), 1);
        let tokens = &chunks[0].tokens;
        assert!(tokens.first().unwrap().is_special);
        assert!(tokens.last().unwrap().is_special);
        // Do you feel anxious ? Yes No + [CLS] + [SEP]
        assert_eq!(tokens.len(), 9);
        assert_eq!(tokens[4].offsets(), (12, 19));
        assert_eq!(tokens[5].offsets(), (19, 20));
    }

    #[test]
    fn test_survey_labels_through_real_tokenizer() {
        use TokenLabel::*;
        let dir    = tempfile::tempdir().unwrap();
        let chunks = Chunker::new(&tokenizer(&dir), 64, 8).unwrap().chunk(DOC).unwrap();

        let labels  = LabelSet::new(vec![(0, 20)], vec![(21, 24), (25, 27)]);
        let aligner = LabelAligner::from_labels(&labels, DOC.chars().count()).unwrap();
        let out     = aligner.align(&chunks).unwrap();

        assert_eq!(
            out[0],
            vec![Ignore, Question, Question, Question, Question, Question, Answer, Answer, Ignore]
        );
    }

    #[test]
    fn test_long_text_overflows_into_overlapping_windows() {
        let dir    = tempfile::tempdir().unwrap();
        let chunks = Chunker::new(&tokenizer(&dir), 6, 2).unwrap().chunk(DOC).unwrap();

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 6);
        }

        // neighbouring windows share tokens
        for pair in chunks.windows(2) {
            let left: Vec<_> = pair[0].tokens.iter().filter(|t| !t.is_special).map(|t| t.offsets()).collect();
            let right: Vec<_> = pair[1].tokens.iter().filter(|t| !t.is_special).map(|t| t.offsets()).collect();
            assert!(right.iter().any(|o| left.contains(o)));
        }

        // every word is covered by some window
        for word in [(0, 2), (3, 6), (7, 11), (12, 19), (19, 20), (21, 24), (25, 27)] {
            assert!(chunks.iter().any(|c| c.offsets().contains(&word)));
        }
    }

    #[test]
    fn test_offsets_are_characters() {
        let text   = "Êtes-vous prêt? Oui";
        let dir    = tempfile::tempdir().unwrap();
        let store  = TokenizerStore::new(dir.path().to_string_lossy());
        let tok    = store.build(&[text.to_string()], 100).unwrap();
        let chunks = Chunker::new(&tok, 64, 8).unwrap().chunk(text).unwrap();

        let last_word = chunks[0].tokens.iter().rev().find(|t| !t.is_special).unwrap();
        assert_eq!(last_word.offsets(), (16, 19));
    }

    #[test]
    fn test_empty_text_gives_no_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let chunks = Chunker::new(&tokenizer(&dir), 16, 4).unwrap().chunk("").unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_stride_must_be_less_than_max_len() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Chunker::new(&tokenizer(&dir), 8, 8).is_err());
    }

    #[test]
    fn test_stride_must_leave_room_after_special_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let tok = tokenizer(&dir);
        // 6 - [CLS] - [SEP] leaves 4 text tokens, so stride 4 cannot advance
        assert!(Chunker::new(&tok, 6, 4).is_err());
        assert!(Chunker::new(&tok, 6, 5).is_err());

        let chunks = Chunker::new(&tok, 6, 3).unwrap().chunk(DOC).unwrap();
        assert!(chunks.len() > 1);
    }

    #[test]
    fn test_window_must_hold_more_than_special_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let tok = tokenizer(&dir);
        assert!(Chunker::new(&tok, 1, 0).is_err());
        assert!(Chunker::new(&tok, 2, 0).is_err());
        assert!(Chunker::new(&tok, 3, 0).is_ok());
    }

    #[test]
    fn test_check_window_without_special_tokens() {
        assert!(check_window(4, 3, 0).is_ok());
        assert!(check_window(4, 4, 0).is_err());
        assert!(check_window(0, 0, 0).is_err());
    }
}
