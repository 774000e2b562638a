// ============================================================
// Layer 3 — Tokens and Chunks
// ============================================================
// The tokenizer turns a document into one or more Chunks.
// A long document overflows the model's window, so it is cut
// into overlapping windows that share `stride` tokens with
// their neighbour:
//
//   tokens:   t0 t1 t2 t3 t4 t5 t6 t7
//   chunk 0: [CLS] t0 t1 t2 t3 [SEP]
//   chunk 1: [CLS] t2 t3 t4 t5 [SEP]     (stride = 2)
//   chunk 2: [CLS] t4 t5 t6 t7 [SEP]
//
// Each token carries its character offsets into the ORIGINAL
// text, so overlapping chunks report identical offsets for the
// tokens they share.

/// A single token as reported by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Vocabulary id fed to the model
    pub id: u32,

    /// First character covered by this token
    pub char_start: usize,

    /// One past the last character covered by this token
    pub char_end: usize,

    /// Structural token ([CLS], [SEP], ...) with no text behind it
    pub is_special: bool,

    /// Index of the natural-language word this piece belongs to.
    /// Sub-word pieces of one word share the same index.
    pub word_index: Option<u32>,
}

impl Token {
    pub fn offsets(&self) -> (usize, usize) {
        (self.char_start, self.char_end)
    }
}

#[cfg(test)]
impl Token {
    pub fn word(id: u32, char_start: usize, char_end: usize, word_index: u32) -> Self {
        Self { id, char_start, char_end, is_special: false, word_index: Some(word_index) }
    }

    pub fn special(id: u32) -> Self {
        Self { id, char_start: 0, char_end: 0, is_special: true, word_index: None }
    }
}

/// One tokenizer window over a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    pub tokens: Vec<Token>,
}

impl Chunk {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.tokens.iter().map(|t| t.id).collect()
    }

    #[cfg(test)]
    pub fn offsets(&self) -> Vec<(usize, usize)> {
        self.tokens.iter().map(Token::offsets).collect()
    }
}
