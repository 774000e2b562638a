use burn::data::dataset::Dataset;

use crate::domain::labels::{TokenLabel, IGNORE_INDEX};
use crate::domain::token::Chunk;

/// One tokenised, aligned and padded training window.
/// Padding positions carry attention 0 and the ignore target.
#[derive(Debug, Clone)]
pub struct TokenSample {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub labels:         Vec<i64>,
}

impl TokenSample {
    /// Pad (or cut) a chunk and its labels to exactly `max_len` positions.
    pub fn from_chunk(chunk: &Chunk, labels: &[TokenLabel], max_len: usize, pad_id: u32) -> Self {
        let mut input_ids: Vec<u32> = chunk.ids();
        let mut targets:   Vec<i64> = labels.iter().map(|l| l.target()).collect();
        input_ids.truncate(max_len);
        targets.truncate(max_len);

        let mut attention_mask = vec![1u32; input_ids.len()];
        while input_ids.len() < max_len {
            input_ids.push(pad_id);
            attention_mask.push(0);
        }
        targets.resize(max_len, IGNORE_INDEX);

        Self { input_ids, attention_mask, labels: targets }
    }

    /// Positions that take part in the loss
    pub fn scored_positions(&self) -> usize {
        self.labels.iter().filter(|&&l| l != IGNORE_INDEX).count()
    }
}

pub struct TokenDataset {
    samples: Vec<TokenSample>,
}

impl TokenDataset {
    pub fn new(samples: Vec<TokenSample>) -> Self { Self { samples } }
}

impl Dataset<TokenSample> for TokenDataset {
    fn get(&self, index: usize) -> Option<TokenSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::Token;

    #[test]
    fn test_padding_is_ignored() {
        let chunk  = Chunk::new(vec![Token::special(2), Token::word(7, 0, 3, 0), Token::special(3)]);
        let labels = [TokenLabel::Ignore, TokenLabel::Answer, TokenLabel::Ignore];
        let s = TokenSample::from_chunk(&chunk, &labels, 5, 0);

        assert_eq!(s.input_ids, vec![2, 7, 3, 0, 0]);
        assert_eq!(s.attention_mask, vec![1, 1, 1, 0, 0]);
        assert_eq!(s.labels, vec![IGNORE_INDEX, 2, IGNORE_INDEX, IGNORE_INDEX, IGNORE_INDEX]);
        assert_eq!(s.scored_positions(), 1);
    }

    #[test]
    fn test_dataset_get() {
        let chunk = Chunk::new(vec![Token::word(7, 0, 3, 0)]);
        let ds = TokenDataset::new(vec![TokenSample::from_chunk(&chunk, &[TokenLabel::Other], 2, 0)]);
        assert_eq!(ds.len(), 1);
        assert!(ds.get(0).is_some());
        assert!(ds.get(1).is_none());
    }
}
