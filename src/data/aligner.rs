// ============================================================
// Layer 4 — Label Aligner
// ============================================================
// Converts character-level ground truth into one label per token.
//
// Rules, applied to every token of a chunk in order:
//   - special token ([CLS], [SEP], ...)     → Ignore
//   - first piece of a new word             → Question / Answer / Other
//   - any later piece of the same word      → Ignore
//
// The first piece decides for the whole word. Its character range
// is checked against the question index first, then the answer
// index, so a token touching both is a Question.
//
// Example: "Do you feel anxious? Yes No"
//   Q = [0,20)  A = [21,24), [25,27)
//
//   [CLS]  Do  you  feel  anx  ##ious  ?   Yes  No  [SEP]
//    IGN   Q   Q    Q     Q    IGN     Q   A    A   IGN
//
// Each chunk restarts the word cursor, so a word split across a
// chunk boundary is labelled again in the next chunk.

use crate::data::interval_index::IntervalIndex;
use crate::domain::error::AlignError;
use crate::domain::labels::{LabelSet, LabeledRange, SpanClass, TokenLabel};
use crate::domain::token::Chunk;

pub struct LabelAligner {
    /// One index per class, in precedence order
    indexes: [(SpanClass, IntervalIndex); 2],
}

impl LabelAligner {
    pub fn new(questions: IntervalIndex, answers: IntervalIndex) -> Self {
        Self {
            indexes: [(SpanClass::Question, questions), (SpanClass::Answer, answers)],
        }
    }

    /// Build both indexes from a label file over a document of `doc_len` chars.
    pub fn from_labels(labels: &LabelSet, doc_len: usize) -> Result<Self, AlignError> {
        let (questions, answers): (Vec<LabeledRange>, Vec<LabeledRange>) =
            labels.ranges().partition(|r| r.class == SpanClass::Question);

        let questions = IntervalIndex::build(questions.iter().map(LabeledRange::bounds), doc_len)?;
        let answers   = IntervalIndex::build(answers.iter().map(LabeledRange::bounds), doc_len)?;

        if questions.is_empty() && answers.is_empty() {
            tracing::warn!("No non-empty label ranges: every word will be Other");
        } else {
            tracing::debug!("Indexed {} question and {} answer ranges", questions.len(), answers.len());
        }
        Ok(Self::new(questions, answers))
    }

    /// Label every token of every chunk.
    pub fn align(&self, chunks: &[Chunk]) -> Result<Vec<Vec<TokenLabel>>, AlignError> {
        chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| self.align_chunk(i, chunk))
            .collect()
    }

    /// Label the tokens of one chunk. `chunk_index` is only used in errors.
    pub fn align_chunk(&self, chunk_index: usize, chunk: &Chunk) -> Result<Vec<TokenLabel>, AlignError> {
        let mut last_word: Option<u32> = None;
        let mut labels = Vec::with_capacity(chunk.len());

        for (position, token) in chunk.tokens.iter().enumerate() {
            if token.is_special {
                labels.push(TokenLabel::Ignore);
                continue;
            }

            let word = token.word_index.ok_or(AlignError::MissingWordIndex {
                chunk: chunk_index,
                position,
            })?;

            if last_word == Some(word) {
                labels.push(TokenLabel::Ignore);
                continue;
            }

            labels.push(self.classify(token.char_start, token.char_end));
            last_word = Some(word);
        }

        Ok(labels)
    }

    fn classify(&self, start: usize, end: usize) -> TokenLabel {
        self.indexes
            .iter()
            .find(|(_, index)| index.overlaps(start, end))
            .map_or(TokenLabel::Other, |(class, _)| TokenLabel::from(*class))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::RangeError;
    use crate::domain::token::Token;

    const DOC: &str = "Do you feel anxious? Yes No";

    fn survey_labels() -> LabelSet {
        LabelSet::new(vec![(0, 20)], vec![(21, 24), (25, 27)])
    }

    fn aligner(labels: &LabelSet) -> LabelAligner {
        LabelAligner::from_labels(labels, DOC.chars().count()).unwrap()
    }

    /// [CLS] Do you feel anx ##ious ? Yes No [SEP]
    fn survey_chunk() -> Chunk {
        Chunk::new(vec![
            Token::special(2),
            Token::word(10, 0, 2, 0),
            Token::word(11, 3, 6, 1),
            Token::word(12, 7, 11, 2),
            Token::word(13, 12, 15, 3),
            Token::word(14, 15, 19, 3),
            Token::word(15, 19, 20, 4),
            Token::word(16, 21, 24, 5),
            Token::word(17, 25, 27, 6),
            Token::special(3),
        ])
    }

    #[test]
    fn test_survey_question_and_answers() {
        use TokenLabel::*;
        let labels = aligner(&survey_labels()).align_chunk(0, &survey_chunk()).unwrap();
        assert_eq!(
            labels,
            vec![Ignore, Question, Question, Question, Question, Ignore, Question, Answer, Answer, Ignore]
        );
    }

    #[test]
    fn test_output_has_one_label_per_token() {
        let chunk  = survey_chunk();
        let labels = aligner(&survey_labels()).align_chunk(0, &chunk).unwrap();
        assert_eq!(labels.len(), chunk.len());
    }

    #[test]
    fn test_continuation_pieces_are_always_ignored() {
        // Even when the continuation piece alone would overlap an answer
        let labels = LabelSet::new(vec![], vec![(15, 19)]);
        let out = aligner(&labels).align_chunk(0, &survey_chunk()).unwrap();
        assert_eq!(out[4], TokenLabel::Other);
        assert_eq!(out[5], TokenLabel::Ignore);
    }

    #[test]
    fn test_question_wins_over_answer() {
        let labels = LabelSet::new(vec![(0, 6)], vec![(3, 11)]);
        let out = aligner(&labels).align_chunk(0, &survey_chunk()).unwrap();
        // "you" [3,6) overlaps both
        assert_eq!(out[2], TokenLabel::Question);
        // "feel" [7,11) overlaps only the answer
        assert_eq!(out[3], TokenLabel::Answer);
    }

    #[test]
    fn test_zero_width_ranges_label_nothing() {
        let labels = LabelSet::new(vec![(3, 3)], vec![(21, 21)]);
        let out = aligner(&labels).align_chunk(0, &survey_chunk()).unwrap();
        assert!(out.iter().all(|l| matches!(l, TokenLabel::Other | TokenLabel::Ignore)));
    }

    #[test]
    fn test_cursor_resets_per_chunk() {
        // The same word opens both chunks and must be labelled in each
        let first  = Chunk::new(vec![Token::word(1, 0, 2, 0), Token::word(2, 3, 6, 1)]);
        let second = Chunk::new(vec![Token::word(2, 3, 6, 1), Token::word(3, 7, 11, 2)]);
        let out = aligner(&survey_labels()).align(&[first, second]).unwrap();
        assert_eq!(out[1][0], TokenLabel::Question);
    }

    #[test]
    fn test_out_of_bounds_label_is_rejected() {
        let labels = LabelSet::new(vec![(0, 21)], vec![(22, 25), (26, 28)]);
        let err = LabelAligner::from_labels(&labels, DOC.chars().count()).err().unwrap();
        assert_eq!(
            err,
            AlignError::Range(RangeError::OutOfBounds { start: 26, end: 28, len: 27 })
        );
    }

    #[test]
    fn test_text_token_without_word_index_is_an_error() {
        let mut token = Token::word(1, 0, 2, 0);
        token.word_index = None;
        let chunk = Chunk::new(vec![Token::special(2), token]);
        let err = aligner(&survey_labels()).align_chunk(4, &chunk).unwrap_err();
        assert_eq!(err, AlignError::MissingWordIndex { chunk: 4, position: 1 });
    }
}
