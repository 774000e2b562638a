// ============================================================
// Layer 4 — Chunk Merger
// ============================================================
// At inference time a long survey is split into overlapping
// windows, so the same character span can be predicted once per
// window that covers it. The merger walks the windows in order
// and keeps the FIRST prediction for every (start, end) pair:
//
//   chunk 0:  (0,2)=Q  (3,6)=Q  (7,11)=O
//   chunk 1:           (3,6)=A  (7,11)=O  (12,19)=A
//
//   output:   (0,2,Q) (3,6,Q) (12,19,A)
//
// The (0,0) offset pair belongs to special and padding tokens
// and never produces a span.
//
// Spans are produced lazily: the merger is an Iterator that pulls
// chunk predictions from its source one at a time.
//
// Reference: Rust Book §13 (Iterators)

use std::collections::HashSet;

use crate::domain::error::SpanError;
use crate::domain::labels::TokenLabel;
use crate::domain::span::PredictedSpan;
use crate::domain::token::Chunk;

/// One token's predicted label together with its document offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictedToken {
    pub start: usize,
    pub end:   usize,
    pub label: TokenLabel,
}

/// All predictions for one chunk, in token order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkPrediction {
    pub tokens: Vec<PredictedToken>,
}

impl ChunkPrediction {
    pub fn new(tokens: Vec<PredictedToken>) -> Self {
        Self { tokens }
    }

    /// Pair a chunk's offsets with the labels a classifier produced for it.
    /// Offsets are copied verbatim from the tokenizer output.
    pub fn from_chunk(
        chunk_index: usize,
        chunk:       &Chunk,
        labels:      &[TokenLabel],
    ) -> Result<Self, SpanError> {
        if chunk.len() != labels.len() {
            return Err(SpanError::LengthMismatch {
                chunk:  chunk_index,
                tokens: chunk.len(),
                labels: labels.len(),
            });
        }
        if let Some(position) = labels.iter().position(|&l| l == TokenLabel::Ignore) {
            return Err(SpanError::IgnorePredicted { chunk: chunk_index, position });
        }
        let tokens = chunk
            .tokens
            .iter()
            .zip(labels)
            .map(|(t, &label)| {
                let (start, end) = t.offsets();
                PredictedToken { start, end, label }
            })
            .collect();
        Ok(Self::new(tokens))
    }
}

/// Lazy, duplicate-free merge of overlapping chunk predictions.
///
/// The set of emitted offsets belongs to this merger alone, so
/// each document gets a fresh one.
pub struct ChunkMerger<I> {
    chunks:  I,
    current: std::vec::IntoIter<PredictedToken>,
    emitted: HashSet<(usize, usize)>,
    doc_len: usize,
}

impl<I> ChunkMerger<I>
where
    I: Iterator<Item = ChunkPrediction>,
{
    pub fn new<C>(chunks: C, doc_len: usize) -> Self
    where
        C: IntoIterator<IntoIter = I>,
    {
        Self {
            chunks:  chunks.into_iter(),
            current: Vec::new().into_iter(),
            emitted: HashSet::new(),
            doc_len,
        }
    }

    fn next_token(&mut self) -> Option<PredictedToken> {
        loop {
            if let Some(token) = self.current.next() {
                return Some(token);
            }
            self.current = self.chunks.next()?.tokens.into_iter();
        }
    }
}

impl<I> Iterator for ChunkMerger<I>
where
    I: Iterator<Item = ChunkPrediction>,
{
    type Item = Result<PredictedSpan, SpanError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(token) = self.next_token() {
            let key = (token.start, token.end);

            if key == (0, 0) || !self.emitted.insert(key) {
                continue;
            }

            let Some(class) = token.label.span_class() else {
                continue;
            };

            let span = PredictedSpan::new(token.start, token.end, class);
            if !span.is_within(self.doc_len) {
                return Some(Err(SpanError::OutOfBounds {
                    start: span.start,
                    end:   span.end,
                    len:   self.doc_len,
                }));
            }
            return Some(Ok(span));
        }
        None
    }
}

/// Fuse neighbouring spans of the same class when only whitespace
/// separates them, turning per-word predictions into whole-question
/// and whole-answer spans. Input order does not matter; output is
/// sorted by start.
pub fn join_spans(spans: &[PredictedSpan], text: &str) -> Vec<PredictedSpan> {
    let chars: Vec<char> = text.chars().collect();
    let mut sorted = spans.to_vec();
    sorted.sort_by_key(|s| (s.start, s.end));

    let mut joined: Vec<PredictedSpan> = Vec::with_capacity(sorted.len());
    for span in sorted {
        if let Some(last) = joined.last_mut() {
            let gap_is_blank = last.end <= span.start
                && chars
                    .get(last.end..span.start)
                    .is_some_and(|gap| gap.iter().all(|c| c.is_whitespace()));
            if last.class == span.class && gap_is_blank {
                last.end = last.end.max(span.end);
                continue;
            }
        }
        joined.push(span);
    }
    joined
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::labels::SpanClass;

    fn tok(start: usize, end: usize, label: TokenLabel) -> PredictedToken {
        PredictedToken { start, end, label }
    }

    fn merge(chunks: Vec<ChunkPrediction>, doc_len: usize) -> Vec<PredictedSpan> {
        ChunkMerger::new(chunks, doc_len)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_first_chunk_wins_on_conflict() {
        let chunks = vec![
            ChunkPrediction::new(vec![tok(0, 4, TokenLabel::Other), tok(5, 9, TokenLabel::Question)]),
            ChunkPrediction::new(vec![tok(5, 9, TokenLabel::Answer), tok(10, 14, TokenLabel::Answer)]),
        ];
        let spans = merge(chunks, 20);
        assert_eq!(
            spans,
            vec![
                PredictedSpan::new(5, 9, SpanClass::Question),
                PredictedSpan::new(10, 14, SpanClass::Answer),
            ]
        );
    }

    #[test]
    fn test_padding_sentinel_never_emits() {
        let chunks = vec![
            ChunkPrediction::new(vec![tok(0, 0, TokenLabel::Question), tok(0, 3, TokenLabel::Answer), tok(0, 0, TokenLabel::Answer)]),
            ChunkPrediction::new(vec![tok(0, 0, TokenLabel::Answer), tok(4, 6, TokenLabel::Question)]),
        ];
        let spans = merge(chunks, 10);
        assert_eq!(spans.len(), 2);
        assert!(spans.iter().all(|s| (s.start, s.end) != (0, 0)));
    }

    #[test]
    fn test_other_claims_the_position() {
        // Once a span was seen as Other, a later chunk cannot turn it into a Question
        let chunks = vec![
            ChunkPrediction::new(vec![tok(2, 5, TokenLabel::Other)]),
            ChunkPrediction::new(vec![tok(2, 5, TokenLabel::Question)]),
        ];
        assert!(merge(chunks, 10).is_empty());
    }

    #[test]
    fn test_merge_is_deterministic() {
        let chunks = vec![
            ChunkPrediction::new(vec![tok(0, 2, TokenLabel::Question), tok(3, 6, TokenLabel::Answer)]),
            ChunkPrediction::new(vec![tok(3, 6, TokenLabel::Question), tok(7, 9, TokenLabel::Answer)]),
        ];
        assert_eq!(merge(chunks.clone(), 10), merge(chunks, 10));
    }

    #[test]
    fn test_chunk_order_never_adds_duplicates() {
        let a = ChunkPrediction::new(vec![tok(0, 2, TokenLabel::Question), tok(3, 6, TokenLabel::Answer)]);
        let b = ChunkPrediction::new(vec![tok(3, 6, TokenLabel::Question), tok(7, 9, TokenLabel::Answer)]);

        for order in [vec![a.clone(), b.clone()], vec![b, a]] {
            let spans = merge(order, 10);
            let distinct: HashSet<_> = spans.iter().map(|s| (s.start, s.end)).collect();
            assert_eq!(distinct.len(), spans.len());
            assert_eq!(spans.len(), 3);
        }
    }

    #[test]
    fn test_out_of_bounds_span_is_an_error() {
        let chunks = vec![ChunkPrediction::new(vec![tok(8, 12, TokenLabel::Answer)])];
        let result: Result<Vec<_>, _> = ChunkMerger::new(chunks, 10).collect();
        assert_eq!(result.unwrap_err(), SpanError::OutOfBounds { start: 8, end: 12, len: 10 });
    }

    #[test]
    fn test_merger_is_lazy() {
        let mut pulled = 0;
        let chunks = (0..3).map(|i| {
            pulled += 1;
            ChunkPrediction::new(vec![tok(i * 3, i * 3 + 2, TokenLabel::Question)])
        });
        let mut merger = ChunkMerger::new(chunks, 20);
        assert!(merger.next().is_some());
        drop(merger);
        assert_eq!(pulled, 1);
    }

    #[test]
    fn test_from_chunk_rejects_length_mismatch() {
        use crate::domain::token::Token;
        let chunk = Chunk::new(vec![Token::word(1, 0, 2, 0), Token::word(2, 3, 5, 1)]);
        let err = ChunkPrediction::from_chunk(3, &chunk, &[TokenLabel::Other]).unwrap_err();
        assert_eq!(err, SpanError::LengthMismatch { chunk: 3, tokens: 2, labels: 1 });
    }

    #[test]
    fn test_from_chunk_rejects_ignore_label() {
        use crate::domain::token::Token;
        let chunk = Chunk::new(vec![Token::word(1, 0, 2, 0), Token::word(2, 3, 5, 1)]);
        let err = ChunkPrediction::from_chunk(1, &chunk, &[TokenLabel::Question, TokenLabel::Ignore])
            .unwrap_err();
        assert_eq!(err, SpanError::IgnorePredicted { chunk: 1, position: 1 });
    }

    #[test]
    fn test_join_spans_fuses_words_of_one_question() {
        let text  = "Do you feel anxious? Yes No";
        let spans = vec![
            PredictedSpan::new(3, 6, SpanClass::Question),
            PredictedSpan::new(0, 2, SpanClass::Question),
            PredictedSpan::new(7, 11, SpanClass::Question),
            PredictedSpan::new(21, 24, SpanClass::Answer),
            PredictedSpan::new(25, 27, SpanClass::Answer),
        ];
        let joined = join_spans(&spans, text);
        assert_eq!(
            joined,
            vec![
                PredictedSpan::new(0, 11, SpanClass::Question),
                PredictedSpan::new(21, 27, SpanClass::Answer),
            ]
        );
    }

    #[test]
    fn test_join_spans_keeps_classes_apart() {
        let text  = "Yes No";
        let spans = vec![
            PredictedSpan::new(0, 3, SpanClass::Question),
            PredictedSpan::new(4, 6, SpanClass::Answer),
        ];
        assert_eq!(join_spans(&spans, text), spans);
    }

    #[test]
    fn test_join_spans_needs_blank_gap() {
        let text  = "Yes, No";
        let spans = vec![
            PredictedSpan::new(0, 3, SpanClass::Answer),
            PredictedSpan::new(5, 7, SpanClass::Answer),
        ];
        assert_eq!(join_spans(&spans, text).len(), 2);
    }
}
