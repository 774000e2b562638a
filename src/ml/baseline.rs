// ============================================================
// Layer 5 — Random Baseline
// ============================================================
// The competition's starter submission: every word (\w+) is
// tagged Q, A, or nothing with equal probability. Useful as a
// floor when checking that a trained model actually learned
// something, and as a smoke test of the submission format.

use anyhow::Result;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use regex::Regex;
use std::sync::Mutex;

use crate::domain::labels::SpanClass;
use crate::domain::span::PredictedSpan;
use crate::domain::traits::SpanPredictor;

pub struct RandomBaseline {
    words: Regex,
    rng:   Mutex<StdRng>,
}

impl RandomBaseline {
    pub fn new(seed: u64) -> Result<Self> {
        Ok(Self {
            words: Regex::new(r"\w+")?,
            rng:   Mutex::new(StdRng::seed_from_u64(seed)),
        })
    }
}

impl SpanPredictor for RandomBaseline {
    fn predict(&self, text: &str) -> Result<Vec<PredictedSpan>> {
        let choices = [Some(SpanClass::Question), Some(SpanClass::Answer), None];
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| anyhow::anyhow!("baseline RNG lock poisoned"))?;

        // Regex reports byte offsets; the harness wants character offsets
        let mut char_pos  = 0usize;
        let mut byte_pos  = 0usize;
        let mut spans     = Vec::new();

        for m in self.words.find_iter(text) {
            char_pos += text[byte_pos..m.start()].chars().count();
            let start = char_pos;
            char_pos += m.as_str().chars().count();
            byte_pos  = m.end();

            if let Some(Some(class)) = choices.choose(&mut *rng) {
                spans.push(PredictedSpan::new(start, char_pos, *class));
            }
        }

        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_are_words_in_char_offsets() {
        let text  = "Êtes-vous prêt? Oui non";
        let spans = RandomBaseline::new(3).unwrap().predict(text).unwrap();
        let words = [(0, 4), (5, 9), (10, 14), (16, 19), (20, 23)];

        for span in &spans {
            assert!(words.contains(&(span.start, span.end)), "unexpected span {span:?}");
            assert!(span.is_within(text.chars().count()));
        }
    }

    #[test]
    fn test_same_seed_same_predictions() {
        let text = "How often do you exercise? Daily Weekly Never";
        let a = RandomBaseline::new(11).unwrap().predict(text).unwrap();
        let b = RandomBaseline::new(11).unwrap().predict(text).unwrap();
        assert_eq!(a, b);
    }
}
