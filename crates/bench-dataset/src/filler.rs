//! Deterministic filler text for update payloads.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WORDS: [&str; 32] = [
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "commodo", "consequat",
];

/// Sentence-like text of exactly `len` characters, padded with spaces.
pub fn filler_text(len: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut text = String::with_capacity(len + 16);
    let mut sentence_start = true;

    while text.len() < len {
        let word = WORDS[rng.random_range(0..WORDS.len())];
        if sentence_start {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                text.extend(first.to_uppercase());
                text.push_str(chars.as_str());
            }
            sentence_start = false;
        } else {
            text.push_str(word);
        }

        if rng.random_range(0..8) == 0 {
            text.push_str(". ");
            sentence_start = true;
        } else {
            text.push(' ');
        }
    }

    text.truncate(len);
    format!("{text:<len$}")
}
