//! Text statistics over whitespace-separated words.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Aggregate statistics for a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    /// Total number of words.
    pub word_count: usize,
    /// Mean word length, truncated to two decimal places.
    pub average_word_length: f64,
    /// The longest word(s), lowercased, in first-seen order without duplicates.
    pub longest_words: Vec<String>,
    /// How often each lowercased word appears.
    pub word_frequency: HashMap<String, usize>,
}

impl TextAnalysis {
    fn empty() -> Self {
        Self {
            word_count: 0,
            average_word_length: 0.0,
            longest_words: Vec::new(),
            word_frequency: HashMap::new(),
        }
    }
}

/// Compute word count, average length, longest words and a frequency map.
///
/// Words are split on whitespace and lowercased, so "The" and "the"
/// count as the same word.
pub fn analyze_text(text: &str) -> TextAnalysis {
    let words: Vec<&str> = text.split_whitespace().collect();

    let mut analysis = TextAnalysis::empty();
    if words.is_empty() {
        return analysis;
    }

    let mut total_letters = 0;
    let mut max_word_length = 0;

    for word in &words {
        let lower = word.to_lowercase();
        let length = lower.chars().count();

        *analysis.word_frequency.entry(lower.clone()).or_insert(0) += 1;
        total_letters += length;

        if length > max_word_length {
            max_word_length = length;
            analysis.longest_words = vec![lower];
        } else if length == max_word_length && !analysis.longest_words.contains(&lower) {
            analysis.longest_words.push(lower);
        }
    }

    analysis.word_count = words.len();

    // Truncate rather than round, for stable two-decimal output.
    let average = total_letters as f64 / words.len() as f64;
    analysis.average_word_length = (average * 100.0).trunc() / 100.0;

    analysis
}
