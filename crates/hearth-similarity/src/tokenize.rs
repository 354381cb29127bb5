//! Tokenization and term-frequency vectors for content similarity.

use std::collections::HashMap;

/// Fixed stop-word list dropped from content vectors.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "was", "with", "this", "that", "from", "have", "has", "had",
    "not", "but", "all", "can", "will", "one", "two", "our", "your", "their", "his", "her",
    "its", "they", "them", "you", "she", "him", "who", "what", "when", "where", "which", "how",
    "been", "were", "than", "then", "there", "here", "also", "into", "over", "about", "after",
    "before", "between", "each", "other", "some", "such", "only", "very", "more", "most", "any",
];

/// Tokenize text: split on whitespace, lowercase, strip punctuation.
///
/// Used as-is for title word sets; content vectors additionally drop short
/// tokens and stop words via [`term_frequency`].
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.to_lowercase()
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_string()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Build a term-frequency vector: tokenize, drop tokens of length <= 2,
/// drop stop words.
pub fn term_frequency(text: &str) -> HashMap<String, f64> {
    let mut tf: HashMap<String, f64> = HashMap::new();
    for token in tokenize(text) {
        if token.len() <= 2 || STOP_WORDS.contains(&token.as_str()) {
            continue;
        }
        *tf.entry(token).or_insert(0.0) += 1.0;
    }
    tf
}

/// The first three "significant" words of a title (length > 3), used for
/// candidate retrieval against the lowercase title index.
pub fn significant_title_words(title: &str) -> Vec<String> {
    tokenize(title)
        .into_iter()
        .filter(|w| w.len() > 3)
        .take(3)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_strips_punctuation() {
        let tokens = tokenize("Report Card, Fall 2024!");
        assert_eq!(tokens, vec!["report", "card", "fall", "2024"]);
    }

    #[test]
    fn test_term_frequency_drops_short_and_stop_words() {
        let tf = term_frequency("the cat sat on a mat with the cat");
        // "the", "with" are stop words; "on", "a" are too short; "sat"/"mat"/"cat" stay.
        assert_eq!(tf.get("cat"), Some(&2.0));
        assert_eq!(tf.get("sat"), Some(&1.0));
        assert_eq!(tf.get("mat"), Some(&1.0));
        assert!(!tf.contains_key("the"));
        assert!(!tf.contains_key("on"));
        assert!(!tf.contains_key("with"));
    }

    #[test]
    fn test_term_frequency_empty_text() {
        assert!(term_frequency("").is_empty());
        assert!(term_frequency("a an on").is_empty());
    }

    #[test]
    fn test_significant_title_words_first_three_long_words() {
        let words = significant_title_words("Report Card Fall 2024 Semester Review");
        assert_eq!(words, vec!["report", "card", "fall"]);

        // Short words are skipped entirely, not counted against the three.
        let words = significant_title_words("The Big Gym Festival Program Flyer");
        assert_eq!(words, vec!["festival", "program", "flyer"]);
    }

    #[test]
    fn test_significant_title_words_empty() {
        assert!(significant_title_words("").is_empty());
        assert!(significant_title_words("a an it").is_empty());
    }
}
