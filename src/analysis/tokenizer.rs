//! Tokenizer implementations.

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenStream};

/// Trait for tokenizers that convert text into tokens.
pub trait Tokenizer: Send + Sync + std::fmt::Debug {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> TokenStream;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Collect the token texts.
    fn terms(&self, text: &str) -> Vec<String> {
        self.tokenize(text).map(|token| token.text).collect()
    }
}

/// Splits text on Unicode word boundaries (UAX #29) and lowercases each word.
///
/// Segments without any alphanumeric character (whitespace, punctuation) are
/// dropped.
///
/// ```
/// use hoplon::analysis::{Tokenizer, UnicodeWordTokenizer};
///
/// let terms = UnicodeWordTokenizer::new().terms("Café, RÉSUMÉ!");
/// assert_eq!(terms, vec!["café", "résumé"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct UnicodeWordTokenizer;

impl UnicodeWordTokenizer {
    /// Create a new Unicode word tokenizer.
    pub fn new() -> Self {
        UnicodeWordTokenizer
    }
}

impl Tokenizer for UnicodeWordTokenizer {
    fn tokenize(&self, text: &str) -> TokenStream {
        let tokens: Vec<Token> = text
            .split_word_bound_indices()
            .filter(|(_, word)| word.chars().any(char::is_alphanumeric))
            .enumerate()
            .map(|(position, (start, word))| {
                Token::with_offsets(word.to_lowercase(), position, start, start + word.len())
            })
            .collect();

        Box::new(tokens.into_iter())
    }

    fn name(&self) -> &'static str {
        "unicode_word"
    }
}
