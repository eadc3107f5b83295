//! Word tokenizer with an ASCII fast path and a Unicode fallback.
//!
//! Tokens are lowercased runs of word characters. Pure-ASCII input is
//! scanned byte by byte; anything else goes through a precompiled
//! Unicode-property pattern. Tokens shorter than two characters are
//! dropped, as are tokens found in the optional stop set.

use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;

/// Minimum number of characters a token must have to be emitted.
const MIN_TOKEN_CHARS: usize = 2;

/// Word pattern for the Unicode path: a letter followed by letters,
/// numbers, or underscores.
const WORD_PATTERN: &str = r"\p{L}[\p{L}\p{N}_]*";

/// A tokenizer that splits text into lowercased word tokens.
///
/// The same tokenizer instance is shared between index build and query
/// analysis so both sides agree on term boundaries.
#[derive(Clone, Debug)]
pub struct WordTokenizer {
    /// Compiled word pattern for non-ASCII input.
    pattern: Arc<Regex>,
}

impl WordTokenizer {
    /// Create a new word tokenizer.
    pub fn new() -> Self {
        WordTokenizer {
            pattern: Arc::new(Regex::new(WORD_PATTERN).expect("word pattern should be valid")),
        }
    }

    /// Tokenize `text`, suppressing tokens found in `stop_words`.
    ///
    /// Emission order matches source order; adjacent tokens never
    /// overlap. Any input (including empty) yields a token sequence,
    /// possibly empty.
    pub fn tokenize(&self, text: &str, stop_words: Option<&HashSet<String>>) -> Vec<String> {
        if text.is_ascii() {
            Self::tokenize_ascii(text, stop_words)
        } else {
            self.tokenize_unicode(text, stop_words)
        }
    }

    /// Tokenize without any stop-word suppression.
    pub fn tokenize_raw(&self, text: &str) -> Vec<String> {
        self.tokenize(text, None)
    }

    /// Byte-wise scan for pure-ASCII input. A token character is
    /// `a-z`, `A-Z`, `0-9`, or `_`; anything else ends the token.
    fn tokenize_ascii(text: &str, stop_words: Option<&HashSet<String>>) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut current = String::new();

        for &byte in text.as_bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'_' {
                current.push(byte.to_ascii_lowercase() as char);
            } else if !current.is_empty() {
                Self::emit(&mut tokens, std::mem::take(&mut current), stop_words);
            }
        }
        if !current.is_empty() {
            Self::emit(&mut tokens, current, stop_words);
        }

        tokens
    }

    /// Unicode-property scan: maximal `Letter (Letter | Number | _)*`
    /// matches, folded with `to_lowercase`.
    fn tokenize_unicode(&self, text: &str, stop_words: Option<&HashSet<String>>) -> Vec<String> {
        let mut tokens = Vec::new();

        for mat in self.pattern.find_iter(text) {
            let token = mat.as_str().to_lowercase();
            if token.chars().count() >= MIN_TOKEN_CHARS {
                Self::emit_unchecked(&mut tokens, token, stop_words);
            }
        }

        tokens
    }

    /// Emit an ASCII token after the length and stop checks.
    fn emit(tokens: &mut Vec<String>, token: String, stop_words: Option<&HashSet<String>>) {
        // ASCII: byte length equals character count.
        if token.len() >= MIN_TOKEN_CHARS {
            Self::emit_unchecked(tokens, token, stop_words);
        }
    }

    fn emit_unchecked(
        tokens: &mut Vec<String>,
        token: String,
        stop_words: Option<&HashSet<String>>,
    ) {
        if stop_words.is_none_or(|set| !set.contains(&token)) {
            tokens.push(token);
        }
    }
}

impl Default for WordTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop_set(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_ascii_tokenization() {
        let tokenizer = WordTokenizer::new();
        let tokens = tokenizer.tokenize_raw("The quick, brown fox!");
        assert_eq!(tokens, vec!["the", "quick", "brown", "fox"]);
    }

    #[test]
    fn test_underscore_and_digits_are_token_characters() {
        let tokenizer = WordTokenizer::new();
        let tokens = tokenizer.tokenize_raw("snake_case v2 x1y2");
        assert_eq!(tokens, vec!["snake_case", "v2", "x1y2"]);
    }

    #[test]
    fn test_short_tokens_dropped() {
        let tokenizer = WordTokenizer::new();
        let tokens = tokenizer.tokenize_raw("a I ok x");
        assert_eq!(tokens, vec!["ok"]);
    }

    #[test]
    fn test_stop_words_suppressed() {
        let tokenizer = WordTokenizer::new();
        let stops = stop_set(&["the", "and"]);
        let tokens = tokenizer.tokenize("the fox and the dog", Some(&stops));
        assert_eq!(tokens, vec!["fox", "dog"]);
    }

    #[test]
    fn test_unicode_accents() {
        let tokenizer = WordTokenizer::new();
        let tokens = tokenizer.tokenize_raw("Café RÉSUMÉ naïve");
        assert_eq!(tokens, vec!["café", "résumé", "naïve"]);
    }

    #[test]
    fn test_unicode_cjk() {
        let tokenizer = WordTokenizer::new();
        let tokens = tokenizer.tokenize_raw("世界 你好");
        assert_eq!(tokens, vec!["世界", "你好"]);
    }

    #[test]
    fn test_unicode_single_char_dropped() {
        let tokenizer = WordTokenizer::new();
        // 好 alone is below the two-character minimum.
        let tokens = tokenizer.tokenize_raw("好 世界");
        assert_eq!(tokens, vec!["世界"]);
    }

    #[test]
    fn test_empty_and_whitespace() {
        let tokenizer = WordTokenizer::new();
        assert!(tokenizer.tokenize_raw("").is_empty());
        assert!(tokenizer.tokenize_raw("   \t\n ").is_empty());
        assert!(tokenizer.tokenize_raw("!?;,.").is_empty());
    }

    #[test]
    fn test_case_folding_matches_between_paths() {
        let tokenizer = WordTokenizer::new();
        assert_eq!(
            tokenizer.tokenize_raw("FOX"),
            tokenizer.tokenize_raw("fox")
        );
        assert_eq!(
            tokenizer.tokenize_raw("CAFÉ und"),
            tokenizer.tokenize_raw("café und")
        );
    }
}
