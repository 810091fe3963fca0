use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use docrank_core::types::LexicalParams;
use docrank_core::Result;

use crate::stop_words;

static TOKEN_PATTERN: OnceLock<Regex> = OnceLock::new();

fn token_pattern() -> &'static Regex {
    // Two or more word characters between word boundaries.
    TOKEN_PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("token regex must compile"))
}

/// Lexical tokenizer shared by index construction and query encoding.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    lowercase: bool,
    stop_words: HashSet<String>,
}

impl Tokenizer {
    pub fn new(params: &LexicalParams) -> Result<Self> {
        let stop_words = stop_words::resolve(&params.stop_words, params.lowercase)?;
        Ok(Self { lowercase: params.lowercase, stop_words })
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase { text.to_lowercase() } else { text.to_string() };
        token_pattern()
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(*t))
            .map(str::to_string)
            .collect()
    }
}
