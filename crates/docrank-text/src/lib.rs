//! docrank-text
//!
//! Lexical TF-IDF indexing: tokenization with stop-word removal, the frozen
//! vocabulary + row-normalized document matrix, query encoding against that
//! vocabulary, and JSON persistence of the whole index.

pub mod index;
pub mod persist;
pub mod stop_words;
pub mod tokenize;

pub use index::{IndexStats, LexicalIndex};
pub use persist::{load_index, save_index};
pub use tokenize::Tokenizer;
