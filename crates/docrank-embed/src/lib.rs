//! docrank-embed
//!
//! Word-vector tables, the process-wide table cache and the semantic
//! (mean-of-word-vectors) document index.

pub mod cache;
pub mod semantic;
pub mod table;

pub use cache::{embedding_table, EmbeddingCache, TableSource};
pub use semantic::{embed_text, SemanticIndex};
pub use table::EmbeddingTable;
