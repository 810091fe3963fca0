//! docrank-vector
//!
//! Cosine similarity and the dense ranking every search method shares.

pub mod rank;
pub mod similarity;

pub use rank::{rank, rank_space, top_k};
pub use similarity::cosine_similarity;
