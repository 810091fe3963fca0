//! Domain types shared by the lexical and semantic engines.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub type DocId = String;

/// A normalized document. `text` may be empty; that is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: DocId,
    pub text: String,
}

impl Document {
    pub fn new(doc_id: impl Into<DocId>, text: impl Into<String>) -> Self {
        Self { doc_id: doc_id.into(), text: text.into() }
    }
}

/// Ordered set of documents with unique ids.
///
/// The order is the doc_id sequence every index built from this corpus uses
/// for its rows, and the order ties are resolved in when ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    pub fn new(documents: Vec<Document>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(documents.len());
        for doc in &documents {
            if !seen.insert(doc.doc_id.as_str()) {
                return Err(Error::InvalidInput(format!("duplicate document id '{}'", doc.doc_id)));
            }
        }
        Ok(Self { documents })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<DocId>,
        V: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(id, text)| Document::new(id, text)).collect())
    }

    pub fn documents(&self) -> &[Document] { &self.documents }
    pub fn len(&self) -> usize { self.documents.len() }
    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.doc_id.as_str())
    }

    pub fn get(&self, doc_id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.doc_id == doc_id)
    }
}

/// Scoring strategy selected once at the query boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMethod {
    #[default]
    Lexical,
    Semantic,
}

impl ScoringMethod {
    pub const ALL: [ScoringMethod; 2] = [ScoringMethod::Lexical, ScoringMethod::Semantic];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMethod::Lexical => "lexical",
            ScoringMethod::Semantic => "semantic",
        }
    }
}

impl fmt::Display for ScoringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Accepts `lexical`/`tfidf` and `semantic`/`word2vec`, case-insensitively.
/// Anything else is rejected rather than falling back to lexical.
impl FromStr for ScoringMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical" | "tfidf" => Ok(ScoringMethod::Lexical),
            "semantic" | "word2vec" => Ok(ScoringMethod::Semantic),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

/// One entry of a ranking. `rank` is dense and 1-based; higher `score` ranks first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub doc_id: DocId,
    pub rank: usize,
    pub score: f64,
}

/// Stop-word configuration: a named list (`"english"`, `"none"`) or explicit words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopWords {
    Language(String),
    Custom(Vec<String>),
}

impl Default for StopWords {
    fn default() -> Self { StopWords::Language("english".to_string()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    None,
}

/// Normalization parameters a lexical index was built with. Queries must reuse them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalParams {
    pub lowercase: bool,
    pub stop_words: StopWords,
    pub norm: Norm,
}

impl Default for LexicalParams {
    fn default() -> Self {
        Self { lowercase: true, stop_words: StopWords::default(), norm: Norm::L2 }
    }
}
