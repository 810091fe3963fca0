use std::sync::Arc;

use docrank_core::traits::VectorSpace;
use docrank_core::types::{Corpus, ScoringMethod};
use docrank_core::{Error, Result};

use crate::table::EmbeddingTable;

/// Mean of the table vectors of `text`'s lowercase whitespace tokens.
///
/// Tokens missing from the table are skipped; if none match, the result is the
/// zero vector of the table's dimension.
pub fn embed_text(table: &EmbeddingTable, text: &str) -> Vec<f64> {
    let mut sum = vec![0.0; table.dim()];
    let mut matched = 0usize;
    for token in text.split_whitespace() {
        if let Some(vector) = table.get(&token.to_lowercase()) {
            for (acc, v) in sum.iter_mut().zip(vector.iter()) {
                *acc += v;
            }
            matched += 1;
        }
    }
    if matched > 0 {
        let n = matched as f64;
        sum.iter_mut().for_each(|v| *v /= n);
    }
    sum
}

/// Document embeddings in corpus order, plus the table queries are embedded with.
#[derive(Debug, Clone)]
pub struct SemanticIndex {
    document_ids: Vec<String>,
    embeddings: Vec<Vec<f64>>,
    table: Arc<EmbeddingTable>,
}

impl SemanticIndex {
    pub fn build(corpus: &Corpus, table: Arc<EmbeddingTable>) -> Result<Self> {
        Self::build_with_progress(corpus, table, |_| {})
    }

    /// Like [`SemanticIndex::build`], calling `on_document` after each document is embedded.
    pub fn build_with_progress<F>(
        corpus: &Corpus,
        table: Arc<EmbeddingTable>,
        mut on_document: F,
    ) -> Result<Self>
    where
        F: FnMut(&str),
    {
        if corpus.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let mut document_ids = Vec::with_capacity(corpus.len());
        let mut embeddings = Vec::with_capacity(corpus.len());
        let mut unmatched = 0usize;
        for doc in corpus.documents() {
            let embedding = embed_text(&table, &doc.text);
            if embedding.iter().all(|v| *v == 0.0) {
                unmatched += 1;
            }
            document_ids.push(doc.doc_id.clone());
            embeddings.push(embedding);
            on_document(&doc.doc_id);
        }
        tracing::info!(
            documents = document_ids.len(),
            dim = table.dim(),
            unmatched,
            "built semantic index"
        );
        Ok(Self { document_ids, embeddings, table })
    }

    pub fn document_ids(&self) -> &[String] { &self.document_ids }

    pub fn embedding(&self, doc_id: &str) -> Option<&[f64]> {
        self.document_ids.iter().position(|id| id == doc_id).map(|i| self.embeddings[i].as_slice())
    }
}

impl VectorSpace for SemanticIndex {
    fn method(&self) -> ScoringMethod { ScoringMethod::Semantic }
    fn dim(&self) -> usize { self.table.dim() }
    fn len(&self) -> usize { self.document_ids.len() }

    fn documents(&self) -> Box<dyn Iterator<Item = (&str, &[f64])> + '_> {
        let ids = self.document_ids.iter().map(String::as_str);
        Box::new(ids.zip(self.embeddings.iter().map(Vec::as_slice)))
    }

    fn encode_query(&self, query: &str) -> Vec<f64> { embed_text(&self.table, query) }
}
