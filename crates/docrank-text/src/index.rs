use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use docrank_core::traits::VectorSpace;
use docrank_core::types::{Corpus, LexicalParams, Norm, ScoringMethod};
use docrank_core::{Error, Result};

use crate::tokenize::Tokenizer;

/// Frozen TF-IDF index: ids, vocabulary, idf and document matrix as one unit.
///
/// Row `i` of the matrix belongs to `document_ids[i]`; column `j` to
/// `vocabulary[j]`. The vocabulary is sorted and never changes after build.
#[derive(Debug, Clone)]
pub struct LexicalIndex {
    document_ids: Vec<String>,
    vocabulary: Vec<String>,
    idf: Vec<f64>,
    matrix: Vec<Vec<f64>>,
    params: LexicalParams,
    tokenizer: Tokenizer,
    columns: HashMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub documents: usize,
    pub vocabulary_size: usize,
    pub non_zero: usize,
    pub sparsity_percent: f64,
}

impl LexicalIndex {
    /// Fit the vocabulary and idf on `corpus` and weight every document.
    pub fn build(corpus: &Corpus, params: LexicalParams) -> Result<Self> {
        if corpus.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let tokenizer = Tokenizer::new(&params)?;
        let tokenized: Vec<Vec<String>> =
            corpus.documents().iter().map(|d| tokenizer.tokenize(&d.text)).collect();

        let vocabulary: Vec<String> = tokenized
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if vocabulary.is_empty() {
            tracing::warn!(documents = corpus.len(), "corpus produced an empty vocabulary");
            return Err(Error::EmptyCorpus);
        }
        let columns = column_lookup(&vocabulary);

        let mut df = vec![0usize; vocabulary.len()];
        for tokens in &tokenized {
            let seen: BTreeSet<usize> =
                tokens.iter().filter_map(|t| columns.get(t).copied()).collect();
            for col in seen {
                df[col] += 1;
            }
        }
        let n = corpus.len() as f64;
        let idf: Vec<f64> = df.iter().map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0).collect();

        let matrix: Vec<Vec<f64>> = tokenized
            .iter()
            .map(|tokens| {
                let mut row = term_counts(tokens, &columns, idf.len());
                for (value, weight) in row.iter_mut().zip(&idf) {
                    *value *= weight;
                }
                normalize(row, params.norm)
            })
            .collect();

        let index = Self {
            document_ids: corpus.ids().map(str::to_string).collect(),
            vocabulary,
            idf,
            matrix,
            params,
            tokenizer,
            columns,
        };
        let stats = index.stats();
        tracing::info!(
            documents = stats.documents,
            vocabulary = stats.vocabulary_size,
            non_zero = stats.non_zero,
            sparsity_percent = stats.sparsity_percent,
            "built lexical index"
        );
        Ok(index)
    }

    /// Reassemble an index from stored parts, checking that every shape agrees.
    pub fn from_parts(
        document_ids: Vec<String>,
        vocabulary: Vec<String>,
        idf: Vec<f64>,
        matrix: Vec<Vec<f64>>,
        params: LexicalParams,
    ) -> Result<Self> {
        if document_ids.is_empty() || vocabulary.is_empty() {
            return Err(Error::InvalidInput("index has no documents or no vocabulary".into()));
        }
        if matrix.len() != document_ids.len() {
            return Err(Error::InvalidInput(format!(
                "matrix has {} rows but there are {} document ids",
                matrix.len(),
                document_ids.len()
            )));
        }
        let ragged = matrix.iter().enumerate().find(|(_, r)| r.len() != vocabulary.len());
        if let Some((row, values)) = ragged {
            return Err(Error::InvalidInput(format!(
                "matrix row {} has {} columns but the vocabulary has {} terms",
                row,
                values.len(),
                vocabulary.len()
            )));
        }
        if idf.len() != vocabulary.len() {
            return Err(Error::InvalidInput(format!(
                "idf has {} weights but the vocabulary has {} terms",
                idf.len(),
                vocabulary.len()
            )));
        }
        let columns = column_lookup(&vocabulary);
        if columns.len() != vocabulary.len() {
            return Err(Error::InvalidInput("vocabulary contains duplicate terms".into()));
        }
        let tokenizer = Tokenizer::new(&params)?;
        Ok(Self { document_ids, vocabulary, idf, matrix, params, tokenizer, columns })
    }

    pub fn document_ids(&self) -> &[String] { &self.document_ids }
    pub fn vocabulary(&self) -> &[String] { &self.vocabulary }
    pub fn idf(&self) -> &[f64] { &self.idf }
    pub fn matrix(&self) -> &[Vec<f64>] { &self.matrix }
    pub fn params(&self) -> &LexicalParams { &self.params }

    pub fn row(&self, doc_id: &str) -> Option<&[f64]> {
        self.document_ids.iter().position(|id| id == doc_id).map(|i| self.matrix[i].as_slice())
    }

    /// Encode a query into the frozen space; unknown terms are dropped.
    ///
    /// Query terms carry uniform weight: raw counts over the vocabulary, then
    /// the index's row normalization. The corpus idf is not applied.
    pub fn encode(&self, query: &str) -> Vec<f64> {
        let tokens = self.tokenizer.tokenize(query);
        normalize(term_counts(&tokens, &self.columns, self.vocabulary.len()), self.params.norm)
    }

    pub fn stats(&self) -> IndexStats {
        let non_zero = self.matrix.iter().flatten().filter(|v| **v != 0.0).count();
        let cells = self.document_ids.len() * self.vocabulary.len();
        let sparsity_percent =
            if cells == 0 { 0.0 } else { 100.0 * (1.0 - non_zero as f64 / cells as f64) };
        IndexStats {
            documents: self.document_ids.len(),
            vocabulary_size: self.vocabulary.len(),
            non_zero,
            sparsity_percent,
        }
    }
}

impl VectorSpace for LexicalIndex {
    fn method(&self) -> ScoringMethod { ScoringMethod::Lexical }
    fn dim(&self) -> usize { self.vocabulary.len() }
    fn len(&self) -> usize { self.document_ids.len() }

    fn documents(&self) -> Box<dyn Iterator<Item = (&str, &[f64])> + '_> {
        let ids = self.document_ids.iter().map(String::as_str);
        Box::new(ids.zip(self.matrix.iter().map(Vec::as_slice)))
    }

    fn encode_query(&self, query: &str) -> Vec<f64> { self.encode(query) }
}

fn column_lookup(vocabulary: &[String]) -> HashMap<String, usize> {
    vocabulary.iter().enumerate().map(|(i, t)| (t.clone(), i)).collect()
}

/// Raw counts over the known columns; tokens outside the vocabulary are dropped.
fn term_counts(tokens: &[String], columns: &HashMap<String, usize>, dim: usize) -> Vec<f64> {
    let mut row = vec![0.0; dim];
    for token in tokens {
        if let Some(&col) = columns.get(token) {
            row[col] += 1.0;
        }
    }
    row
}

fn normalize(mut row: Vec<f64>, norm: Norm) -> Vec<f64> {
    if norm == Norm::L2 {
        let magnitude = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        if magnitude > 0.0 {
            row.iter_mut().for_each(|v| *v /= magnitude);
        }
    }
    row
}
