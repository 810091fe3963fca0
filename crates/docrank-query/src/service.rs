use std::sync::{Arc, PoisonError, RwLock};

use docrank_core::traits::VectorSpace;
use docrank_core::types::{RankedResult, ScoringMethod};
use docrank_core::{Error, Result};
use docrank_embed::SemanticIndex;
use docrank_text::LexicalIndex;
use docrank_vector::{rank_space, top_k};

pub const DEFAULT_TOP_K: usize = 3;

/// Everything one generation of searches runs against.
#[derive(Debug)]
pub struct IndexSnapshot {
    lexical: LexicalIndex,
    semantic: Option<SemanticIndex>,
}

impl IndexSnapshot {
    /// Both indexes must list the same documents in the same order.
    pub fn new(lexical: LexicalIndex, semantic: Option<SemanticIndex>) -> Result<Self> {
        if let Some(semantic) = &semantic {
            if semantic.document_ids() != lexical.document_ids() {
                return Err(Error::InvalidInput(
                    "semantic and lexical indexes cover different documents".into(),
                ));
            }
        }
        Ok(Self { lexical, semantic })
    }

    pub fn lexical(&self) -> &LexicalIndex { &self.lexical }
    pub fn semantic(&self) -> Option<&SemanticIndex> { self.semantic.as_ref() }
    pub fn documents(&self) -> usize { self.lexical.document_ids().len() }

    pub fn methods(&self) -> Vec<ScoringMethod> {
        ScoringMethod::ALL.into_iter().filter(|m| self.supports(*m)).collect()
    }

    pub fn supports(&self, method: ScoringMethod) -> bool {
        match method {
            ScoringMethod::Lexical => true,
            ScoringMethod::Semantic => self.semantic.is_some(),
        }
    }

    /// The vector space a method scores in.
    pub fn space(&self, method: ScoringMethod) -> Result<&dyn VectorSpace> {
        match method {
            ScoringMethod::Lexical => Ok(&self.lexical),
            ScoringMethod::Semantic => self
                .semantic
                .as_ref()
                .map(|s| s as &dyn VectorSpace)
                .ok_or_else(|| Error::ModelUnavailable("semantic index is not loaded".into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub query: String,
    pub method: ScoringMethod,
    pub results: Vec<RankedResult>,
}

/// Serves searches from the current snapshot and swaps in new ones.
///
/// A search clones the snapshot `Arc` and releases the lock before scoring, so
/// a swap never waits on queries and in-flight queries finish on the old snapshot.
pub struct SearchService {
    snapshot: RwLock<Arc<IndexSnapshot>>,
    default_top_k: usize,
    default_method: ScoringMethod,
}

impl SearchService {
    pub fn new(snapshot: IndexSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
            default_top_k: DEFAULT_TOP_K,
            default_method: ScoringMethod::default(),
        }
    }

    pub fn with_defaults(mut self, top_k: usize, method: ScoringMethod) -> Result<Self> {
        if top_k == 0 {
            return Err(Error::InvalidTopK(top_k));
        }
        self.default_top_k = top_k;
        self.default_method = method;
        Ok(self)
    }

    pub fn default_top_k(&self) -> usize { self.default_top_k }
    pub fn default_method(&self) -> ScoringMethod { self.default_method }

    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Install `next` and return the snapshot it replaced.
    pub fn swap(&self, next: IndexSnapshot) -> Arc<IndexSnapshot> {
        let next = Arc::new(next);
        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        tracing::info!(
            documents = next.documents(),
            methods = ?next.methods(),
            "swapped index snapshot"
        );
        std::mem::replace(&mut *guard, next)
    }

    /// Rank every document for `query`. Blank queries score 0 everywhere and
    /// come back in document order.
    pub fn rank_all(&self, query: &str, method: ScoringMethod) -> Result<Vec<RankedResult>> {
        let snapshot = self.snapshot();
        let space = snapshot.space(method)?;
        if query.trim().is_empty() {
            tracing::debug!(%method, "blank query");
        }
        rank_space(space, query)
    }

    pub fn search(
        &self,
        query: &str,
        method: Option<ScoringMethod>,
        k: Option<usize>,
    ) -> Result<SearchResults> {
        let k = k.unwrap_or(self.default_top_k);
        if k == 0 {
            return Err(Error::InvalidTopK(k));
        }
        let method = method.unwrap_or(self.default_method);
        let ranking = self.rank_all(query, method)?;
        let results = top_k(ranking, k);
        tracing::debug!(query, %method, returned = results.len(), "search complete");
        Ok(SearchResults { query: query.to_string(), method, results })
    }
}
