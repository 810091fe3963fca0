use crate::types::ScoringMethod;

/// Text-extraction collaborator: raw document bytes in, normalized plain text out.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, raw: &[u8]) -> String;
}

/// A frozen vector space both the documents and incoming queries are encoded into.
///
/// Implementations own their document ids and vectors as one unit, so rows can
/// never drift out of step with ids. Query encoding must apply the same
/// preprocessing the documents went through.
pub trait VectorSpace: Send + Sync {
    fn method(&self) -> ScoringMethod;
    fn dim(&self) -> usize;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool { self.len() == 0 }
    /// `(doc_id, vector)` pairs in build order.
    fn documents(&self) -> Box<dyn Iterator<Item = (&str, &[f64])> + '_>;
    fn encode_query(&self, query: &str) -> Vec<f64>;
}
