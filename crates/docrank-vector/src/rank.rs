use docrank_core::traits::VectorSpace;
use docrank_core::types::RankedResult;
use docrank_core::Result;

use crate::similarity::cosine_similarity;

/// Score every document against `query` and assign dense 1-based ranks.
///
/// The sort is stable, so equal scores keep the order `documents` yields them in.
/// Scores are compared with `total_cmp`, so a NaN can never break the ordering.
pub fn rank<'a, I>(query: &[f64], documents: I) -> Result<Vec<RankedResult>>
where
    I: IntoIterator<Item = (&'a str, &'a [f64])>,
{
    let mut scored = documents
        .into_iter()
        .map(|(doc_id, vector)| Ok((doc_id, cosine_similarity(query, vector)?)))
        .collect::<Result<Vec<_>>>()?;
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(scored
        .into_iter()
        .enumerate()
        .map(|(i, (doc_id, score))| RankedResult { doc_id: doc_id.to_string(), rank: i + 1, score })
        .collect())
}

/// Encode `query` in `space` and rank all of its documents.
pub fn rank_space(space: &dyn VectorSpace, query: &str) -> Result<Vec<RankedResult>> {
    let encoded = space.encode_query(query);
    let ranking = rank(&encoded, space.documents())?;
    tracing::debug!(method = %space.method(), documents = ranking.len(), "ranked documents");
    Ok(ranking)
}

/// Keep the first `k` entries; `k` larger than the ranking keeps everything.
pub fn top_k(mut ranking: Vec<RankedResult>, k: usize) -> Vec<RankedResult> {
    ranking.truncate(k);
    ranking
}
