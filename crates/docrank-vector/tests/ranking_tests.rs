use docrank_core::Error;
use docrank_vector::{cosine_similarity, rank, top_k};
use proptest::prelude::*;

fn docs(rows: &[(&'static str, Vec<f64>)]) -> Vec<(String, Vec<f64>)> {
    rows.iter().map(|(id, v)| (id.to_string(), v.clone())).collect()
}

fn as_refs(rows: &[(String, Vec<f64>)]) -> impl Iterator<Item = (&str, &[f64])> {
    rows.iter().map(|(id, v)| (id.as_str(), v.as_slice()))
}

#[test]
fn cosine_basics() {
    assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]).expect("cos") - 1.0).abs() < 1e-12);
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).expect("cos").abs() < 1e-12);
    assert!((cosine_similarity(&[1.0, 1.0], &[-1.0, -1.0]).expect("cos") + 1.0).abs() < 1e-12);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).expect("cos"), 0.0);
    assert_eq!(cosine_similarity(&[], &[]).expect("cos"), 0.0);
}

#[test]
fn cosine_rejects_mismatched_lengths() {
    let err = cosine_similarity(&[1.0, 2.0], &[1.0]).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 2, found: 1 }));
}

#[test]
fn ties_keep_document_order() {
    let rows = docs(&[
        ("c", vec![0.0, 1.0]),
        ("a", vec![1.0, 0.0]),
        ("b", vec![2.0, 0.0]),
        ("d", vec![0.0, 0.0]),
    ]);
    let ranking = rank(&[1.0, 0.0], as_refs(&rows)).expect("rank");
    let ids: Vec<_> = ranking.iter().map(|r| r.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c", "d"]);
    assert_eq!(ranking.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
}

#[test]
fn zero_query_ranks_in_document_order() {
    let rows = docs(&[("x", vec![1.0, 2.0]), ("y", vec![3.0, 0.0]), ("z", vec![0.0, 0.0])]);
    let ranking = rank(&[0.0, 0.0], as_refs(&rows)).expect("rank");
    assert!(ranking.iter().all(|r| r.score == 0.0));
    assert_eq!(ranking.iter().map(|r| r.doc_id.as_str()).collect::<Vec<_>>(), vec!["x", "y", "z"]);
}

#[test]
fn rank_propagates_dimension_errors() {
    let rows = docs(&[("x", vec![1.0, 2.0]), ("y", vec![3.0])]);
    assert!(matches!(rank(&[1.0, 0.0], as_refs(&rows)), Err(Error::DimensionMismatch { .. })));
}

#[test]
fn cosine_survives_extreme_magnitudes() {
    let huge = cosine_similarity(&[1e200, 1e200], &[1e200, 1e200]).expect("cos");
    assert!((huge - 1.0).abs() < 1e-12);
    let tiny = cosine_similarity(&[1e-300, 0.0], &[-1e-300, 0.0]).expect("cos");
    assert!((tiny + 1.0).abs() < 1e-12);
    let mixed = cosine_similarity(&[1e300, 1.0], &[1.0, 0.0]).expect("cos");
    assert!((mixed - 1.0).abs() < 1e-12);
}

#[test]
fn cosine_with_non_finite_components_is_zero() {
    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert_eq!(cosine_similarity(&[bad, 1.0], &[1.0, 1.0]).expect("cos"), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 1.0], &[1.0, bad]).expect("cos"), 0.0);
    }
}

#[test]
fn rank_handles_non_finite_documents() {
    let rows: Vec<(String, Vec<f64>)> = (0..64)
        .map(|i| {
            let v = if i % 3 == 0 { vec![f64::NAN, 1.0] } else { vec![1.0, i as f64] };
            (format!("doc{:02}", i), v)
        })
        .collect();
    let ranking = rank(&[1.0, 1.0], as_refs(&rows)).expect("rank");
    assert_eq!(ranking.len(), 64);
    assert_eq!(ranking.iter().map(|r| r.rank).collect::<Vec<_>>(), (1..=64).collect::<Vec<_>>());
    assert!(ranking.iter().all(|r| r.score.is_finite()));
    assert!(ranking.windows(2).all(|w| w[0].score >= w[1].score));
    let zeros: Vec<_> =
        ranking.iter().filter(|r| r.score == 0.0).map(|r| r.doc_id.as_str()).collect();
    assert_eq!(zeros.len(), 22);
    assert_eq!(zeros[0], "doc00");
    assert_eq!(zeros[1], "doc03");
}

#[test]
fn top_k_truncates() {
    let rows = docs(&[("a", vec![1.0]), ("b", vec![1.0]), ("c", vec![1.0])]);
    let ranking = rank(&[1.0], as_refs(&rows)).expect("rank");
    let top = top_k(ranking.clone(), 2);
    assert_eq!(top.len(), 2);
    assert_eq!(top.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(top_k(ranking, 10).len(), 3);
}

fn vector_strategy(dim: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-100.0f64..100.0, dim)
}

fn collection_strategy() -> impl Strategy<Value = (Vec<f64>, Vec<Vec<f64>>)> {
    (1usize..8).prop_flat_map(|dim| {
        (vector_strategy(dim), prop::collection::vec(vector_strategy(dim), 1..20))
    })
}

/// Components including NaN, infinities, zeros and overflow-scale magnitudes.
fn extreme_component() -> impl Strategy<Value = f64> {
    prop_oneof![
        -100.0f64..100.0,
        -1e300f64..1e300,
        -1e-300f64..1e-300,
        Just(0.0),
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
    ]
}

fn extreme_collection_strategy() -> impl Strategy<Value = (Vec<f64>, Vec<Vec<f64>>)> {
    (1usize..6).prop_flat_map(|dim| {
        (
            prop::collection::vec(extreme_component(), dim),
            prop::collection::vec(prop::collection::vec(extreme_component(), dim), 1..40),
        )
    })
}

proptest! {
    #[test]
    fn prop_cosine_is_bounded((a, rows) in collection_strategy()) {
        for b in &rows {
            let s = cosine_similarity(&a, b).expect("cos");
            prop_assert!((-1.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn prop_cosine_against_zero_is_zero(a in vector_strategy(5)) {
        prop_assert_eq!(cosine_similarity(&a, &[0.0; 5]).expect("cos"), 0.0);
        prop_assert_eq!(cosine_similarity(&[0.0; 5], &a).expect("cos"), 0.0);
    }

    #[test]
    fn prop_ranking_is_dense_and_descending((query, rows) in collection_strategy()) {
        let named: Vec<(String, Vec<f64>)> =
            rows.into_iter().enumerate().map(|(i, v)| (format!("doc{:02}", i), v)).collect();
        let ranking = rank(&query, as_refs(&named)).expect("rank");

        prop_assert_eq!(ranking.len(), named.len());
        let ranks: Vec<usize> = ranking.iter().map(|r| r.rank).collect();
        prop_assert_eq!(ranks, (1..=named.len()).collect::<Vec<_>>());

        let mut ids: Vec<&str> = ranking.iter().map(|r| r.doc_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), named.len());

        for pair in ranking.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn prop_cosine_is_finite_and_bounded_for_extreme_inputs(
        (a, rows) in extreme_collection_strategy()
    ) {
        for b in &rows {
            let s = cosine_similarity(&a, b).expect("cos");
            prop_assert!(s.is_finite());
            prop_assert!((-1.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn prop_ranking_never_panics_on_extreme_inputs(
        (query, rows) in extreme_collection_strategy()
    ) {
        let named: Vec<(String, Vec<f64>)> =
            rows.into_iter().enumerate().map(|(i, v)| (format!("doc{:02}", i), v)).collect();
        let ranking = rank(&query, as_refs(&named)).expect("rank");
        let ranks: Vec<usize> = ranking.iter().map(|r| r.rank).collect();
        prop_assert_eq!(ranks, (1..=named.len()).collect::<Vec<_>>());
        for pair in ranking.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }
}
