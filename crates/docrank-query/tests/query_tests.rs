use std::sync::Arc;

use serde_json::json;

use docrank_core::types::{Corpus, LexicalParams, ScoringMethod};
use docrank_core::Error;
use docrank_embed::{EmbeddingTable, SemanticIndex};
use docrank_query::batch::{read_queries_from, write_results_to};
use docrank_query::{
    handle_search, health, read_queries, run_batch, write_results, IndexSnapshot, QueryRecord,
    SearchResponse, SearchService,
};
use docrank_text::LexicalIndex;

fn animals() -> Corpus {
    Corpus::from_pairs([("A", "cat dog"), ("B", "dog bird"), ("C", "fish")]).expect("corpus")
}

fn table() -> Arc<EmbeddingTable> {
    Arc::new(
        EmbeddingTable::from_entries(
            2,
            [
                ("cat".to_string(), vec![1.0, 0.2]),
                ("dog".to_string(), vec![0.9, 0.3]),
                ("bird".to_string(), vec![0.1, 1.0]),
                ("fish".to_string(), vec![-1.0, 0.4]),
            ],
        )
        .expect("table"),
    )
}

fn lexical_service(corpus: &Corpus) -> SearchService {
    let lexical = LexicalIndex::build(corpus, LexicalParams::default()).expect("lexical");
    SearchService::new(IndexSnapshot::new(lexical, None).expect("snapshot"))
}

fn full_service() -> SearchService {
    let corpus = animals();
    let lexical = LexicalIndex::build(&corpus, LexicalParams::default()).expect("lexical");
    let semantic = SemanticIndex::build(&corpus, table()).expect("semantic");
    SearchService::new(IndexSnapshot::new(lexical, Some(semantic)).expect("snapshot"))
}

#[test]
fn lexical_dog_query_ranks_matches_first() {
    let service = lexical_service(&animals());
    let found = service.search("dog", Some(ScoringMethod::Lexical), Some(3)).expect("search");
    let ids: Vec<_> = found.results.iter().map(|r| r.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
    assert_eq!(found.results.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(found.results[0].score > 0.0);
    assert!(found.results[1].score > 0.0);
    assert_eq!(found.results[2].score, 0.0);
    assert!((found.results[0].score - found.results[1].score).abs() < 1e-12);
}

#[test]
fn multi_term_query_weighs_terms_equally() {
    let corpus =
        Corpus::from_pairs([("A", "apple"), ("B", "banana"), ("C", "apple"), ("D", "apple")])
            .expect("corpus");
    let service = lexical_service(&corpus);
    let ranking = service.rank_all("apple banana", ScoringMethod::Lexical).expect("rank");
    let ids: Vec<_> = ranking.iter().map(|r| r.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C", "D"]);
    let half = 1.0 / 2.0f64.sqrt();
    for r in &ranking {
        assert!((r.score - half).abs() < 1e-12, "{} scored {}", r.doc_id, r.score);
    }
}

#[test]
fn empty_query_scores_zero_in_document_order() {
    let service = full_service();
    for method in ScoringMethod::ALL {
        for query in ["", "   "] {
            let ranking = service.rank_all(query, method).expect("rank");
            let ids: Vec<_> = ranking.iter().map(|r| r.doc_id.as_str()).collect();
            assert_eq!(ids, vec!["A", "B", "C"]);
            assert_eq!(ranking.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
            assert!(ranking.iter().all(|r| r.score == 0.0));
        }
    }
}

#[test]
fn top_k_limits_results() {
    let service = lexical_service(&animals());
    let found = service.search("dog", None, Some(2)).expect("search");
    assert_eq!(found.results.len(), 2);
    assert_eq!(found.results.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2]);

    assert_eq!(service.search("dog", None, Some(50)).expect("search").results.len(), 3);
    assert_eq!(service.search("dog", None, None).expect("search").results.len(), 3);
    assert!(matches!(service.search("dog", None, Some(0)), Err(Error::InvalidTopK(0))));
}

#[test]
fn unknown_method_is_rejected() {
    assert!(matches!("bm25".parse::<ScoringMethod>(), Err(Error::InvalidMethod(_))));
    let request = json!({ "query": "dog", "method": "bm25" });
    let (status, body) = handle_search(&full_service(), &request);
    assert_eq!(status, 400);
    assert!(body["error"].as_str().expect("error").contains("bm25"));
}

#[test]
fn semantic_search_uses_embeddings() {
    let service = full_service();
    let found =
        service.search("kitten cat", Some(ScoringMethod::Semantic), Some(3)).expect("search");
    assert_eq!(found.method, ScoringMethod::Semantic);
    assert_eq!(found.results[0].doc_id, "A");
    assert_eq!(found.results[2].doc_id, "C");
    assert!(found.results.iter().all(|r| (-1.0..=1.0).contains(&r.score)));
}

#[test]
fn semantic_without_index_is_unavailable() {
    let service = lexical_service(&animals());
    assert!(matches!(
        service.search("dog", Some(ScoringMethod::Semantic), None),
        Err(Error::ModelUnavailable(_))
    ));
    let (status, _) = handle_search(&service, &json!({ "query": "dog", "method": "semantic" }));
    assert_eq!(status, 500);
    assert!(service.search("dog", Some(ScoringMethod::Lexical), None).is_ok());
}

#[test]
fn snapshot_ids_must_agree() {
    let lexical = LexicalIndex::build(&animals(), LexicalParams::default()).expect("lexical");
    let other = Corpus::from_pairs([("A", "cat"), ("Z", "dog")]).expect("corpus");
    let semantic = SemanticIndex::build(&other, table()).expect("semantic");
    assert!(matches!(IndexSnapshot::new(lexical, Some(semantic)), Err(Error::InvalidInput(_))));
}

#[test]
fn swap_leaves_held_snapshot_intact() {
    let service = lexical_service(&animals());
    let held = service.snapshot();

    let bigger = Corpus::from_pairs([
        ("A", "cat dog"),
        ("B", "dog bird"),
        ("C", "fish"),
        ("D", "dog dog"),
    ])
    .expect("corpus");
    let lexical = LexicalIndex::build(&bigger, LexicalParams::default()).expect("lexical");
    let next = IndexSnapshot::new(lexical, None).expect("snapshot");
    let previous = service.swap(next);

    assert!(Arc::ptr_eq(&held, &previous));
    assert_eq!(held.documents(), 3);
    assert_eq!(service.snapshot().documents(), 4);
    assert_eq!(service.search("dog", None, Some(1)).expect("search").results[0].doc_id, "D");
}

#[test]
fn api_returns_results_and_echoes_method() {
    let service = full_service();
    let (status, body) = handle_search(&service, &json!({ "query": "dog", "top_k": 2 }));
    assert_eq!(status, 200);
    let response: SearchResponse = serde_json::from_value(body).expect("response");
    assert_eq!(response.query, "dog");
    assert_eq!(response.method, "lexical");
    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[0].rank, 1);

    let (_, body) = handle_search(&service, &json!({ "query": "dog", "method": "WORD2VEC" }));
    assert_eq!(body["method"], "semantic");
    assert_eq!(body["results"].as_array().expect("results").len(), 3);
}

#[test]
fn api_rejects_bad_requests() {
    let service = full_service();
    assert_eq!(handle_search(&service, &json!({})).0, 400);
    assert_eq!(handle_search(&service, &json!({ "query": 7 })).0, 400);
    assert_eq!(handle_search(&service, &json!({ "query": "dog", "top_k": 0 })).0, 400);
    assert_eq!(handle_search(&service, &json!({ "query": "dog", "top_k": -1 })).0, 400);
}

#[test]
fn health_lists_available_methods() {
    let report = health(&full_service());
    assert_eq!(report.status, "healthy");
    assert_eq!(report.documents, 3);
    assert_eq!(report.methods, vec!["lexical", "semantic"]);
    assert_eq!(health(&lexical_service(&animals())).methods, vec!["lexical"]);
}

#[test]
fn batch_produces_full_ranking_per_query() {
    let service = full_service();
    let csv = "query_id,query_text\nq1,dog\nq2,fish tank\nq3,\n";
    let queries = read_queries_from(csv.as_bytes()).expect("queries");
    assert_eq!(queries.len(), 3);
    assert_eq!(queries[2], QueryRecord { query_id: "q3".into(), query_text: String::new() });

    let rows = run_batch(&service, &queries, ScoringMethod::Lexical).expect("batch");
    assert_eq!(rows.len(), 9);
    assert_eq!(rows[0].query_id, "q1");
    assert_eq!(rows[0].document_id, "A");
    let q2: Vec<_> = rows.iter().filter(|r| r.query_id == "q2").collect();
    assert_eq!(q2[0].document_id, "C");
    assert_eq!(q2.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);

    let mut out = Vec::new();
    write_results_to(&mut out, &rows[..3]).expect("write");
    let text = String::from_utf8(out).expect("utf8");
    assert_eq!(text, "query_id,rank,document_id\nq1,1,A\nq1,2,B\nq1,3,C\n");
}

#[test]
fn batch_rejects_duplicate_query_ids() {
    let result = read_queries_from("query_id,query_text\nq1,dog\nq1,cat\n".as_bytes());
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn batch_files_round_trip_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let queries_path = dir.path().join("queries.csv");
    std::fs::write(&queries_path, "query_id,query_text\nq1,bird\n").expect("write");
    let queries = read_queries(&queries_path).expect("read");

    let rows = run_batch(&full_service(), &queries, ScoringMethod::Semantic).expect("batch");
    let results_path = dir.path().join("out/results.csv");
    write_results(&results_path, &rows).expect("write");
    let written = std::fs::read_to_string(&results_path).expect("read back");
    assert_eq!(written.lines().count(), 4);
    assert!(written.starts_with("query_id,rank,document_id\nq1,1,B\n"));

    assert!(matches!(read_queries(&dir.path().join("absent.csv")), Err(Error::NotFound(_))));

    let empty_path = dir.path().join("empty.csv");
    write_results(&empty_path, &[]).expect("write");
    assert_eq!(std::fs::read_to_string(&empty_path).expect("read"), "query_id,rank,document_id\n");
}
