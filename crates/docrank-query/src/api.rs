//! Transport-free search API: request/response shapes and the handler that
//! maps a JSON body to a status code and JSON reply.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use docrank_core::types::ScoringMethod;
use docrank_core::{Error, Result};

use crate::service::{SearchResults, SearchService};

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_SERVER_ERROR: u16 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub rank: usize,
    pub document_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub method: String,
    pub results: Vec<ResultItem>,
}

impl From<SearchResults> for SearchResponse {
    fn from(found: SearchResults) -> Self {
        Self {
            query: found.query,
            method: found.method.to_string(),
            results: found
                .results
                .into_iter()
                .map(|r| ResultItem { rank: r.rank, document_id: r.doc_id, score: r.score })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub documents: usize,
    pub methods: Vec<String>,
}

pub fn health(service: &SearchService) -> HealthReport {
    let snapshot = service.snapshot();
    HealthReport {
        status: "healthy".to_string(),
        documents: snapshot.documents(),
        methods: snapshot.methods().iter().map(ToString::to_string).collect(),
    }
}

/// Run one search request. Malformed requests, unknown methods and a zero
/// `top_k` answer 400; every other failure answers 500.
pub fn handle_search(service: &SearchService, body: &Value) -> (u16, Value) {
    let request = match SearchRequest::deserialize(body) {
        Ok(request) => request,
        Err(e) => return error_reply(STATUS_BAD_REQUEST, &format!("invalid request: {}", e)),
    };
    match execute(service, &request) {
        Ok(response) => match serde_json::to_value(&response) {
            Ok(value) => (STATUS_OK, value),
            Err(e) => error_reply(STATUS_SERVER_ERROR, &e.to_string()),
        },
        Err(e) => {
            let status = if e.is_client_error() { STATUS_BAD_REQUEST } else { STATUS_SERVER_ERROR };
            tracing::warn!(status, error = %e, "search request failed");
            error_reply(status, &e.to_string())
        }
    }
}

fn execute(service: &SearchService, request: &SearchRequest) -> Result<SearchResponse> {
    let method = request.method.as_deref().map(str::parse::<ScoringMethod>).transpose()?;
    if request.top_k == Some(0) {
        return Err(Error::InvalidTopK(0));
    }
    Ok(service.search(&request.query, method, request.top_k)?.into())
}

fn error_reply(status: u16, message: &str) -> (u16, Value) {
    (status, json!({ "error": message }))
}
