//! CSV batch runs: `query_id,query_text` in, `query_id,rank,document_id` out.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use docrank_core::types::ScoringMethod;
use docrank_core::{Error, Result};

use crate::service::SearchService;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub query_id: String,
    pub query_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub query_id: String,
    pub rank: usize,
    pub document_id: String,
}

pub fn read_queries(path: &Path) -> Result<Vec<QueryRecord>> {
    let file = fs::File::open(path)
        .map_err(|e| Error::NotFound(format!("query file {}: {}", path.display(), e)))?;
    read_queries_from(file)
}

/// Parse a query batch; query ids must be unique.
pub fn read_queries_from<R: Read>(reader: R) -> Result<Vec<QueryRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for (row, record) in csv_reader.deserialize::<QueryRecord>().enumerate() {
        let record =
            record.map_err(|e| Error::InvalidInput(format!("query row {}: {}", row + 1, e)))?;
        if !seen.insert(record.query_id.clone()) {
            return Err(Error::InvalidInput(format!("duplicate query id '{}'", record.query_id)));
        }
        records.push(record);
    }
    Ok(records)
}

/// Rank every document for every query; yields `documents` rows per query.
pub fn run_batch(
    service: &SearchService,
    queries: &[QueryRecord],
    method: ScoringMethod,
) -> Result<Vec<ResultRecord>> {
    let mut rows = Vec::new();
    for query in queries {
        let ranking = service.rank_all(&query.query_text, method)?;
        rows.extend(ranking.into_iter().map(|r| ResultRecord {
            query_id: query.query_id.clone(),
            rank: r.rank,
            document_id: r.doc_id,
        }));
    }
    tracing::info!(queries = queries.len(), rows = rows.len(), %method, "batch complete");
    Ok(rows)
}

pub fn write_results(path: &Path, rows: &[ResultRecord]) -> Result<()> {
    let persistence = |reason: String| Error::Persistence { path: path.to_path_buf(), reason };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| persistence(e.to_string()))?;
    }
    let file = fs::File::create(path).map_err(|e| persistence(e.to_string()))?;
    write_results_to(file, rows).map_err(|e| persistence(e.to_string()))
}

/// Write result rows as CSV. The header is written even when there are no rows.
pub fn write_results_to<W: Write>(writer: W, rows: &[ResultRecord]) -> csv::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        csv_writer.write_record(["query_id", "rank", "document_id"])?;
    }
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
