//! JSON persistence for [`LexicalIndex`].
//!
//! The record carries `document_ids`, `vocabulary`, `idf`, the dense `matrix`
//! and the build `params`. Records written before `idf` was stored load with a
//! uniform weight of 1.0.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use docrank_core::types::LexicalParams;
use docrank_core::{Error, Result};

use crate::index::LexicalIndex;

#[derive(Serialize)]
struct IndexRecordRef<'a> {
    document_ids: &'a [String],
    vocabulary: &'a [String],
    idf: &'a [f64],
    matrix: &'a [Vec<f64>],
    params: &'a LexicalParams,
}

#[derive(Deserialize)]
struct IndexRecord {
    document_ids: Vec<String>,
    vocabulary: Vec<String>,
    #[serde(default)]
    idf: Vec<f64>,
    matrix: Vec<Vec<f64>>,
    #[serde(default)]
    params: LexicalParams,
}

fn persistence(path: &Path, reason: impl ToString) -> Error {
    Error::Persistence { path: path.to_path_buf(), reason: reason.to_string() }
}

pub fn save_index(index: &LexicalIndex, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| persistence(path, e))?;
    }
    let record = IndexRecordRef {
        document_ids: index.document_ids(),
        vocabulary: index.vocabulary(),
        idf: index.idf(),
        matrix: index.matrix(),
        params: index.params(),
    };
    let file = File::create(path).map_err(|e| persistence(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &record).map_err(|e| persistence(path, e))?;
    writer.flush().map_err(|e| persistence(path, e))?;
    tracing::info!(
        path = %path.display(),
        documents = index.document_ids().len(),
        "saved lexical index"
    );
    Ok(())
}

pub fn load_index(path: &Path) -> Result<LexicalIndex> {
    let file = File::open(path).map_err(|e| persistence(path, e))?;
    let record: IndexRecord = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| persistence(path, format!("malformed index: {}", e)))?;

    let idf = if record.idf.is_empty() {
        tracing::debug!(path = %path.display(), "index has no idf weights, using 1.0");
        vec![1.0; record.vocabulary.len()]
    } else {
        record.idf
    };
    let index = LexicalIndex::from_parts(
        record.document_ids,
        record.vocabulary,
        idf,
        record.matrix,
        record.params,
    )
    .map_err(|e| persistence(path, e))?;
    tracing::info!(
        path = %path.display(),
        documents = index.document_ids().len(),
        "loaded lexical index"
    );
    Ok(index)
}
