use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::extract::HtmlTextExtractor;
use crate::traits::TextExtractor;
use crate::types::{Corpus, Document};

const HTML_EXTENSIONS: [&str; 2] = ["html", "htm"];

/// Turns raw HTML files into a [`Corpus`] of normalized text.
#[derive(Default)]
pub struct CorpusLoader<E: TextExtractor = HtmlTextExtractor> {
    extractor: E,
}

impl CorpusLoader {
    pub fn new() -> Self { Self::default() }
}

impl<E: TextExtractor> CorpusLoader<E> {
    pub fn with_extractor(extractor: E) -> Self { Self { extractor } }

    /// Load an explicit `{doc_id -> path}` mapping. Missing files are skipped
    /// with a warning; the corpus follows the map's (sorted) id order.
    pub fn load_paths(&self, paths: &BTreeMap<String, PathBuf>) -> Result<Corpus> {
        let mut documents = Vec::with_capacity(paths.len());
        for (doc_id, path) in paths {
            if !path.is_file() {
                tracing::warn!(
                    doc_id = %doc_id,
                    path = %path.display(),
                    "missing corpus file, skipping"
                );
                continue;
            }
            documents.push(self.load_document(doc_id, path));
        }
        Corpus::new(documents)
    }

    /// Load every `*.html`/`*.htm` file under `dir`; the file stem becomes the doc_id.
    ///
    /// Files are visited in sorted path order. When two files share a stem the
    /// first one wins and the later one is skipped with a warning.
    pub fn load_directory(&self, dir: &Path) -> Result<Corpus> {
        self.load_directory_limited(dir, usize::MAX)
    }

    pub fn load_directory_limited(&self, dir: &Path, limit: usize) -> Result<Corpus> {
        if !dir.is_dir() {
            return Err(Error::NotFound(format!("corpus directory {}", dir.display())));
        }
        let mut files = self.list_html_files(dir);
        if files.is_empty() {
            tracing::warn!(dir = %dir.display(), "no .html files found");
        }
        if files.len() > limit {
            files.truncate(limit);
            tracing::info!(limit, "limited corpus to first files");
        }
        let mut documents = Vec::with_capacity(files.len());
        let mut seen = HashSet::new();
        for (file_index, file_path) in files.iter().enumerate() {
            tracing::debug!(
                "Processing file {}/{}: {}",
                file_index + 1,
                files.len(),
                file_path.display()
            );
            let Some(doc_id) = extract_doc_id(file_path) else {
                tracing::warn!(
                    path = %file_path.display(),
                    "file name is not valid UTF-8, skipping"
                );
                continue;
            };
            if !seen.insert(doc_id.clone()) {
                tracing::warn!(
                    doc_id = %doc_id,
                    path = %file_path.display(),
                    "duplicate document id, keeping the first file"
                );
                continue;
            }
            documents.push(self.load_document(&doc_id, file_path));
        }
        documents.sort_by(|a, b| a.doc_id.cmp(&b.doc_id));
        tracing::info!(documents = documents.len(), dir = %dir.display(), "loaded corpus");
        Corpus::new(documents)
    }

    /// A file that cannot be read becomes an empty document rather than aborting the load.
    fn load_document(&self, doc_id: &str, path: &Path) -> Document {
        let text = match fs::read(path) {
            Ok(raw) => self.extractor.extract(&raw),
            Err(e) => {
                tracing::warn!(
                    doc_id = %doc_id,
                    path = %path.display(),
                    error = %e,
                    "failed to read document"
                );
                String::new()
            }
        };
        tracing::debug!(doc_id = %doc_id, chars = text.len(), "loaded document");
        Document::new(doc_id, text)
    }

    fn list_html_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut html_files = Vec::new();
        let entries = walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok());
        for entry in entries.filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            let is_html = path
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| HTML_EXTENSIONS.iter().any(|h| ext.eq_ignore_ascii_case(h)));
            if is_html { html_files.push(path.to_path_buf()); }
        }
        html_files.sort();
        html_files
    }
}

fn extract_doc_id(file_path: &Path) -> Option<String> {
    file_path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
}
