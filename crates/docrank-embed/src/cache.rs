//! Process-wide embedding table cache.
//!
//! The table is loaded at most once per cache. Loads are serialized by the
//! cache lock, so concurrent first callers wait for one load instead of
//! starting their own. A failed load stores nothing and a later call retries.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use docrank_core::config::{resolve_with_base, EmbeddingSettings};
use docrank_core::{Error, Result};

use crate::table::EmbeddingTable;

static GLOBAL_CACHE: EmbeddingCache = EmbeddingCache::new();

/// Where a table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource {
    File(PathBuf),
    Hashed { dim: usize },
}

impl TableSource {
    /// `APP_USE_FAKE_EMBEDDINGS=1` (or `embedding.use_fake`) selects the hashed
    /// table; otherwise `embedding.table_path` is resolved against `base`.
    pub fn from_settings(settings: &EmbeddingSettings, base: &Path) -> Result<Self> {
        let fake_from_env = std::env::var("APP_USE_FAKE_EMBEDDINGS")
            .ok()
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
        if fake_from_env || settings.use_fake {
            return Ok(TableSource::Hashed { dim: settings.fake_dim });
        }
        match &settings.table_path {
            Some(path) => Ok(TableSource::File(resolve_with_base(base, path))),
            None => Err(Error::ModelUnavailable(
                "no embedding table configured (embedding.table_path)".into(),
            )),
        }
    }

    pub fn load(&self) -> Result<EmbeddingTable> {
        match self {
            TableSource::File(path) => EmbeddingTable::load_glove(path),
            TableSource::Hashed { dim } => {
                tracing::info!(dim, "using hashed development embeddings");
                EmbeddingTable::hashed(*dim)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct EmbeddingCache {
    slot: Mutex<Option<Arc<EmbeddingTable>>>,
}

impl EmbeddingCache {
    pub const fn new() -> Self {
        Self { slot: Mutex::new(None) }
    }

    /// Return the cached table, running `load` only if nothing is cached yet.
    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<EmbeddingTable>>
    where
        F: FnOnce() -> Result<EmbeddingTable>,
    {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = slot.as_ref() {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load()?);
        *slot = Some(Arc::clone(&table));
        Ok(table)
    }

    pub fn get(&self) -> Option<Arc<EmbeddingTable>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.get().is_some()
    }
}

/// The process-wide table. The first successful load wins; later calls get
/// the same `Arc` whatever source they name.
pub fn embedding_table(source: &TableSource) -> Result<Arc<EmbeddingTable>> {
    GLOBAL_CACHE.get_or_load(|| {
        tracing::info!(?source, "loading embedding table");
        source.load()
    })
}
