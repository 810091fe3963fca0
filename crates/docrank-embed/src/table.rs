use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::hash::Hasher;
use std::io::{BufRead, BufReader};
use std::path::Path;

use twox_hash::XxHash64;

use docrank_core::{Error, Result};

/// Read-only word → vector table of a fixed dimension.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    dim: usize,
    backing: Backing,
}

#[derive(Debug, Clone)]
enum Backing {
    Words(HashMap<String, Vec<f64>>),
    /// Every word maps to a deterministic pseudo-random vector.
    Hashed,
}

impl EmbeddingTable {
    pub fn from_entries<I>(dim: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<f64>)>,
    {
        if dim == 0 {
            return Err(Error::ModelUnavailable("embedding dimension must be at least 1".into()));
        }
        let mut words = HashMap::new();
        for (word, vector) in entries {
            if vector.len() != dim {
                return Err(Error::DimensionMismatch { expected: dim, found: vector.len() });
            }
            if !vector.iter().all(|v| v.is_finite()) {
                return Err(Error::ModelUnavailable(format!("vector for {:?} is not finite", word)));
            }
            words.entry(word).or_insert(vector);
        }
        Ok(Self { dim, backing: Backing::Words(words) })
    }

    /// Development table: no file needed, stable across runs and platforms.
    pub fn hashed(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::ModelUnavailable("embedding dimension must be at least 1".into()));
        }
        Ok(Self { dim, backing: Backing::Hashed })
    }

    /// Load a GloVe-style text file: `word v1 v2 ... vD` per line.
    ///
    /// The dimension comes from the first non-empty line; any later line with a
    /// different number of values, or a value that is not a finite number, fails
    /// the load.
    pub fn load_glove(path: &Path) -> Result<Self> {
        let unavailable =
            |reason: String| Error::ModelUnavailable(format!("{}: {}", path.display(), reason));
        let file = File::open(path).map_err(|e| unavailable(e.to_string()))?;

        let mut dim = 0usize;
        let mut words: HashMap<String, Vec<f64>> = HashMap::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| unavailable(e.to_string()))?;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else { continue };
            let vector = parts
                .map(str::parse::<f64>)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| unavailable(format!("line {}: {}", line_no + 1, e)))?;
            if !vector.iter().all(|v| v.is_finite()) {
                return Err(unavailable(format!("line {}: non-finite value", line_no + 1)));
            }
            if dim == 0 {
                if vector.is_empty() {
                    return Err(unavailable(format!("line {} has no vector values", line_no + 1)));
                }
                dim = vector.len();
            } else if vector.len() != dim {
                return Err(unavailable(format!(
                    "line {} has {} values, expected {}",
                    line_no + 1,
                    vector.len(),
                    dim
                )));
            }
            words.entry(word.to_string()).or_insert(vector);
        }
        if words.is_empty() {
            return Err(unavailable("table is empty".into()));
        }
        tracing::info!(path = %path.display(), words = words.len(), dim, "loaded embedding table");
        Ok(Self { dim, backing: Backing::Words(words) })
    }

    pub fn dim(&self) -> usize { self.dim }

    /// Number of stored words; `None` for the hashed table, which covers every word.
    pub fn word_count(&self) -> Option<usize> {
        match &self.backing {
            Backing::Words(words) => Some(words.len()),
            Backing::Hashed => None,
        }
    }

    pub fn get(&self, word: &str) -> Option<Cow<'_, [f64]>> {
        match &self.backing {
            Backing::Words(words) => words.get(word).map(|v| Cow::Borrowed(v.as_slice())),
            Backing::Hashed => Some(Cow::Owned(hashed_vector(word, self.dim))),
        }
    }
}

fn hashed_vector(word: &str, dim: usize) -> Vec<f64> {
    (0..dim)
        .map(|i| {
            let mut hasher = XxHash64::with_seed(i as u64);
            hasher.write(word.as_bytes());
            let h = hasher.finish();
            // Map the top 32 bits into [-1, 1].
            ((h >> 32) as f64 / u32::MAX as f64) * 2.0 - 1.0
        })
        .collect()
}
