//! Memoization of ingested uploads by content identity.
//!
//! The pipeline itself stays pure; this layer sits in front of it and keys
//! results on the BLAKE3 hash of the uploaded bytes plus the detected format.
//! Failures are memoized too, so a hit always replays exactly what a miss
//! produced.

use crate::format::FileFormat;
use crate::pipeline::Pipeline;
use liquidity_core::{config::CacheConfig, IngestError, NormalizedTable};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Identity of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    digest: blake3::Hash,
    format: FileFormat,
}

impl CacheKey {
    pub fn new(format: FileFormat, content: &[u8]) -> Self {
        Self {
            digest: blake3::hash(content),
            format,
        }
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.digest.to_hex(), self.format)
    }
}

type CachedResult = Result<Arc<NormalizedTable>, IngestError>;

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// A pipeline with a bounded memo in front of it.
#[derive(Debug)]
pub struct IngestCache {
    pipeline: Pipeline,
    max_entries: usize,
    entries: HashMap<CacheKey, CachedResult>,
    /// Insertion order, oldest first.
    order: VecDeque<CacheKey>,
    hits: u64,
    misses: u64,
}

impl IngestCache {
    /// Create a cache in front of a pipeline.
    pub fn new(pipeline: Pipeline, config: &CacheConfig) -> Self {
        let max_entries = config.max_entries.max(1);
        Self {
            pipeline,
            max_entries,
            entries: HashMap::with_capacity(max_entries),
            order: VecDeque::with_capacity(max_entries),
            hits: 0,
            misses: 0,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Ingest an upload, reusing an earlier result for identical bytes.
    pub fn ingest(&mut self, file_name: &str, content: &[u8]) -> CachedResult {
        let format = FileFormat::detect(file_name)?;
        let key = CacheKey::new(format, content);

        if let Some(cached) = self.entries.get(&key) {
            self.hits += 1;
            debug!(%key, file_name, "ingest cache hit");
            return cached.clone();
        }

        self.misses += 1;
        debug!(%key, file_name, "ingest cache miss");
        let result = self.pipeline.ingest(file_name, content).map(Arc::new);
        self.insert(key, result.clone());
        result
    }

    /// Whether an upload is already memoized.
    pub fn contains(&self, file_name: &str, content: &[u8]) -> bool {
        FileFormat::detect(file_name)
            .map(|format| self.entries.contains_key(&CacheKey::new(format, content)))
            .unwrap_or(false)
    }

    fn insert(&mut self, key: CacheKey, result: CachedResult) {
        while self.entries.len() >= self.max_entries {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            debug!(key = %oldest, "ingest cache evicted");
        }
        self.entries.insert(key, result);
        self.order.push_back(key);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and reset counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
