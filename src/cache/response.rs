//! Address → validation result memoization.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::features::{FeatureFlag, FeatureRegistry};
use crate::observability::metrics;

/// A remembered upstream answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub validation: bool,
    pub message: String,
}

/// A thread-safe cache of upstream answers, gated by `efficiency`.
#[derive(Clone)]
pub struct ResponseCache {
    features: Arc<FeatureRegistry>,
    inner: Arc<DashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(features: Arc<FeatureRegistry>) -> Self {
        Self {
            features,
            inner: Arc::new(DashMap::new()),
        }
    }

    fn enabled(&self) -> bool {
        self.features.is_flag_enabled(FeatureFlag::Efficiency)
    }

    /// Look up an address. Always misses while `efficiency` is off.
    pub fn lookup(&self, address: &str) -> Option<CacheEntry> {
        if !self.enabled() {
            return None;
        }
        let hit = self.inner.get(address).map(|r| r.value().clone());
        if hit.is_some() {
            metrics::record_cache_hit();
        }
        hit
    }

    /// Remember an answer. Ignored while `efficiency` is off.
    pub fn store(&self, address: &str, entry: CacheEntry) {
        if !self.enabled() {
            return;
        }
        self.inner.insert(address.to_string(), entry);
        metrics::record_cache_size(self.inner.len());
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Drop every entry, returning how many were removed.
    pub fn clear(&self) -> usize {
        let removed = self.inner.len();
        self.inner.clear();
        metrics::record_cache_size(0);
        removed
    }
}
