//! Capability caching for execution-mode support probes.
//!
//! This module provides a thread-safe, injectable cache memoizing the result
//! of `supportsExecutionMode` probes. Mode support is effectively static for a
//! deployed contract, so entries persist for the lifetime of the cache and
//! there is no invalidation. The cache may be shared by several clients;
//! entries are keyed by client identity, target address and mode so distinct
//! triples never collide.

use alloy::primitives::{Address, B256};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, trace};

/// Identity of a client, distinguishing cache entries of executors that share
/// a [`SupportCache`].
pub type ClientId = u64;

/// Key for capability cache entries.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SupportKey {
    /// Identity of the probing client.
    pub client: ClientId,
    /// Target contract address.
    pub address: Address,
    /// The probed execution mode selector.
    pub mode: B256,
}

impl SupportKey {
    /// Creates a new capability cache key.
    pub fn new(client: ClientId, address: Address, mode: B256) -> Self {
        Self { client, address, mode }
    }
}

/// Thread-safe cache of execution-mode support flags.
#[derive(Debug, Default)]
pub struct SupportCache {
    entries: DashMap<SupportKey, bool>,
}

impl SupportCache {
    /// Creates a new, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached support flag for `key`, if any.
    pub fn get(&self, key: &SupportKey) -> Option<bool> {
        let entry = self.entries.get(key)?;
        trace!(address = %key.address, mode = %key.mode, "Support cache HIT");
        Some(*entry.value())
    }

    /// Caches the support flag for `key`.
    pub fn insert(&self, key: SupportKey, supported: bool) {
        self.entries.insert(key, supported);
    }

    /// Returns the memoized support flag for `key`, running `probe` on a miss.
    ///
    /// Probe failures propagate unmasked and are not cached, so a later call
    /// probes again. Concurrent misses for the same key may each run a probe;
    /// both write the same value, so the duplicate is harmless.
    pub async fn get_or_probe<F, Fut, E>(&self, key: SupportKey, probe: F) -> Result<bool, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<bool, E>>,
    {
        if let Some(supported) = self.get(&key) {
            return Ok(supported);
        }

        debug!(address = %key.address, mode = %key.mode, "Support cache MISS - probing");
        let supported = probe().await?;
        self.insert(key, supported);
        Ok(supported)
    }

    /// Get cache statistics for monitoring.
    pub fn stats(&self) -> CacheStats {
        CacheStats { entries: self.entries.len() }
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cached support flags.
    pub entries: usize,
}
