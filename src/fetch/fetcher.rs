//! Cached, throttled resource fetching
//!
//! `ResourceFetcher` is the externally visible operation: serve fresh cache
//! entries without touching the network, and route every actual transfer
//! through the admission window and the pacing gap before committing the
//! result to disk.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::cache::{CacheError, CacheStore};
use crate::config::FetchConfig;
use crate::throttle::{Pacer, WindowLimiter};

use super::transport::{Transport, TransportError};

/// Errors surfaced by a fetch
///
/// Both kinds propagate to the caller unmodified: there are no silent
/// retries here, and a cache write failure is reported even though a usable
/// payload was already obtained, since the next call would otherwise
/// re-fetch needlessly.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The network transfer failed
    #[error("transfer failed: {0}")]
    Transport(#[from] TransportError),

    /// The cache could not be read or written
    #[error("cache failure: {0}")]
    Cache(#[from] CacheError),
}

/// A fetched payload plus where it came from
#[derive(Debug, Clone)]
pub struct Fetched {
    /// The raw payload bytes
    pub payload: Vec<u8>,
    /// True if the payload was served from a fresh cache entry
    pub from_cache: bool,
    /// When the backing cache entry was written
    pub stored_at: DateTime<Utc>,
}

/// Fetches resources by key, through the cache and both throttle gates
///
/// One instance per process is the deployment default: the throttle state it
/// holds is what keeps concurrent callers collectively inside the remote
/// service's usage policy. Tests construct their own instances with private
/// state.
pub struct ResourceFetcher {
    store: CacheStore,
    pacer: Pacer,
    limiter: WindowLimiter,
    transport: Arc<dyn Transport>,
    max_age: Duration,
}

impl ResourceFetcher {
    /// Creates a fetcher from explicitly constructed components
    pub fn new(
        store: CacheStore,
        pacer: Pacer,
        limiter: WindowLimiter,
        transport: Arc<dyn Transport>,
        max_age: Duration,
    ) -> Self {
        Self {
            store,
            pacer,
            limiter,
            transport,
            max_age,
        }
    }

    /// Creates a fetcher with throttle gates built from `config`
    pub fn from_config(store: CacheStore, transport: Arc<dyn Transport>, config: &FetchConfig) -> Self {
        Self::new(
            store,
            Pacer::new(config.min_gap),
            WindowLimiter::new(config.window_capacity, config.window, config.window_margin),
            transport,
            config.max_age,
        )
    }

    /// Returns the store this fetcher commits payloads to
    ///
    /// Callers that want explicit stale fallback on transfer failure read
    /// through this; `fetch` itself never falls back implicitly.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Fetches the payload for `key`, from cache when fresh
    pub async fn fetch(&self, key: &str) -> Result<Vec<u8>, FetchError> {
        Ok(self.fetch_report(key).await?.payload)
    }

    /// Fetches the payload for `key` along with cache provenance
    ///
    /// A fresh cache hit involves no network activity and no throttling. On
    /// a miss or stale entry, the caller may block for the full duration of
    /// admission control, pacing and the transfer itself.
    pub async fn fetch_report(&self, key: &str) -> Result<Fetched, FetchError> {
        if self.store.is_fresh(key, self.max_age)? {
            debug!(key, "serving fresh cache entry");
            return Ok(Fetched {
                payload: self.store.read(key)?,
                from_cache: true,
                stored_at: self.store.stored_at(key)?,
            });
        }

        self.limiter.admit().await;
        self.pacer.wait_turn().await;

        debug!(key, "starting network transfer");
        match self.transport.get(key).await {
            Ok(payload) => {
                let written = self.store.write(key, &payload);
                self.pacer.record_fetch_ended().await;
                written?;
                Ok(Fetched {
                    stored_at: self.store.stored_at(key)?,
                    payload,
                    from_cache: false,
                })
            }
            Err(err) => {
                // A failed attempt still consumed remote-side attention and
                // counts toward pacing.
                self.pacer.record_fetch_ended().await;
                Err(FetchError::Transport(err))
            }
        }
    }
}
