//! politefetch - a disk-caching, rate-limited HTTP fetcher
//!
//! Built for remote APIs that ban impolite clients: every resource is cached
//! on disk and reused within a freshness window, and the transfers that do
//! happen are spaced by a minimum gap and capped per trailing time window,
//! process-wide, no matter how many callers share the fetcher.

pub mod cache;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod throttle;

pub use cache::{CacheError, CacheStore};
pub use config::FetchConfig;
pub use fetch::{FetchError, Fetched, HttpTransport, ResourceFetcher, Transport, TransportError};
pub use throttle::{Pacer, WindowLimiter};
