//! Fetch orchestration: cache check, throttling, transfer, commit
//!
//! This module ties the cache store and the two throttle gates around a
//! pluggable network transport. `ResourceFetcher::fetch` is the sole
//! operation exposed to parsing and domain layers; they decode the returned
//! bytes entirely outside this crate.

mod fetcher;
mod transport;

pub use fetcher::{FetchError, Fetched, ResourceFetcher};
pub use transport::{HttpTransport, Transport, TransportError};
