//! Command-line interface parsing for politefetch
//!
//! This module handles parsing of CLI arguments using clap and derives the
//! run configuration and the per-URL outcome records the binary reports.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use thiserror::Error;

use crate::fetch::{FetchError, Fetched};

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The freshness window must be at least one hour
    #[error("--max-age must be at least 1 hour, got {0}")]
    InvalidMaxAge(u64),
}

/// politefetch - fetch URLs through a disk cache with polite rate limiting
///
/// Fresh cache entries are served without network activity. Cache misses go
/// through two throttle gates shared by all URLs in the run: a minimum gap
/// between transfers and a cap on transfers per trailing time window.
#[derive(Parser, Debug)]
#[command(name = "politefetch")]
#[command(about = "Fetch URLs through a disk cache with polite rate limiting")]
#[command(version)]
pub struct Cli {
    /// URLs to fetch
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Directory for cached payloads (defaults to the user cache directory)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Freshness window in hours; cached entries younger than this are
    /// served without a network transfer
    #[arg(long, default_value_t = 48, value_name = "HOURS")]
    pub max_age: u64,

    /// Write each payload to a file under this directory instead of stdout
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Print a JSON summary of the run to stdout instead of raw payloads
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration derived from CLI arguments for a single run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Cache directory override, if any
    pub cache_dir: Option<PathBuf>,
    /// Freshness window for cached entries
    pub max_age: Duration,
    /// Directory payloads are written into, if any
    pub out_dir: Option<PathBuf>,
    /// Whether to emit the JSON run summary
    pub json: bool,
    /// Whether debug logging was requested
    pub verbose: bool,
}

impl RunConfig {
    /// Validates and converts parsed CLI arguments
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.max_age == 0 {
            return Err(CliError::InvalidMaxAge(cli.max_age));
        }

        Ok(Self {
            cache_dir: cli.cache_dir.clone(),
            max_age: Duration::from_secs(cli.max_age * 3600),
            out_dir: cli.out_dir.clone(),
            json: cli.json,
            verbose: cli.verbose,
        })
    }
}

/// Per-URL result record for the JSON run summary
#[derive(Debug, Serialize)]
pub struct FetchOutcome {
    /// The requested URL
    pub url: String,
    /// Whether the fetch succeeded
    pub ok: bool,
    /// True if the payload came from a fresh cache entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_cache: Option<bool>,
    /// Payload size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    /// When the backing cache entry was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_at: Option<DateTime<Utc>>,
    /// Failure description, present only when `ok` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn success(url: String, fetched: &Fetched) -> Self {
        Self {
            url,
            ok: true,
            from_cache: Some(fetched.from_cache),
            bytes: Some(fetched.payload.len()),
            stored_at: Some(fetched.stored_at),
            error: None,
        }
    }

    pub fn failure(url: String, err: &FetchError) -> Self {
        Self {
            url,
            ok: false,
            from_cache: None,
            bytes: None,
            stored_at: None,
            error: Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_single_url() {
        let cli = Cli::parse_from(["politefetch", "http://example.com/a"]);
        assert_eq!(cli.urls, vec!["http://example.com/a"]);
        assert_eq!(cli.max_age, 48);
        assert!(!cli.json);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_multiple_urls() {
        let cli = Cli::parse_from([
            "politefetch",
            "http://example.com/a",
            "http://example.com/b",
        ]);
        assert_eq!(cli.urls.len(), 2);
    }

    #[test]
    fn test_cli_requires_at_least_one_url() {
        let result = Cli::try_parse_from(["politefetch"]);
        assert!(result.is_err(), "Zero URLs should be rejected");
    }

    #[test]
    fn test_cli_parse_flags() {
        let cli = Cli::parse_from([
            "politefetch",
            "--cache-dir",
            "/tmp/pf-cache",
            "--max-age",
            "24",
            "--out-dir",
            "/tmp/pf-out",
            "--json",
            "--verbose",
            "http://example.com/a",
        ]);
        assert_eq!(cli.cache_dir.as_deref(), Some(std::path::Path::new("/tmp/pf-cache")));
        assert_eq!(cli.max_age, 24);
        assert_eq!(cli.out_dir.as_deref(), Some(std::path::Path::new("/tmp/pf-out")));
        assert!(cli.json);
        assert!(cli.verbose);
    }

    #[test]
    fn test_run_config_from_cli_defaults() {
        let cli = Cli::parse_from(["politefetch", "http://example.com/a"]);
        let run = RunConfig::from_cli(&cli).unwrap();
        assert_eq!(run.max_age, Duration::from_secs(48 * 3600));
        assert!(run.cache_dir.is_none());
        assert!(run.out_dir.is_none());
        assert!(!run.json);
    }

    #[test]
    fn test_run_config_converts_hours() {
        let cli = Cli::parse_from(["politefetch", "--max-age", "24", "http://example.com/a"]);
        let run = RunConfig::from_cli(&cli).unwrap();
        assert_eq!(run.max_age, Duration::from_secs(24 * 3600));
    }

    #[test]
    fn test_run_config_rejects_zero_max_age() {
        let cli = Cli::parse_from(["politefetch", "--max-age", "0", "http://example.com/a"]);
        let result = RunConfig::from_cli(&cli);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("max-age"));
    }

    #[test]
    fn test_fetch_outcome_failure_carries_message() {
        let err = FetchError::Cache(crate::cache::CacheError::NotFound {
            key: "http://example.com/a".to_string(),
        });
        let outcome = FetchOutcome::failure("http://example.com/a".to_string(), &err);
        assert!(!outcome.ok);
        assert!(outcome.error.unwrap().contains("no cached entry"));
        assert!(outcome.bytes.is_none());
    }

    #[test]
    fn test_fetch_outcome_serializes_without_null_noise() {
        let err = FetchError::Cache(crate::cache::CacheError::NotFound {
            key: "http://example.com/a".to_string(),
        });
        let outcome = FetchOutcome::failure("http://example.com/a".to_string(), &err);
        let json = serde_json::to_string(&outcome).expect("Should serialize");
        assert!(!json.contains("stored_at"), "Absent fields should be skipped");
        assert!(json.contains("\"ok\":false"));
    }
}
