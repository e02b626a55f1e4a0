//! politefetch - fetch URLs through a disk cache with polite rate limiting
//!
//! Thin binary front end: parses arguments, wires one shared fetcher, runs
//! all URLs concurrently and reports per-URL outcomes. The throttle gates
//! inside the fetcher keep the concurrent fetches collectively inside the
//! remote service's usage policy.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use futures::future::join_all;
use tracing_subscriber::EnvFilter;

use politefetch::cache::fingerprint;
use politefetch::cli::{Cli, FetchOutcome, RunConfig};
use politefetch::{CacheStore, FetchConfig, HttpTransport, ResourceFetcher};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let run = match RunConfig::from_cli(&cli) {
        Ok(run) => run,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    init_tracing(run.verbose);

    let store = match &run.cache_dir {
        Some(dir) => CacheStore::with_dir(dir.clone()),
        None => match CacheStore::new() {
            Some(store) => store,
            None => {
                eprintln!("could not determine a cache directory; pass --cache-dir");
                return ExitCode::FAILURE;
            }
        },
    };

    let config = FetchConfig {
        max_age: run.max_age,
        ..FetchConfig::default()
    };
    let transport = match HttpTransport::new(config.request_timeout) {
        Ok(transport) => transport,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let fetcher = Arc::new(ResourceFetcher::from_config(
        store,
        Arc::new(transport),
        &config,
    ));

    let tasks = cli.urls.iter().map(|url| {
        let fetcher = Arc::clone(&fetcher);
        let url = url.clone();
        async move {
            let result = fetcher.fetch_report(&url).await;
            (url, result)
        }
    });
    let results = join_all(tasks).await;

    let mut failed = false;
    let mut outcomes = Vec::with_capacity(results.len());
    for (url, result) in results {
        match result {
            Ok(fetched) => {
                if let Err(err) = deliver(&run, &url, &fetched.payload) {
                    eprintln!("{url}: {err}");
                    failed = true;
                }
                outcomes.push(FetchOutcome::success(url, &fetched));
            }
            Err(err) => {
                eprintln!("{url}: {err}");
                failed = true;
                outcomes.push(FetchOutcome::failure(url, &err));
            }
        }
    }

    if run.json {
        match serde_json::to_string_pretty(&outcomes) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("failed to encode run summary: {err}");
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Installs the log subscriber; `--verbose` forces debug for this crate
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("politefetch=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("politefetch=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Writes a payload to the output directory, or stdout when none is set
///
/// With `--json` and no output directory, payloads are not written at all;
/// stdout carries the summary instead.
fn deliver(run: &RunConfig, url: &str, payload: &[u8]) -> io::Result<()> {
    match &run.out_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(format!("{}.http.raw", fingerprint(url)));
            std::fs::write(path, payload)
        }
        None if run.json => Ok(()),
        None => io::stdout().write_all(payload),
    }
}
