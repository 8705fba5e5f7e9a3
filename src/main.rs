use anyhow::{Context, Result};
use clap::Parser;
use futures::{StreamExt, stream};
use pagesnip::{FetchOptions, MetadataRecord, StopPolicy, config::Config, snippet_with};
use serde::Serialize;
use tracing::warn;

/// Fetch pages and print their metadata, one JSON object per line.
#[derive(Debug, Parser)]
#[command(name = "pagesnip", version)]
struct Cli {
    /// Page addresses to fetch.
    #[arg(required = true)]
    urls: Vec<String>,

    /// Extra request header, `Name: value`. Replaces a default of the same name.
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Maximum decoded bytes read from each body.
    #[arg(long)]
    max_bytes: Option<usize>,

    /// When to stop scanning: `body` or `head`.
    #[arg(long)]
    stop: Option<StopPolicy>,

    /// Pages fetched at the same time.
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Pretty-print each object.
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct Line<'a> {
    url: &'a str,
    #[serde(flatten)]
    record: MetadataRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected 'Name: value', got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in '{}'", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Environment settings first, then command-line flags on top.
fn fetch_options(cli: &Cli, config: &Config) -> FetchOptions {
    let mut options = config.fetch_options();
    if let Some(timeout) = cli.timeout {
        options.timeout_secs = timeout;
    }
    if let Some(max_bytes) = cli.max_bytes {
        options.max_bytes = max_bytes;
    }
    cli.headers.iter().fold(options, |options, (name, value)| {
        options.with_header(name.as_str(), value.as_str())
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("loading configuration")?;

    let fetch_options = fetch_options(&cli, &config);
    let mut extract_options = config.extract_options();
    if let Some(stop) = cli.stop {
        extract_options.stop = stop;
    }

    let fetch_options = &fetch_options;
    let mut results = stream::iter(&cli.urls)
        .map(|url| async move {
            let result = snippet_with(url, fetch_options, extract_options).await;
            (url, result)
        })
        .buffered(cli.concurrency.max(1));

    let mut failures = 0usize;
    while let Some((url, result)) = results.next().await {
        let line = match result {
            Ok(record) => Line {
                url,
                record,
                error: None,
            },
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                failures += 1;
                Line {
                    url,
                    record: MetadataRecord::for_failure(&e),
                    error: Some(e.to_string()),
                }
            }
        };
        let json = if cli.pretty {
            serde_json::to_string_pretty(&line)?
        } else {
            serde_json::to_string(&line)?
        };
        println!("{}", json);
    }

    if failures > 0 {
        anyhow::bail!("{} of {} pages failed", failures, cli.urls.len());
    }
    Ok(())
}
