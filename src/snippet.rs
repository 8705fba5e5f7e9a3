use std::ops::ControlFlow;

use tracing::{debug, info, instrument};

use crate::extractor::{EventTokenizer, ExtractOptions, Harvest, MetadataRecord, advance};
use crate::fetcher::{FetchError, FetchOptions, TextStream, fetch};

/// Fetches `url` and extracts its metadata with the default stop policy.
///
/// On failure the error carries the status code known at that point;
/// [`MetadataRecord::for_failure`] turns it into the status-only record.
pub async fn snippet(url: &str, options: &FetchOptions) -> Result<MetadataRecord, FetchError> {
    snippet_with(url, options, ExtractOptions::default()).await
}

#[instrument(skip_all, fields(url = %url))]
pub async fn snippet_with(
    url: &str,
    options: &FetchOptions,
    extract: ExtractOptions,
) -> Result<MetadataRecord, FetchError> {
    let stream = fetch(url, options).await?;
    let record = extract_stream(stream, extract).await;
    info!(
        "Extracted metadata (status: {}, title: {:?}, tags: {:?})",
        record.status_code, record.title, record.tags
    );
    Ok(record)
}

/// Scans a fetched body, pulling chunks only until the stop policy fires.
///
/// The stream is dropped, and its connection released, as soon as the scan
/// ends. A read error mid-body truncates the scan instead of failing it.
pub async fn extract_stream(mut stream: TextStream, options: ExtractOptions) -> MetadataRecord {
    let status_code = stream.status().as_u16();
    let mut tokenizer = EventTokenizer::new();
    let mut harvest = Harvest::default();

    loop {
        while let Some(event) = tokenizer.next_event() {
            match advance(harvest, &event, options.stop) {
                ControlFlow::Continue(next) => harvest = next,
                ControlFlow::Break(done) => {
                    let mut record = done.into_record();
                    record.status_code = status_code;
                    return record;
                }
            }
        }

        if tokenizer.is_done() {
            break;
        }

        match stream.next_chunk().await {
            Ok(Some(chunk)) => tokenizer.feed(&chunk),
            Ok(None) => tokenizer.finish(),
            Err(e) => {
                debug!("Body read failed: {}", e);
                tokenizer.fail(e.to_string());
            }
        }
    }

    let mut record = harvest.into_record();
    record.status_code = status_code;
    record
}
