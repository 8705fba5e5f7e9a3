use crate::fetcher::{
    errors::FetchError,
    headers::{default_headers, merge_headers},
    pipeline::{ChunkDecoder, PRESCAN_LEN, detect_encoding, is_decodable},
    stream::TextStream,
    types::FetchOptions,
};
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder, Response};
use tracing::{debug, instrument};

/// Shared transport.
///
/// Certificate validation is disabled on purpose: metadata is fetched from
/// whatever the caller points at, and many sites in the wild serve expired or
/// self-signed certificates. Callers that need authenticated transport must not
/// use this client.
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .danger_accept_invalid_certs(true)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .expect("Failed to build HTTP client")
});

/// Opens `url` and returns its decoded body as a lazily read stream.
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch(url: &str, options: &FetchOptions) -> Result<TextStream, FetchError> {
    let parsed_url = url::Url::parse(url)?;
    let headers = merge_headers(default_headers(), &options.headers)?;

    let mut response = HTTP_CLIENT
        .get(parsed_url)
        .headers(headers)
        .timeout(options.timeout())
        .send()
        .await
        .map_err(FetchError::from_reqwest_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http { status });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    let prefix = read_prefix(&mut response)
        .await
        .map_err(|e| FetchError::Charset {
            status,
            reason: format!("failed to read body for charset detection: {}", e),
        })?;

    let encoding = detect_encoding(&content_type, &prefix);
    if !is_decodable(encoding) {
        return Err(FetchError::Charset {
            status,
            reason: format!("content of type '{}' cannot be transcoded", content_type),
        });
    }

    debug!(
        "Opened stream (status: {}, content-type: {}, encoding: {})",
        status,
        content_type,
        encoding.name()
    );

    Ok(TextStream::new(
        response,
        ChunkDecoder::new(encoding),
        prefix,
        options.byte_limit(),
    ))
}

// Buffers just enough of the body to sniff a BOM or a <meta> charset.
async fn read_prefix(response: &mut Response) -> Result<Vec<u8>, FetchError> {
    let mut prefix = Vec::with_capacity(PRESCAN_LEN);
    while prefix.len() < PRESCAN_LEN {
        match response
            .chunk()
            .await
            .map_err(FetchError::from_reqwest_error)?
        {
            Some(bytes) => prefix.extend_from_slice(&bytes),
            None => break,
        }
    }
    Ok(prefix)
}
