//! Fetches a web page and pulls a small metadata summary (title, description,
//! section, tags, keywords) out of its head without reading the whole body.

pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod snippet;

pub use extractor::{ExtractOptions, MetadataRecord, StopPolicy, extract_reader, extract_str};
pub use fetcher::{FetchError, FetchOptions, fetch};
pub use snippet::{extract_stream, snippet, snippet_with};
