use encoding_rs::{CoderResult, Decoder, Encoding};
use regex::Regex;
use std::sync::LazyLock;

/// Number of body bytes inspected for a `<meta>` charset declaration.
pub const PRESCAN_LEN: usize = 1024;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static META_HTTP_EQUIV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap()
});

/// Picks the encoding of a response body.
///
/// Order: byte-order mark, `charset` in the Content-Type header, `<meta>`
/// declarations in the first [`PRESCAN_LEN`] bytes, then a `chardetng` guess.
/// Labels `encoding_rs` does not know fall through to the next step.
pub fn detect_encoding(content_type: &str, prefix: &[u8]) -> &'static Encoding {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(prefix) {
        return encoding;
    }

    if let Some(encoding) = label_from(&CHARSET_REGEX, content_type) {
        return encoding;
    }

    let search_bytes = &prefix[..prefix.len().min(PRESCAN_LEN)];
    let search_str = String::from_utf8_lossy(search_bytes);

    if let Some(encoding) = label_from(&META_CHARSET_REGEX, &search_str) {
        return meta_override(encoding);
    }
    if let Some(encoding) = label_from(&META_HTTP_EQUIV_REGEX, &search_str) {
        return meta_override(encoding);
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(search_bytes, false);
    detector.guess(None, true)
}

fn label_from(regex: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let captures = regex.captures(haystack)?;
    let label = captures.get(1)?.as_str().trim().to_lowercase();
    Encoding::for_label(label.as_bytes())
}

// A document that was readable enough to declare UTF-16 in ASCII is not UTF-16.
fn meta_override(encoding: &'static Encoding) -> &'static Encoding {
    if encoding == encoding_rs::UTF_16LE || encoding == encoding_rs::UTF_16BE {
        encoding_rs::UTF_8
    } else {
        encoding
    }
}

/// Whether bytes in `encoding` can be turned into meaningful text at all.
pub fn is_decodable(encoding: &'static Encoding) -> bool {
    encoding != encoding_rs::REPLACEMENT
}

/// Incremental transcoder to UTF-8.
///
/// Multi-byte sequences split across chunk boundaries are carried over to the
/// next call; malformed input becomes U+FFFD.
pub struct ChunkDecoder {
    decoder: Decoder,
}

impl ChunkDecoder {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            decoder: encoding.new_decoder(),
        }
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.decoder.encoding()
    }

    /// Decodes `src`; `last` flushes any buffered partial sequence.
    pub fn decode(&mut self, src: &[u8], last: bool) -> String {
        let capacity = self
            .decoder
            .max_utf8_buffer_length(src.len())
            .unwrap_or(src.len() * 3 + 16);
        let mut out = String::with_capacity(capacity);
        let mut consumed = 0;
        loop {
            let (result, read, _had_replacements) =
                self.decoder
                    .decode_to_string(&src[consumed..], &mut out, last);
            consumed += read;
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => {
                    let remaining = src.len() - consumed;
                    out.reserve(
                        self.decoder
                            .max_utf8_buffer_length(remaining)
                            .unwrap_or(remaining * 3 + 16),
                    )
                }
            }
        }
        out
    }
}

/// Shortens `text` to at most `limit` bytes without splitting a character.
pub fn truncate_to_boundary(text: &mut String, limit: usize) {
    if text.len() <= limit {
        return;
    }
    let mut cut = limit;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
}
