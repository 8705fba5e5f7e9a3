use crate::fetcher::{
    errors::FetchError,
    pipeline::{ChunkDecoder, truncate_to_boundary},
};
use encoding_rs::Encoding;
use reqwest::{Response, StatusCode};
use url::Url;

/// Decoded body of a successful response, read lazily.
///
/// Owns the underlying connection; dropping the stream releases it. At most
/// `limit` bytes of UTF-8 text are ever yielded.
pub struct TextStream {
    response: Response,
    status: StatusCode,
    url_final: Url,
    decoder: ChunkDecoder,
    prefix: Option<Vec<u8>>,
    remaining: usize,
    finished: bool,
}

impl TextStream {
    pub(crate) fn new(
        response: Response,
        decoder: ChunkDecoder,
        prefix: Vec<u8>,
        limit: usize,
    ) -> Self {
        Self {
            status: response.status(),
            url_final: response.url().clone(),
            response,
            decoder,
            prefix: Some(prefix),
            remaining: limit,
            finished: false,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn url(&self) -> &Url {
        &self.url_final
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.decoder.encoding()
    }

    /// Next non-empty chunk of decoded text, `Ok(None)` once the body or the
    /// byte budget is exhausted.
    pub async fn next_chunk(&mut self) -> Result<Option<String>, FetchError> {
        loop {
            if self.finished {
                return Ok(None);
            }

            let mut text = match self.prefix.take() {
                Some(bytes) => self.decoder.decode(&bytes, false),
                None => match self
                    .response
                    .chunk()
                    .await
                    .map_err(FetchError::from_reqwest_error)?
                {
                    Some(bytes) => self.decoder.decode(&bytes, false),
                    None => {
                        self.finished = true;
                        self.decoder.decode(&[], true)
                    }
                },
            };

            if text.len() >= self.remaining {
                truncate_to_boundary(&mut text, self.remaining);
                self.finished = true;
            }
            self.remaining -= text.len();

            if !text.is_empty() {
                return Ok(Some(text));
            }
        }
    }

    /// Drains the stream into one string.
    pub async fn read_to_string(mut self) -> Result<String, FetchError> {
        let mut body = String::new();
        while let Some(chunk) = self.next_chunk().await? {
            body.push_str(&chunk);
        }
        Ok(body)
    }
}

impl std::fmt::Debug for TextStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextStream")
            .field("status", &self.status)
            .field("url_final", &self.url_final)
            .field("encoding", &self.encoding().name())
            .field("remaining", &self.remaining)
            .field("finished", &self.finished)
            .finish()
    }
}
