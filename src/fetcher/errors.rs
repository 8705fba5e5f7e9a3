use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("request error: {0}")]
    Request(String),

    #[error("connection failure: {0}")]
    Connect(String),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("too many redirects")]
    RedirectLoop,

    #[error("unexpected status code {status}")]
    Http { status: StatusCode },

    #[error("charset error ({status}): {reason}")]
    Charset { status: StatusCode, reason: String },

    #[error("io error: {0}")]
    Io(String),

    #[error("unknown: {0}")]
    Unknown(String),
}

/// Coarse classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not be built; nothing went over the wire.
    RequestConstruction,
    /// No response status was received.
    Transport,
    /// A response arrived with a status outside `200..300`.
    Status,
    /// A successful response whose body encoding could not be established.
    Decode,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl(_) | Self::InvalidHeader { .. } | Self::Request(_) => {
                ErrorKind::RequestConstruction
            }
            Self::Http { .. } => ErrorKind::Status,
            Self::Charset { .. } => ErrorKind::Decode,
            Self::Connect(_)
            | Self::ConnectTimeout
            | Self::RequestTimeout
            | Self::RedirectLoop
            | Self::Io(_)
            | Self::Unknown(_) => ErrorKind::Transport,
        }
    }

    /// Status code known at the time of failure, `0` when no response arrived.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Http { status } | Self::Charset { status, .. } => status.as_u16(),
            _ => 0,
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if err.is_redirect() {
            Self::RedirectLoop
        } else if err.is_builder() {
            Self::Request(err.to_string())
        } else if err.is_connect() || err.is_request() {
            // DNS, refused connections, TLS handshakes
            Self::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            Self::Io(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}
