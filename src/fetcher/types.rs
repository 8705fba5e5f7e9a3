use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_BYTES: usize = 300 * 1024; // 300KB

/// Per-call fetch parameters. Zero values select the defaults.
///
/// Header names are stored lowercased, so a later `with_header` for the
/// same name replaces the earlier value whatever its casing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub timeout_secs: u64,
    pub headers: HashMap<String, String>,
    pub max_bytes: usize,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into().trim().to_ascii_lowercase();
        self.headers.insert(name, value.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    pub fn byte_limit(&self) -> usize {
        match self.max_bytes {
            0 => DEFAULT_MAX_BYTES,
            n => n,
        }
    }
}
