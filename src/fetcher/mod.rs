pub mod client;
pub mod errors;
pub mod headers;
pub mod pipeline;
pub mod stream;
pub mod types;

pub use client::fetch;
pub use errors::{ErrorKind, FetchError};
pub use stream::TextStream;
pub use types::FetchOptions;
