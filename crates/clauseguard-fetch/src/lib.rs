//! Text acquisition: fetch a plain-text rendition of a terms page through a
//! read-only page-to-text proxy, then clean and bound it.

pub mod clean;
pub mod http;

pub use clean::{MAX_TEXT_CHARS, MIN_TEXT_CHARS, clean_text};
pub use http::{DEFAULT_PROXY_BASE, FetchError, PageFetcher, normalize_url};
