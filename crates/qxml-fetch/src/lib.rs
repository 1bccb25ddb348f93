//! Loading XML documents from local files, URLs and standard input.
//!
//! Remote documents are downloaded on a worker thread; see [`spawn_fetch`].

pub mod error;
pub mod fetch;
pub mod source;

pub use error::{FetchError, Result};
pub use fetch::{FetchHandle, fetch_blocking, spawn_fetch};
pub use source::DocumentSource;
pub use url::Url;
