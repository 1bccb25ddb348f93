use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Errors loading a document. These are distinct from parse errors: a
/// document that fails to load is never parsed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {input:?}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported URL scheme {scheme:?} in {url}")]
    UnsupportedScheme { scheme: String, url: Url },

    #[error("{url} does not name a local file")]
    NotAFilePath { url: Url },

    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read standard input")]
    Stdin(#[source] std::io::Error),

    #[error("GET {url} failed")]
    Http {
        url: Url,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("failed to read the response body from {url}")]
    Body {
        url: Url,
        #[source]
        source: std::io::Error,
    },

    #[error("the response from {url} is not valid UTF-8")]
    Utf8 {
        url: Url,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("failed to start the download worker")]
    Spawn(#[source] std::io::Error),

    #[error("the download worker for {url} stopped without a result")]
    WorkerLost { url: Url },
}

pub type Result<T> = std::result::Result<T, FetchError>;
