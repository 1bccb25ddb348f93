use std::path::PathBuf;

use qxml_fetch::FetchError;
use qxml_highlight::SchemeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Load(#[from] FetchError),

    #[error(transparent)]
    Scheme(#[from] SchemeError),

    #[error("edit at {position} removing {removed} bytes is outside the {len} byte text")]
    OutOfRange {
        position: usize,
        removed: usize,
        len: usize,
    },

    #[error("offset {position} is not on a character boundary")]
    NotCharBoundary { position: usize },

    #[error("failed to save {}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EditError>;
