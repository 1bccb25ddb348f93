use std::path::PathBuf;

use thiserror::Error;

/// Errors reading, writing or interpreting a color scheme.
#[derive(Debug, Error)]
pub enum SchemeError {
    #[error("invalid color {value:?}: expected #rrggbb or a color name")]
    InvalidColor { value: String },

    #[error("failed to read color scheme {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write color scheme {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid color scheme: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, SchemeError>;
