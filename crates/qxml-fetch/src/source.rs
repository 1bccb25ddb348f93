//! Where a document comes from.

use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::debug;
use url::Url;

use crate::error::{FetchError, Result};
use crate::fetch::spawn_fetch;

/// A document location given on the command line, or text already in hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    File(PathBuf),
    Url(Url),
    Stdin,
    Text(String),
}

impl DocumentSource {
    /// Interpret a command-line argument.
    ///
    /// `-` is standard input, anything with a `scheme://` prefix is a URL
    /// (`file://` URLs become plain paths), and everything else is a path.
    pub fn from_arg(arg: &str) -> Result<Self> {
        if arg == "-" {
            return Ok(DocumentSource::Stdin);
        }
        if !arg.contains("://") {
            return Ok(DocumentSource::File(PathBuf::from(arg)));
        }
        let url = Url::parse(arg).map_err(|source| FetchError::InvalidUrl {
            input: arg.to_string(),
            source,
        })?;
        match url.scheme() {
            "file" => url
                .to_file_path()
                .map(DocumentSource::File)
                .map_err(|()| FetchError::NotAFilePath { url }),
            "http" | "https" => Ok(DocumentSource::Url(url)),
            other => Err(FetchError::UnsupportedScheme {
                scheme: other.to_string(),
                url,
            }),
        }
    }

    /// Read the whole document, blocking until it is available.
    pub fn load(&self) -> Result<String> {
        debug!(source = %self.display_name(), "loading document");
        match self {
            DocumentSource::File(path) => {
                std::fs::read_to_string(path).map_err(|source| FetchError::Read {
                    path: path.clone(),
                    source,
                })
            }
            DocumentSource::Url(url) => spawn_fetch(url.clone())?.wait(),
            DocumentSource::Stdin => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .map_err(FetchError::Stdin)?;
                Ok(text)
            }
            DocumentSource::Text(text) => Ok(text.clone()),
        }
    }

    /// A short name for messages and diagnostics.
    pub fn display_name(&self) -> String {
        match self {
            DocumentSource::File(path) => path.display().to_string(),
            DocumentSource::Url(url) => url.to_string(),
            DocumentSource::Stdin => "<stdin>".to_string(),
            DocumentSource::Text(_) => "<text>".to_string(),
        }
    }
}

impl FromStr for DocumentSource {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_arg(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_arg() {
        assert_eq!(DocumentSource::from_arg("-").unwrap(), DocumentSource::Stdin);
        assert_eq!(
            DocumentSource::from_arg("docs/a.xml").unwrap(),
            DocumentSource::File(PathBuf::from("docs/a.xml"))
        );
        assert!(matches!(
            DocumentSource::from_arg("https://example.com/a.xml").unwrap(),
            DocumentSource::Url(url) if url.host_str() == Some("example.com")
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_url_is_a_path() {
        assert_eq!(
            DocumentSource::from_arg("file:///tmp/a.xml").unwrap(),
            DocumentSource::File(PathBuf::from("/tmp/a.xml"))
        );
    }

    #[test]
    fn test_bad_urls() {
        assert!(matches!(
            DocumentSource::from_arg("gopher://example.com/"),
            Err(FetchError::UnsupportedScheme { .. })
        ));
        assert!(matches!(
            DocumentSource::from_arg("http://[bad"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_load_file_and_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.xml");
        std::fs::write(&path, "<doc/>").unwrap();

        assert_eq!(DocumentSource::File(path.clone()).load().unwrap(), "<doc/>");
        assert_eq!(
            DocumentSource::Text("<t/>".to_string()).load().unwrap(),
            "<t/>"
        );
        assert!(matches!(
            DocumentSource::File(dir.path().join("nope.xml")).load(),
            Err(FetchError::Read { .. })
        ));
        assert_eq!(
            DocumentSource::File(path).display_name(),
            dir.path().join("doc.xml").display().to_string()
        );
    }
}
