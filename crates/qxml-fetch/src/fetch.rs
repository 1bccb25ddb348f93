//! Background retrieval of remote documents.
//!
//! A download runs a blocking GET on its own named thread and hands the
//! result back over a one-shot channel, so callers can block on it, poll it
//! from an event loop, or await it.

use std::io::Read;
use std::thread;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{FetchError, Result};

/// A download in progress.
///
/// Dropping the handle abandons the result; the worker still runs to
/// completion.
#[derive(Debug)]
pub struct FetchHandle {
    url: Url,
    rx: Option<oneshot::Receiver<Result<String>>>,
}

impl FetchHandle {
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Block until the download finishes.
    ///
    /// Must not be called from within an async runtime; use
    /// [`finished`](Self::finished) there.
    pub fn wait(self) -> Result<String> {
        let url = self.url;
        match self.rx {
            Some(rx) => rx
                .blocking_recv()
                .unwrap_or(Err(FetchError::WorkerLost { url })),
            None => Err(FetchError::WorkerLost { url }),
        }
    }

    /// Take the result if the download has finished.
    ///
    /// Returns `None` while the worker is still running, and after the
    /// result has been taken.
    pub fn try_take(&mut self) -> Option<Result<String>> {
        let result = match self.rx.as_mut()?.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err(FetchError::WorkerLost {
                url: self.url.clone(),
            }),
        };
        self.rx = None;
        Some(result)
    }

    /// Wait for the download without blocking the runtime.
    pub async fn finished(self) -> Result<String> {
        let url = self.url;
        match self.rx {
            Some(rx) => rx.await.unwrap_or(Err(FetchError::WorkerLost { url })),
            None => Err(FetchError::WorkerLost { url }),
        }
    }
}

/// Start downloading `url` on a worker thread.
///
/// # Errors
///
/// Fails only if the thread cannot be started; download failures are
/// reported through the handle.
pub fn spawn_fetch(url: Url) -> Result<FetchHandle> {
    let (tx, rx) = oneshot::channel();
    let worker_url = url.clone();
    thread::Builder::new()
        .name("qxml-fetch".to_string())
        .spawn(move || {
            let result = fetch_blocking(&worker_url);
            if let Err(err) = &result {
                warn!(url = %worker_url, error = %err, "download failed");
            }
            if tx.send(result).is_err() {
                debug!(url = %worker_url, "download handle dropped before completion");
            }
        })
        .map_err(FetchError::Spawn)?;
    Ok(FetchHandle { url, rx: Some(rx) })
}

/// Download `url` on the current thread.
pub fn fetch_blocking(url: &Url) -> Result<String> {
    match url.scheme() {
        "file" => {
            let path = url
                .to_file_path()
                .map_err(|()| FetchError::NotAFilePath { url: url.clone() })?;
            std::fs::read_to_string(&path).map_err(|source| FetchError::Read { path, source })
        }
        "http" | "https" => {
            info!(%url, "downloading document");
            let resp = ureq::get(url.as_str())
                .call()
                .map_err(|source| FetchError::Http {
                    url: url.clone(),
                    source: Box::new(source),
                })?;
            let mut reader = resp.into_body().into_reader();
            let mut buf = Vec::new();
            reader
                .read_to_end(&mut buf)
                .map_err(|source| FetchError::Body {
                    url: url.clone(),
                    source,
                })?;
            debug!(%url, bytes = buf.len(), "download complete");
            String::from_utf8(buf).map_err(|source| FetchError::Utf8 {
                url: url.clone(),
                source,
            })
        }
        other => Err(FetchError::UnsupportedScheme {
            scheme: other.to_string(),
            url: url.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn file_url(contents: &str) -> (tempfile::NamedTempFile, Url) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        let url = Url::from_file_path(file.path()).unwrap();
        (file, url)
    }

    #[test]
    fn test_wait_for_file_url() {
        let (_file, url) = file_url("<r/>");
        let handle = spawn_fetch(url.clone()).unwrap();
        assert_eq!(handle.url(), &url);
        assert_eq!(handle.wait().unwrap(), "<r/>");
    }

    #[test]
    fn test_poll_until_finished() {
        let (_file, url) = file_url("<polled/>");
        let mut handle = spawn_fetch(url).unwrap();
        let result = loop {
            if let Some(result) = handle.try_take() {
                break result;
            }
            thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(result.unwrap(), "<polled/>");
        assert!(handle.try_take().is_none());
        assert!(matches!(handle.wait(), Err(FetchError::WorkerLost { .. })));
    }

    #[test]
    fn test_failures_come_back_through_the_handle() {
        let url = Url::parse("ftp://example.com/doc.xml").unwrap();
        let err = spawn_fetch(url).unwrap().wait().unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedScheme { ref scheme, .. } if scheme == "ftp"));

        let dir = tempfile::tempdir().unwrap();
        let missing = Url::from_file_path(dir.path().join("missing.xml")).unwrap();
        let err = spawn_fetch(missing).unwrap().wait().unwrap_err();
        assert!(matches!(err, FetchError::Read { .. }));
    }

    #[tokio::test]
    async fn test_await_finished() {
        let (_file, url) = file_url("<async/>");
        let handle = spawn_fetch(url).unwrap();
        assert_eq!(handle.finished().await.unwrap(), "<async/>");
    }
}
