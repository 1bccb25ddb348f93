//! The editor session.

use std::cell::RefCell;
use std::error::Error as _;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use qxml_fetch::{DocumentSource, Url, spawn_fetch};
use qxml_highlight::{ColorScheme, StyledSpan, highlight_lines, highlight_range, render_ansi};
use qxml_syntax::{
    CursorContext, DiagnosticListener, DiagnosticMessage, LineIndex, Location, Node, NodeId,
    XmlDocument, XmlEventParser,
};
use tracing::{debug, info, warn};

use crate::error::{EditError, Result};

/// Code of the diagnostic sent when a remote document cannot be downloaded.
pub const DOWNLOAD_FAILED: &str = "X-2-1";

type SharedListener = Rc<RefCell<DiagnosticListener>>;

/// An XML text together with its parse tree and highlighting.
///
/// Every change to the text re-parses the whole document and recomputes the
/// per-line highlighting, so the tree, the line index and the highlight
/// cache always describe the current text.
pub struct XmlEditor {
    text: String,
    parser: XmlEventParser,
    scheme: ColorScheme,
    lines: LineIndex,
    highlights: Vec<Vec<StyledSpan>>,
    filename: Option<String>,
    modified: bool,
    listener: Option<SharedListener>,
}

impl Default for XmlEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for XmlEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlEditor")
            .field("filename", &self.filename)
            .field("bytes", &self.text.len())
            .field("modified", &self.modified)
            .field("parser", &self.parser)
            .finish()
    }
}

impl XmlEditor {
    pub fn new() -> Self {
        Self::with_scheme(ColorScheme::default())
    }

    pub fn with_scheme(scheme: ColorScheme) -> Self {
        let mut editor = Self {
            text: String::new(),
            parser: XmlEventParser::new(),
            scheme,
            lines: LineIndex::default(),
            highlights: Vec::new(),
            filename: None,
            modified: false,
            listener: None,
        };
        editor.refresh();
        editor
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the whole text.
    ///
    /// Returns `true` if the new text parsed without errors. The editor is
    /// unmodified afterwards.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        self.text = text.into();
        self.modified = false;
        self.refresh()
    }

    /// Apply a change to the text: `removed` bytes at `position` are
    /// replaced by `inserted`.
    ///
    /// # Errors
    ///
    /// Fails without touching the text if the removed range is outside the
    /// text or does not fall on character boundaries.
    pub fn apply_edit(&mut self, position: usize, removed: usize, inserted: &str) -> Result<bool> {
        let len = self.text.len();
        let end = position
            .checked_add(removed)
            .filter(|&end| end <= len)
            .ok_or(EditError::OutOfRange {
                position,
                removed,
                len,
            })?;
        for offset in [position, end] {
            if !self.text.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary { position: offset });
            }
        }
        debug!(position, removed, inserted = inserted.len(), "applying edit");
        self.text.replace_range(position..end, inserted);
        self.modified = true;
        Ok(self.refresh())
    }

    /// Re-parse the text and recompute the highlighting.
    fn refresh(&mut self) -> bool {
        let ok = self.parser.parse(&self.text);
        self.lines = LineIndex::new(&self.text);
        self.highlights = highlight_lines(self.parser.document(), &self.lines);
        debug!(
            lines = self.lines.line_count(),
            nodes = self.parser.document().len(),
            ok,
            "refreshed editor"
        );
        ok
    }

    /// Load a file, replacing the text.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        let text = DocumentSource::File(path.to_path_buf()).load()?;
        info!(path = %path.display(), "loaded file");
        self.filename = Some(path.display().to_string());
        Ok(self.set_text(text))
    }

    /// Download a document, replacing the text.
    ///
    /// A failed download leaves the current text alone and is reported to
    /// the listener as a [`DOWNLOAD_FAILED`] error as well as returned.
    pub fn load_url(&mut self, url: Url) -> Result<bool> {
        let result = spawn_fetch(url.clone()).and_then(|handle| handle.wait());
        match result {
            Ok(text) => {
                self.filename = Some(url.to_string());
                Ok(self.set_text(text))
            }
            Err(err) => {
                warn!(%url, error = %err, "download failed");
                self.notify(&download_diagnostic(&url, &err));
                Err(err.into())
            }
        }
    }

    /// Load from any document source.
    pub fn load(&mut self, source: &DocumentSource) -> Result<bool> {
        match source {
            DocumentSource::File(path) => self.load_file(path),
            DocumentSource::Url(url) => self.load_url(url.clone()),
            DocumentSource::Stdin | DocumentSource::Text(_) => {
                let text = source.load()?;
                self.filename = None;
                Ok(self.set_text(text))
            }
        }
    }

    /// Write the text to `path`, which becomes the editor's file name.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.text).map_err(|source| EditError::Save {
            path: PathBuf::from(path),
            source,
        })?;
        self.filename = Some(path.display().to_string());
        self.modified = false;
        Ok(())
    }

    /// The file or URL the text was loaded from or saved to.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Receive parse errors and warnings, and download failures.
    pub fn set_listener(&mut self, listener: Option<DiagnosticListener>) {
        self.listener = listener.map(|l| Rc::new(RefCell::new(l)));
        let forward: Option<DiagnosticListener> = self.listener.clone().map(|shared| {
            Box::new(move |d: &DiagnosticMessage| (&mut *shared.borrow_mut())(d)) as DiagnosticListener
        });
        self.parser.set_listener(forward);
    }

    fn notify(&self, diagnostic: &DiagnosticMessage) {
        if let Some(listener) = &self.listener {
            (&mut *listener.borrow_mut())(diagnostic);
        }
    }

    pub fn set_halt_on_error(&mut self, halt_on_error: bool) {
        self.parser.set_halt_on_error(halt_on_error);
        self.refresh();
    }

    pub fn scheme(&self) -> &ColorScheme {
        &self.scheme
    }

    pub fn set_scheme(&mut self, scheme: ColorScheme) {
        self.scheme = scheme;
    }

    /// Load a color scheme file and switch to it.
    pub fn load_scheme(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.scheme = ColorScheme::load(path)?;
        Ok(())
    }

    pub fn parser(&self) -> &XmlEventParser {
        &self.parser
    }

    pub fn document(&self) -> &XmlDocument {
        self.parser.document()
    }

    pub fn diagnostics(&self) -> &[DiagnosticMessage] {
        self.parser.diagnostics()
    }

    pub fn node_id_at_position(&self, position: usize) -> Option<NodeId> {
        self.parser.node_for_offset(position)
    }

    pub fn node_at_position(&self, position: usize) -> Option<&Node> {
        self.node_id_at_position(position)
            .map(|id| self.document().node(id))
    }

    pub fn context_at_position(&self, position: usize) -> Option<CursorContext> {
        self.document().context_at(position)
    }

    /// The node under a (row, column) position, as an editor view reports it.
    pub fn node_at_location(&self, row: usize, column: usize) -> Option<&Node> {
        self.node_at_position(self.offset_at(row, column)?)
    }

    /// Byte offset of a zero-based (row, column) position.
    pub fn offset_at(&self, row: usize, column: usize) -> Option<usize> {
        self.lines.offset(row, column)
    }

    pub fn location(&self, position: usize) -> Option<Location> {
        self.lines.location(position)
    }

    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    /// Highlighting of one line, relative to the line start.
    pub fn line_highlights(&self, line: usize) -> &[StyledSpan] {
        self.highlights
            .get(line)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The whole text with ANSI colors.
    pub fn render_ansi(&self) -> String {
        let spans = highlight_range(self.document(), 0..self.text.len());
        render_ansi(&self.text, &spans, &self.scheme)
    }
}

fn download_diagnostic(url: &Url, err: &qxml_fetch::FetchError) -> DiagnosticMessage {
    let mut diagnostic = DiagnosticMessage::error("Download Failed")
        .with_code(DOWNLOAD_FAILED)
        .problem(format!("Could not download {url}"))
        .add_detail(err.to_string());
    let mut source = err.source();
    while let Some(cause) = source {
        diagnostic = diagnostic.add_detail(cause.to_string());
        source = cause.source();
    }
    diagnostic.add_hint("Check the address and your network connection?")
}
