//! Syntax highlighting for XML documents parsed by `qxml-syntax`.
//!
//! Highlighting works from the parsed tree rather than from patterns: every
//! node already knows where its name, attributes and body are, so a range of
//! text is colored by painting the parts of the nodes that overlap it.
//!
//! ```rust
//! use qxml_highlight::{highlight_range, Category};
//! use qxml_syntax::XmlEventParser;
//!
//! let text = "<a>hi</a>";
//! let mut parser = XmlEventParser::new();
//! parser.parse(text);
//!
//! let spans = highlight_range(parser.document(), 0..text.len());
//! assert_eq!(spans[1].category, Category::TagName);
//! assert_eq!(spans[3].range, 3..5);
//! ```

pub mod ansi;
pub mod category;
pub mod color;
pub mod error;
pub mod highlighter;
pub mod scheme;

pub use ansi::{render_ansi, style_for};
pub use category::Category;
pub use color::{Color, ColorPair, NAMED_COLORS};
pub use error::{Result, SchemeError};
pub use highlighter::{highlight_line, highlight_lines, highlight_range, StyledSpan};
pub use scheme::{ColorScheme, SCHEME_KEY};
