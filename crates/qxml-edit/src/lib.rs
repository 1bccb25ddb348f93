//! An editor session for XML documents.
//!
//! [`XmlEditor`] keeps a text, its parse tree and its highlighting in step:
//! every change re-parses the document, so queries such as "which node is
//! under the cursor" always see the current text.
//!
//! ```rust
//! use qxml_edit::XmlEditor;
//!
//! let mut editor = XmlEditor::new();
//! assert!(editor.set_text("<greeting>hello</greeting>"));
//! assert_eq!(editor.node_at_position(12).unwrap().as_text().unwrap().text, "hello");
//!
//! editor.apply_edit(10, 5, "bye").unwrap();
//! assert!(editor.is_modified());
//! assert_eq!(editor.text(), "<greeting>bye</greeting>");
//! ```

pub mod editor;
pub mod error;

pub use editor::{DOWNLOAD_FAILED, XmlEditor};
pub use error::{EditError, Result};
