//! Sub-command implementations.

pub mod check;
pub mod highlight;
pub mod nodes;
pub mod query;
pub mod tree;

use anyhow::{Context, Result};
use qxml_edit::XmlEditor;
use qxml_fetch::DocumentSource;
use qxml_highlight::ColorScheme;
use tracing::debug;

use crate::GlobalOptions;

/// A loaded document and the name to show for it.
pub struct Opened {
    pub name: String,
    pub editor: XmlEditor,
}

/// Load and parse `input` with the global options applied.
pub fn open(input: &str, options: &GlobalOptions) -> Result<Opened> {
    let scheme = match &options.scheme {
        Some(path) => ColorScheme::load(path)
            .with_context(|| format!("loading color scheme {}", path.display()))?,
        None => ColorScheme::default(),
    };

    let source = DocumentSource::from_arg(input)?;
    let name = source.display_name();
    let mut editor = XmlEditor::with_scheme(scheme);
    editor.set_halt_on_error(!options.no_halt);
    let ok = editor
        .load(&source)
        .with_context(|| format!("loading {name}"))?;
    debug!(%name, ok, "opened document");

    Ok(Opened { name, editor })
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
