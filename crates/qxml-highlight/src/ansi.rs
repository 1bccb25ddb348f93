//! Terminal rendering of highlighted text.

use owo_colors::{OwoColorize, Style};

use crate::category::Category;
use crate::color::ColorPair;
use crate::highlighter::StyledSpan;
use crate::scheme::ColorScheme;

/// The terminal style for a color pair.
pub fn style_for(pair: ColorPair) -> Style {
    let fg = pair.foreground;
    let style = Style::new().truecolor(fg.r, fg.g, fg.b);
    match pair.background {
        Some(bg) => style.on_truecolor(bg.r, bg.g, bg.b),
        None => style,
    }
}

/// Render `text` with ANSI colors.
///
/// `spans` are relative to the start of `text`, as returned by
/// [`highlight_range`](crate::highlight_range) for the range `text` was cut
/// from. Bytes outside every span are written unstyled.
pub fn render_ansi(text: &str, spans: &[StyledSpan], scheme: &ColorScheme) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut pos = 0;
    for span in spans {
        let (Some(gap), Some(piece)) = (text.get(pos..span.range.start), text.get(span.range.clone()))
        else {
            continue;
        };
        out.push_str(gap);
        push_styled(&mut out, piece, span.category, scheme);
        pos = span.range.end;
    }
    if let Some(rest) = text.get(pos..) {
        out.push_str(rest);
    }
    out
}

fn push_styled(out: &mut String, piece: &str, category: Category, scheme: &ColorScheme) {
    let style = style_for(scheme.get(category));
    // Style each line separately so backgrounds do not bleed past a newline.
    for (i, line) in piece.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if !line.is_empty() {
            out.push_str(&line.style(style).to_string());
        }
    }
}
