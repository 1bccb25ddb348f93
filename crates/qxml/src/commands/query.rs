//! `qxml query`: what is at a position.

use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use qxml_edit::XmlEditor;
use qxml_syntax::IsIn;
use serde::Serialize;

use super::{open, print_json};
use crate::GlobalOptions;

/// A position given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Offset(usize),
    /// One-based line and column.
    LineColumn(usize, usize),
}

fn parse_position(s: &str) -> Result<Position> {
    match s.split_once(':') {
        Some((line, column)) => {
            let line: usize = line.trim().parse().context("invalid line number")?;
            let column: usize = column.trim().parse().context("invalid column number")?;
            if line == 0 || column == 0 {
                bail!("line and column numbers start at 1");
            }
            Ok(Position::LineColumn(line, column))
        }
        None => Ok(Position::Offset(
            s.trim().parse().context("invalid byte offset")?,
        )),
    }
}

fn resolve(editor: &XmlEditor, position: Position) -> Result<usize> {
    let offset = match position {
        Position::Offset(offset) => Some(offset),
        Position::LineColumn(line, column) => editor.offset_at(line - 1, column - 1),
    };
    match offset {
        Some(offset) if offset <= editor.text().len() => Ok(offset),
        _ => bail!("position is outside the document"),
    }
}

#[derive(Debug, Serialize)]
struct QueryResult {
    offset: usize,
    line: usize,
    column: usize,
    #[serde(flatten)]
    context: Option<qxml_syntax::CursorContext>,
}

fn describe(is_in: IsIn, attribute: Option<&str>) -> String {
    match (is_in, attribute) {
        (IsIn::IsInAttributeName(_), Some(name)) => format!("attribute name `{name}`"),
        (IsIn::IsInAttributeValue(_), Some(name)) => format!("value of attribute `{name}`"),
        (IsIn::IsInName, _) => "tag name".to_string(),
        (IsIn::IsInText, _) => "text".to_string(),
        (IsIn::IsInComment, _) => "comment".to_string(),
        (IsIn::IsInCData, _) => "CDATA section".to_string(),
        (IsIn::IsInPITarget, _) => "processing instruction target".to_string(),
        (IsIn::IsInPIData, _) => "processing instruction data".to_string(),
        (IsIn::NotInNode, _) => "nothing".to_string(),
        _ => "markup".to_string(),
    }
}

pub fn execute(input: &str, position: &str, options: &GlobalOptions) -> Result<ExitCode> {
    let position = parse_position(position)?;
    let opened = open(input, options)?;
    let editor = &opened.editor;

    let offset = resolve(editor, position)?;
    let location = editor
        .location(offset)
        .context("position is outside the document")?;
    let context = editor.context_at_position(offset);

    if options.json {
        print_json(&QueryResult {
            offset,
            line: location.row + 1,
            column: location.column + 1,
            context,
        })?;
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{}:{}:{} (byte {offset})",
        opened.name,
        location.row + 1,
        location.column + 1
    );
    match context {
        Some(ctx) => {
            println!("node: {:?} #{}", ctx.node_type, ctx.node.0);
            println!("in:   {}", describe(ctx.is_in, ctx.attribute.as_deref()));
            if !ctx.path.is_empty() {
                println!("path: /{}", ctx.path.join("/"));
            }
        }
        None => println!("in:   nothing"),
    }
    Ok(ExitCode::SUCCESS)
}
