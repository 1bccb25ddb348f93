//! `qxml highlight`: the text in color.

use std::process::ExitCode;

use anyhow::Result;
use qxml_highlight::highlight_lines;

use super::{open, print_json};
use crate::GlobalOptions;

pub fn execute(input: &str, options: &GlobalOptions) -> Result<ExitCode> {
    let opened = open(input, options)?;
    let editor = &opened.editor;
    if options.json {
        let lines = qxml_syntax::LineIndex::new(editor.text());
        print_json(&highlight_lines(editor.document(), &lines))?;
    } else {
        let rendered = editor.render_ansi();
        if rendered.ends_with('\n') {
            print!("{rendered}");
        } else {
            println!("{rendered}");
        }
    }
    Ok(ExitCode::SUCCESS)
}
