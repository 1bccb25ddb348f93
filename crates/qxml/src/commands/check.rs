//! `qxml check`: report diagnostics.

use std::process::ExitCode;

use anyhow::Result;
use tracing::info;

use super::{open, print_json};
use crate::GlobalOptions;
use crate::report::render;

pub fn execute(input: &str, options: &GlobalOptions) -> Result<ExitCode> {
    let opened = open(input, options)?;
    let editor = &opened.editor;
    let diagnostics = editor.diagnostics();

    if options.json {
        print_json(&diagnostics)?;
    } else {
        for diagnostic in diagnostics {
            eprintln!("{}", render(&opened.name, editor.text(), diagnostic));
        }
    }

    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    info!(
        name = %opened.name,
        errors,
        warnings = diagnostics.len() - errors,
        "checked document"
    );
    Ok(if errors == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
