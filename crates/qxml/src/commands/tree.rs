//! `qxml tree`: the document outline.

use std::process::ExitCode;

use anyhow::Result;

use super::{open, print_json};
use crate::GlobalOptions;

pub fn execute(input: &str, options: &GlobalOptions) -> Result<ExitCode> {
    let opened = open(input, options)?;
    let doc = opened.editor.document();
    if options.json {
        print_json(&doc.summaries())?;
    } else {
        print!("{}", doc.dump_tree());
    }
    Ok(ExitCode::SUCCESS)
}
