//! `qxml nodes`: every node in document order.

use std::process::ExitCode;

use anyhow::Result;
use qxml_syntax::{NodeErrors, XmlDocument};

use super::{open, print_json};
use crate::GlobalOptions;

pub fn execute(input: &str, options: &GlobalOptions) -> Result<ExitCode> {
    let opened = open(input, options)?;
    let doc = opened.editor.document();
    if options.json {
        print_json(&doc.summaries())?;
    } else {
        for line in node_lines(doc) {
            println!("{line}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn node_lines(doc: &XmlDocument) -> Vec<String> {
    doc.iter()
        .map(|(id, node)| {
            let mut line = format!(
                "{:>4}  {:<11} {:>5}..{:<5} {}",
                id.0,
                format!("{:?}", node.node_type()),
                node.span.start,
                node.span.end,
                node.name().unwrap_or("-"),
            );
            if node.errors.contains(NodeErrors::MISMATCHED_NODES) {
                line.push_str("  mismatched");
            }
            if node.errors.contains(NodeErrors::OFFSET_ANOMALY) {
                line.push_str("  unpositioned");
            }
            line.trim_end().to_string()
        })
        .collect()
}
