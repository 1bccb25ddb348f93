//! Runs the built binary against small documents.

use std::path::Path;
use std::process::{Command, Output};

fn qxml(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qxml"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run qxml")
}

fn write(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path.display().to_string()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn tree_prints_outline() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write(dir.path(), "a.xml", "<a x=\"1\">hi<b/></a>");
    let output = qxml(&["tree", &doc]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "Start <a x=\"1\"> 0..9\n  Text \"hi\" 9..11\n  Start <b/> 11..15\n  End </b> 15..15\nEnd </a> 15..19\n"
    );
}

#[test]
fn nodes_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write(dir.path(), "a.xml", "<r><!--c--></r>");
    let output = qxml(&["nodes", "--json", &doc]);
    assert!(output.status.success());
    let nodes: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let types: Vec<&str> = nodes
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["node_type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["Start", "Comment", "End"]);
}

#[test]
fn query_reports_attribute() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write(dir.path(), "a.xml", "<r>\n  <item id=\"7\"/>\n</r>");

    let output = qxml(&["query", &doc, "2:12"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("value of attribute `id`"), "{text}");
    assert!(text.contains("path: /r/item"), "{text}");

    let output = qxml(&["query", "--json", &doc, "2:5"]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["offset"], 8);
    assert_eq!(json["is_in"], "IsInName");
}

#[test]
fn check_fails_on_errors() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(dir.path(), "good.xml", "<a/>");
    let bad = write(dir.path(), "bad.xml", "<a>\n</b>");

    assert!(qxml(&["check", &good]).status.success());

    let output = qxml(&["check", &bad]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("X-1-3"));

    let output = qxml(&["check", "--no-halt", "--json", &bad]);
    let diagnostics: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(diagnostics[0]["code"], "X-1-3");
}

#[test]
fn highlight_uses_scheme() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write(dir.path(), "a.xml", "<a>t</a>");
    let scheme = write(
        dir.path(),
        "colors.yaml",
        "xml_highlighter_colors:\n  text:\n    foreground: \"#0a0b0c\"\n",
    );
    let output = qxml(&["highlight", "--scheme", &scheme, &doc]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("\x1b[38;2;10;11;12m"));
}

#[test]
fn missing_input_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.xml");
    let output = qxml(&["tree", &missing.display().to_string()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.xml"));
}
