use std::collections::HashSet;
use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

#[test]
fn tools_list_includes_expected_tools() -> Result<(), Box<dyn std::error::Error>> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_mcp-design-review"))
        .args(["serve", "--stdio", "--no-save"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    let mut stdin = child.stdin.take().expect("stdin available");
    let mut stdout = BufReader::new(child.stdout.take().expect("stdout available"));

    let request = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "tools/list",
        "params": {}
    });
    let serialized = serde_json::to_string(&request)?;
    writeln!(stdin, "{serialized}")?;
    stdin.flush()?;

    let mut line = String::new();
    stdout.read_line(&mut line)?;

    let response: serde_json::Value = serde_json::from_str(line.trim())?;
    let tools = response
        .get("result")
        .and_then(|value| value.get("tools"))
        .and_then(|value| value.as_array())
        .expect("tools array present");

    let names: HashSet<&str> = tools
        .iter()
        .filter_map(|tool| tool.get("name").and_then(|value| value.as_str()))
        .collect();

    let expected: HashSet<&str> = [
        "critique.design",
        "critique.copywriting",
        "critique.website",
        "critique.layout",
        "critique.pdf_presentation",
        "critique.architecture",
        "critique.google_file",
        "critique.brand_consistency",
        "critique.convert_link",
        "critique.render_report",
    ]
    .into_iter()
    .collect();

    assert_eq!(names, expected);
    for tool in tools {
        assert_eq!(
            tool.get("inputSchema")
                .and_then(|schema| schema.get("type"))
                .and_then(|value| value.as_str()),
            Some("object")
        );
    }

    let _ = child.kill();
    Ok(())
}
