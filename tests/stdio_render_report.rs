use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};
use tempfile::tempdir;

const CRITIQUE: &str = "Here is my review.\n\n\
    1. **Clarity**: 9/10 - strong contrast\n\
    2. **Creativity**: 6/10 - familiar layout\n\
    The rest could not be judged from a static image.";

fn send_request(
    stdin: &mut std::process::ChildStdin,
    stdout: &mut BufReader<std::process::ChildStdout>,
    request: serde_json::Value,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let serialized = serde_json::to_string(&request)?;
    writeln!(stdin, "{serialized}")?;
    stdin.flush()?;

    let mut line = String::new();
    stdout.read_line(&mut line)?;
    let response: serde_json::Value = serde_json::from_str(line.trim())?;
    Ok(response)
}

#[test]
fn render_report_inline_and_to_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output_path = dir.path().join("report.png");

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
        "id": 20,
        "method": "tools/call",
        "params": {
            "name": "critique.render_report",
            "arguments": { "kind": "design", "text": CRITIQUE }
        }
    });
    let response = send_request(&mut stdin, &mut stdout, request)?;
    let result = response.get("result").expect("result present");
    assert_eq!(result.get("isError").and_then(|v| v.as_bool()), Some(false));

    let report = result
        .get("structuredContent")
        .and_then(|v| v.get("report"))
        .expect("report present");
    assert_eq!(report.get("overall_score").and_then(|v| v.as_f64()), Some(3.0));
    assert_eq!(report.get("verdict").and_then(|v| v.as_str()), Some("Poor"));
    let categories = report
        .get("categories")
        .and_then(|v| v.as_array())
        .expect("categories");
    assert_eq!(categories.len(), 5);

    let image = result
        .get("content")
        .and_then(|v| v.as_array())
        .and_then(|content| {
            content
                .iter()
                .find(|block| block.get("type").and_then(|v| v.as_str()) == Some("image"))
        })
        .expect("image block");
    let data = image.get("data").and_then(|v| v.as_str()).expect("data");
    let decoded = image::load_from_memory(&STANDARD.decode(data)?)?;
    assert_eq!((decoded.width(), decoded.height()), (1200, 1600));

    let request = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 21,
        "method": "tools/call",
        "params": {
            "name": "critique.render_report",
            "arguments": {
                "kind": "design",
                "text": CRITIQUE,
                "output_path": output_path.to_string_lossy()
            }
        }
    });
    let response = send_request(&mut stdin, &mut stdout, request)?;
    let result = response.get("result").expect("result present");
    assert_eq!(result.get("isError").and_then(|v| v.as_bool()), Some(false));
    let written = std::fs::read(&output_path)?;
    assert_eq!(STANDARD.encode(&written), data);

    let _ = child.kill();
    Ok(())
}
