use crate::input::{load_kind, load_output_path, load_text};
use crate::mcp::errors;
use crate::parser;
use crate::pipeline::Note;
use crate::render;
use crate::tools::{ReportExtras, error_result, report_result};
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tracing::info;

/// Parses a critique that was produced elsewhere and renders it. Never
/// touches the network.
pub fn call(args: &Value) -> Value {
    let kind = match load_kind(args) {
        Ok(kind) => kind,
        Err(err) => return error_result(err.kind, err.message, None),
    };
    let text = match load_text(args) {
        Ok(text) => text,
        Err(err) => return error_result(err.kind, err.message, None),
    };
    let output_path = match load_output_path(args) {
        Ok(path) => path,
        Err(err) => return error_result(err.kind, err.message, None),
    };

    let report = match parser::parse(kind, &text, kind.categories(None)) {
        Ok(report) => report,
        Err(err) => return error_result(errors::PARSE_FAILED, err.to_string(), None),
    };

    let rendered = match render::render(&report) {
        Ok(rendered) => rendered,
        Err(err) => {
            let notes = [Note {
                kind: errors::RENDER_FAILED,
                message: format!("Visual report unavailable: {err}"),
            }];
            return report_result(
                &report,
                None,
                ReportExtras {
                    notes: &notes,
                    ..ReportExtras::default()
                },
            );
        }
    };

    let mut result = report_result(&report, Some(&rendered), ReportExtras::default());
    if let Some(path) = output_path {
        if let Err(err) = fs::write(&path, &rendered.image_bytes) {
            let source = path.display().to_string();
            return error_result(
                errors::INTERNAL_ERROR,
                format!("failed to write output: {err}"),
                Some(source.as_str()),
            );
        }
        info!(path = %path.display(), "report written");
        attach_output(&mut result, &path);
    }
    result
}

fn attach_output(result: &mut Value, path: &Path) {
    let display = path.display().to_string();
    let name = path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("report.png");

    if let Some(content) = result.get_mut("content").and_then(Value::as_array_mut) {
        content.push(json!({
            "type": "resource_link",
            "uri": format!("file://{display}"),
            "name": name,
            "mimeType": "image/png"
        }));
    }
    if let Some(structured) = result
        .get_mut("structuredContent")
        .and_then(Value::as_object_mut)
    {
        structured.insert("report_path".to_string(), json!(display));
    }
}
