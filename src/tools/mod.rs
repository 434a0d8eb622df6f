use crate::pipeline::Note;
use crate::render::RenderedReport;
use crate::report::ScoreReport;
use serde_json::{Value, json};
use std::path::Path;

pub mod analyze;
pub mod convert_link;
pub mod render_report;

pub const FAILURE_PREFIX: &str = "❌";

pub fn error_result(
    kind: &'static str,
    message: impl Into<String>,
    source: Option<&str>,
) -> serde_json::Value {
    let message = message.into();
    let mut error = json!({
        "kind": kind,
        "message": message,
    });

    if let Some(source) = source
        && let Some(obj) = error.as_object_mut()
    {
        obj.insert("source".to_string(), json!(source));
    }

    json!({
        "content": [{"type": "text", "text": format!("{FAILURE_PREFIX} {message}")}],
        "structuredContent": {"error": error},
        "isError": true
    })
}

/// Optional artefacts attached to a successful report result.
#[derive(Default)]
pub struct ReportExtras<'a> {
    pub saved_path: Option<&'a Path>,
    pub published_url: Option<&'a str>,
    pub notes: &'a [Note],
    pub link: Option<Value>,
}

/// Text summary with the PNG inlined as a data URI, an image content block,
/// and the report itself as structured content.
pub fn report_result(
    report: &ScoreReport,
    rendered: Option<&RenderedReport>,
    extras: ReportExtras<'_>,
) -> Value {
    let mut text = report.summary();
    let mut content = Vec::new();

    if let Some(rendered) = rendered {
        text.push_str(&format!("\n\n![Score report]({})", rendered.data_uri()));
    }
    if let Some(url) = extras.published_url {
        text.push_str(&format!("\n\nShareable report: {url}"));
    }
    for note in extras.notes {
        text.push_str(&format!("\n\n{FAILURE_PREFIX} {}", note.message));
    }
    content.push(json!({"type": "text", "text": text}));

    let mut structured = json!({
        "report": report,
        "notes": extras.notes,
    });
    if let Some(obj) = structured.as_object_mut() {
        if let Some(rendered) = rendered {
            content.push(json!({
                "type": "image",
                "data": rendered.base64(),
                "mimeType": "image/png"
            }));
            obj.insert(
                "image".to_string(),
                json!({"width": rendered.width, "height": rendered.height, "bytes": rendered.image_bytes.len()}),
            );
        }
        if let Some(path) = extras.saved_path {
            obj.insert("report_path".to_string(), json!(path.display().to_string()));
        }
        if let Some(url) = extras.published_url {
            obj.insert("published_url".to_string(), json!(url));
        }
        if let Some(link) = extras.link {
            obj.insert("link".to_string(), link);
        }
    }

    json!({
        "content": content,
        "structuredContent": structured,
        "isError": false
    })
}
