use crate::input::load_url;
use crate::locator::{self, LinkKind};
use crate::mcp::errors;
use crate::tools::error_result;
use serde_json::{Value, json};

const UNRECOGNIZED: &str = "URL format not recognized as a Google file sharing link";

pub fn call(args: &Value) -> Value {
    let url = match load_url(args, "url") {
        Ok(url) => url,
        Err(err) => return error_result(err.kind, err.message, None),
    };

    let link = locator::resolve(&url);
    if !link.kind.is_google() {
        let message = match (&link.kind, &link.note) {
            (LinkKind::Unknown, Some(note)) if note.starts_with(UNRECOGNIZED) => note.clone(),
            _ => UNRECOGNIZED.to_string(),
        };
        return error_result(errors::RESOLUTION_FAILED, message, Some(url.as_str()));
    }

    let mut text = format!(
        "🔗 **{}** (file id `{}`)\n",
        link.kind.as_str(),
        link.file_id.as_deref().unwrap_or_default()
    );
    for candidate in &link.candidates {
        text.push_str(&format!(
            "\n- **{}**: {}\n  {}",
            candidate.format, candidate.description, candidate.url
        ));
    }

    json!({
        "content": [{"type": "text", "text": text}],
        "structuredContent": link,
        "isError": false
    })
}
