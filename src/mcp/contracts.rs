use serde_json::json;

pub const TOOL_DESIGN: &str = "critique.design";
pub const TOOL_COPYWRITING: &str = "critique.copywriting";
pub const TOOL_WEBSITE: &str = "critique.website";
pub const TOOL_LAYOUT: &str = "critique.layout";
pub const TOOL_PDF_PRESENTATION: &str = "critique.pdf_presentation";
pub const TOOL_ARCHITECTURE: &str = "critique.architecture";
pub const TOOL_GOOGLE_FILE: &str = "critique.google_file";
pub const TOOL_BRAND_CONSISTENCY: &str = "critique.brand_consistency";
pub const TOOL_CONVERT_LINK: &str = "critique.convert_link";
pub const TOOL_RENDER_REPORT: &str = "critique.render_report";

pub const MAX_URL_CHARS: usize = 2048;
pub const MAX_TEXT_BYTES: u64 = 64 * 1024;

pub const ANALYSIS_TYPES: &[&str] = &["design", "presentation", "copywriting", "layout"];

const KINDS: &[&str] = &[
    "design",
    "copywriting",
    "website",
    "layout",
    "pdf-presentation",
    "architectural",
    "google-file",
];

fn url_property() -> serde_json::Value {
    json!({ "type": "string", "maxLength": MAX_URL_CHARS })
}

pub fn url_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "url": url_property()
        },
        "required": ["url"],
        "additionalProperties": false
    })
}

pub fn copywriting_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "url": url_property(),
            "content_type": { "type": "string" },
            "language": { "type": "string" }
        },
        "required": ["url"],
        "additionalProperties": false
    })
}

pub fn google_file_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "url": url_property(),
            "analysis_type": { "type": "string", "enum": ANALYSIS_TYPES }
        },
        "required": ["url"],
        "additionalProperties": false
    })
}

pub fn brand_consistency_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "url": url_property(),
            "website_url": url_property()
        },
        "required": ["url", "website_url"],
        "additionalProperties": false
    })
}

pub fn render_report_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "kind": { "type": "string", "enum": KINDS },
            "text": { "type": "string", "maxLength": MAX_TEXT_BYTES },
            "output_path": { "type": "string" }
        },
        "required": ["kind", "text"],
        "additionalProperties": false
    })
}
