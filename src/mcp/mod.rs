use serde_json::json;

pub mod contracts;
pub mod errors;

pub fn tool_definitions() -> Vec<serde_json::Value> {
    vec![
        json!({
            "name": contracts::TOOL_DESIGN,
            "description": "Critique a graphic or UI design image and return scores with a visual report.",
            "inputSchema": contracts::url_schema()
        }),
        json!({
            "name": contracts::TOOL_COPYWRITING,
            "description": "Critique the copy in an image or document: clarity, persuasiveness, tone, grammar, call to action.",
            "inputSchema": contracts::copywriting_schema()
        }),
        json!({
            "name": contracts::TOOL_WEBSITE,
            "description": "Critique a live website from a rendered capture of the page.",
            "inputSchema": contracts::url_schema()
        }),
        json!({
            "name": contracts::TOOL_LAYOUT,
            "description": "Critique layout, alignment, spacing and hierarchy of a design.",
            "inputSchema": contracts::url_schema()
        }),
        json!({
            "name": contracts::TOOL_PDF_PRESENTATION,
            "description": "Critique a PDF slide deck or presentation.",
            "inputSchema": contracts::url_schema()
        }),
        json!({
            "name": contracts::TOOL_ARCHITECTURE,
            "description": "Critique an architectural drawing, plan or rendering.",
            "inputSchema": contracts::url_schema()
        }),
        json!({
            "name": contracts::TOOL_GOOGLE_FILE,
            "description": "Critique a Google Slides, Docs, Sheets or Drive file shared by link.",
            "inputSchema": contracts::google_file_schema()
        }),
        json!({
            "name": contracts::TOOL_BRAND_CONSISTENCY,
            "description": "Check how consistent a design is with a brand's website.",
            "inputSchema": contracts::brand_consistency_schema()
        }),
        json!({
            "name": contracts::TOOL_CONVERT_LINK,
            "description": "Convert a Google sharing link into direct export URLs.",
            "inputSchema": contracts::url_schema()
        }),
        json!({
            "name": contracts::TOOL_RENDER_REPORT,
            "description": "Parse an existing critique text and render it as a PNG score report.",
            "inputSchema": contracts::render_report_schema()
        }),
    ]
}
