use crate::mcp::contracts::{ANALYSIS_TYPES, MAX_TEXT_BYTES, MAX_URL_CHARS};
use crate::mcp::errors;
use crate::prompts::{AnalysisKind, AnalysisRequest};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct InputError {
    pub kind: &'static str,
    pub message: String,
}

impl InputError {
    fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(errors::INVALID_INPUT, message)
    }

    fn too_large(message: impl Into<String>) -> Self {
        Self::new(errors::TOO_LARGE, message)
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for InputError {}

/// Chat clients sometimes paste links as `@https://...`.
pub fn clean_url(raw: &str) -> String {
    raw.trim().trim_start_matches('@').trim().to_string()
}

pub fn load_url(args: &Value, field: &str) -> Result<String, InputError> {
    let obj = as_object(args)?;
    let raw = required_str(obj, field)?;
    let url = clean_url(raw);
    if url.is_empty() {
        return Err(InputError::invalid_input(format!("{field} must not be empty")));
    }
    let len = url.chars().count();
    if len > MAX_URL_CHARS {
        return Err(InputError::too_large(format!(
            "{field} exceeds limit: {len} characters (max {MAX_URL_CHARS})"
        )));
    }
    Ok(url)
}

/// Website fields accept a bare host; it is read as `https://`.
pub fn load_website_url(args: &Value, field: &str) -> Result<String, InputError> {
    let url = load_url(args, field)?;
    if url.contains("://") {
        return Ok(url);
    }
    let host = url.split('/').next().unwrap_or_default();
    if url.contains(char::is_whitespace) || !host.contains('.') {
        return Err(InputError::invalid_input(format!(
            "{field} must be an http(s) URL or a domain name"
        )));
    }
    Ok(format!("https://{url}"))
}

pub fn load_request(kind: AnalysisKind, args: &Value) -> Result<AnalysisRequest, InputError> {
    let obj = as_object(args)?;
    let url = if kind == AnalysisKind::Website {
        load_website_url(args, "url")?
    } else {
        load_url(args, "url")?
    };

    let mut request = AnalysisRequest::new(kind, url);
    request.language = optional_str(obj, "language")?;
    request.content_type = optional_str(obj, "content_type")?;

    let analysis_type = optional_str(obj, "analysis_type")?.map(|v| v.to_ascii_lowercase());
    if let Some(value) = &analysis_type
        && !ANALYSIS_TYPES.contains(&value.as_str())
    {
        return Err(InputError::invalid_input(format!(
            "analysis_type must be one of {}",
            ANALYSIS_TYPES.join(", ")
        )));
    }
    request.analysis_type = analysis_type;
    Ok(request)
}

/// Design critique of `url` judged against captures of `website_url`.
pub fn load_brand_request(args: &Value) -> Result<AnalysisRequest, InputError> {
    let mut request = load_request(AnalysisKind::Design, args)?;
    request.secondary_url = Some(load_website_url(args, "website_url")?);
    Ok(request)
}

pub fn load_kind(args: &Value) -> Result<AnalysisKind, InputError> {
    let obj = as_object(args)?;
    let raw = required_str(obj, "kind")?;
    AnalysisKind::parse(raw).ok_or_else(|| {
        InputError::invalid_input(format!("kind not supported: {raw}"))
    })
}

pub fn load_text(args: &Value) -> Result<String, InputError> {
    let obj = as_object(args)?;
    let text = required_str(obj, "text")?;
    if text.trim().is_empty() {
        return Err(InputError::invalid_input("text must not be empty"));
    }
    if text.len() as u64 > MAX_TEXT_BYTES {
        return Err(InputError::too_large(format!(
            "text exceeds limit: {} bytes (max {MAX_TEXT_BYTES})",
            text.len()
        )));
    }
    Ok(text.to_string())
}

pub fn load_output_path(args: &Value) -> Result<Option<PathBuf>, InputError> {
    let obj = as_object(args)?;
    match obj.get("output_path") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(path)) if path.trim().is_empty() => Err(InputError::invalid_input(
            "output_path must not be empty",
        )),
        Some(Value::String(path)) => Ok(Some(PathBuf::from(path))),
        Some(_) => Err(InputError::invalid_input("output_path must be a string")),
    }
}

fn as_object(args: &Value) -> Result<&Map<String, Value>, InputError> {
    args.as_object()
        .ok_or_else(|| InputError::invalid_input("arguments must be an object"))
}

fn required_str<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a str, InputError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(InputError::invalid_input(format!("{field} is required"))),
        Some(value) => value
            .as_str()
            .ok_or_else(|| InputError::invalid_input(format!("{field} must be a string"))),
    }
}

fn optional_str(obj: &Map<String, Value>, field: &str) -> Result<Option<String>, InputError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => {
            let value = value.trim();
            Ok((!value.is_empty()).then(|| value.to_string()))
        }
        Some(_) => Err(InputError::invalid_input(format!(
            "{field} must be a string"
        ))),
    }
}
