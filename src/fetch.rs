//! Downloads the bytes that get shown to the model.

use crate::error::FetchError;
use crate::http::{RetryPolicy, send_with_retries};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::io::Read;
use tracing::{debug, info};
use url::Url;

pub const MAX_FETCH_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedContent {
    pub url: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FetchedContent {
    /// Reference handed to the model gateway.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == "application/pdf"
    }

    /// Last path segment of the source URL, or a name derived from the MIME
    /// type when the URL has none (e.g. Google `/export/pdf`).
    pub fn file_name(&self) -> String {
        let extension = self.mime_type.rsplit('/').next().unwrap_or("bin");
        let segment = Url::parse(&self.url).ok().and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        });
        match segment {
            Some(name) if name.contains('.') => name,
            _ => format!("attachment.{extension}"),
        }
    }
}

pub trait ContentSource {
    fn fetch(&self, url: &str) -> Result<FetchedContent, FetchError>;

    /// Rendered capture of a web page.
    fn capture_website(&self, url: &str) -> Result<FetchedContent, FetchError>;
}

pub struct HttpFetcher {
    http: Client,
    retry: RetryPolicy,
    max_bytes: u64,
    screenshot_service: Option<String>,
}

impl HttpFetcher {
    pub fn new(http: Client, retry: RetryPolicy, screenshot_service: Option<String>) -> Self {
        Self {
            http,
            retry,
            max_bytes: MAX_FETCH_BYTES,
            screenshot_service,
        }
    }
}

impl ContentSource for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedContent, FetchError> {
        let response = send_with_retries(&self.retry, "fetch", || self.http.get(url)).map_err(
            |err| FetchError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            },
        )?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(size) = response.content_length()
            && size > self.max_bytes
        {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                size,
                max: self.max_bytes,
            });
        }

        let declared = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_ascii_lowercase());

        let mut bytes = Vec::new();
        response
            .take(self.max_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(|err| FetchError::Transport {
                url: url.to_string(),
                message: format!("failed reading body: {err}"),
            })?;

        let size = bytes.len() as u64;
        if size > self.max_bytes {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                size,
                max: self.max_bytes,
            });
        }
        if bytes.is_empty() {
            return Err(FetchError::Empty {
                url: url.to_string(),
            });
        }

        let mime_type = accepted_mime_type(declared.as_deref(), &bytes).ok_or_else(|| {
            FetchError::UnsupportedType {
                url: url.to_string(),
                content_type: declared.unwrap_or_else(|| "unknown".to_string()),
            }
        })?;

        info!(%url, %mime_type, size, "fetched content");
        Ok(FetchedContent {
            url: url.to_string(),
            mime_type,
            bytes,
        })
    }

    fn capture_website(&self, url: &str) -> Result<FetchedContent, FetchError> {
        let Some(service) = &self.screenshot_service else {
            return Err(FetchError::CaptureUnavailable(
                "no screenshot service configured".to_string(),
            ));
        };
        let capture_url = screenshot_url(service, url)
            .ok_or_else(|| FetchError::CaptureUnavailable(format!("invalid template: {service}")))?;
        debug!(%capture_url, "capturing website");
        let mut content = self.fetch(&capture_url)?;
        content.url = url.to_string();
        Ok(content)
    }
}

pub fn screenshot_url(template: &str, target: &str) -> Option<String> {
    template
        .contains("{url}")
        .then(|| template.replace("{url}", &urlencoding::encode(target)))
}

/// The declared type when it is an image or PDF, otherwise whatever the
/// magic bytes say, as long as that is an image or PDF.
pub fn accepted_mime_type(declared: Option<&str>, bytes: &[u8]) -> Option<String> {
    if let Some(declared) = declared
        && is_analyzable(declared)
    {
        return Some(declared.to_string());
    }
    let sniffed = infer::get(bytes)?.mime_type();
    is_analyzable(sniffed).then(|| sniffed.to_string())
}

fn is_analyzable(mime_type: &str) -> bool {
    mime_type.starts_with("image/") || mime_type == "application/pdf"
}
