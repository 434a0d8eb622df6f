//! Error taxonomy for the analysis pipeline.
//!
//! Each external-call failure is mapped to exactly one of these kinds before
//! it reaches the MCP caller.

use crate::mcp::errors;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("{note} ({url})")]
    Unrecognized { url: String, note: String },

    #[error("URL has no candidate export for analysis: {0}")]
    NoCandidate(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} is too large: {size} bytes (max {max})")]
    TooLarge { url: String, size: u64, max: u64 },

    #[error("{url} has unsupported content type: {content_type}")]
    UnsupportedType { url: String, content_type: String },

    #[error("{url} returned an empty body")]
    Empty { url: String },

    #[error("website capture unavailable: {0}")]
    CaptureUnavailable(String),
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("model API credential is not configured")]
    MissingCredential,

    #[error("model request failed: {0}")]
    Transport(String),

    #[error("model API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model response could not be decoded: {0}")]
    Decode(String),

    #[error("model returned empty text")]
    EmptyResponse,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no expected categories were supplied")]
    NoCategories,

    #[error("category name cannot be matched: {0:?}")]
    InvalidCategory(String),

    #[error("category listed more than once: {0}")]
    DuplicateCategory(String),

    #[error("none of the expected categories were found in the model output ({0})")]
    NothingRecognized(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to encode report image: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to write report to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("remote publish failed: {0}")]
    Remote(String),

    #[error("remote publish returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Failures that abort the pipeline before a report exists.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl AnalysisError {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Resolution(_) => errors::RESOLUTION_FAILED,
            AnalysisError::Fetch(FetchError::TooLarge { .. }) => errors::TOO_LARGE,
            AnalysisError::Fetch(_) => errors::FETCH_FAILED,
            AnalysisError::Gateway(_) => errors::GATEWAY_FAILED,
            AnalysisError::Parse(_) => errors::PARSE_FAILED,
        }
    }
}
