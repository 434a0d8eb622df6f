//! Classifies input URLs and rewrites Google sharing links into export links.
//!
//! Rules are evaluated top to bottom and the first match wins: links this
//! module itself produces, Google file types, direct file extensions, then
//! generic websites. New Google file types are added to [`GOOGLE_FILE_TYPES`].

use serde::Serialize;
use url::Url;

const MIN_FILE_ID_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Image,
    Pdf,
    Website,
    GoogleSlides,
    GoogleDrive,
    GoogleDocs,
    GoogleSheets,
    Unknown,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Image => "image",
            LinkKind::Pdf => "pdf",
            LinkKind::Website => "website",
            LinkKind::GoogleSlides => "google_slides",
            LinkKind::GoogleDrive => "google_drive",
            LinkKind::GoogleDocs => "google_docs",
            LinkKind::GoogleSheets => "google_sheets",
            LinkKind::Unknown => "unknown",
        }
    }

    pub fn is_google(&self) -> bool {
        matches!(
            self,
            LinkKind::GoogleSlides
                | LinkKind::GoogleDrive
                | LinkKind::GoogleDocs
                | LinkKind::GoogleSheets
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportCandidate {
    pub format: String,
    pub url: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceLink {
    pub original_url: String,
    pub kind: LinkKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    pub candidates: Vec<ExportCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ResourceLink {
    fn unknown(url: &str, note: impl Into<String>) -> Self {
        Self {
            original_url: url.to_string(),
            kind: LinkKind::Unknown,
            file_id: None,
            candidates: Vec::new(),
            note: Some(note.into()),
        }
    }

    fn direct(url: &str, kind: LinkKind, format: &str, description: &str) -> Self {
        Self {
            original_url: url.to_string(),
            kind,
            file_id: None,
            candidates: vec![ExportCandidate {
                format: format.to_string(),
                url: url.to_string(),
                description: description.to_string(),
            }],
            note: None,
        }
    }
}

struct ExportTemplate {
    format: &'static str,
    /// Absolute URL with a single `{id}` placeholder.
    template: &'static str,
    description: &'static str,
}

impl ExportTemplate {
    fn render(&self, id: &str) -> String {
        self.template.replace("{id}", id)
    }

    /// Returns the file id when `url` is exactly this template filled in.
    fn match_rendered<'a>(&self, url: &'a str) -> Option<&'a str> {
        let (before, after) = self.template.split_once("{id}")?;
        let id = url.strip_prefix(before)?.strip_suffix(after)?;
        is_valid_file_id(id).then_some(id)
    }
}

struct GoogleFileType {
    kind: LinkKind,
    host: &'static str,
    /// Path prefix ending in `/d/`; the file id follows it.
    path_prefix: &'static str,
    exports: &'static [ExportTemplate],
}

const GOOGLE_FILE_TYPES: &[GoogleFileType] = &[
    GoogleFileType {
        kind: LinkKind::GoogleSlides,
        host: "docs.google.com",
        path_prefix: "/presentation/d/",
        exports: &[
            ExportTemplate {
                format: "pdf",
                template: "https://docs.google.com/presentation/d/{id}/export/pdf",
                description: "PDF version for presentation analysis",
            },
            ExportTemplate {
                format: "pptx",
                template: "https://docs.google.com/presentation/d/{id}/export/pptx",
                description: "PowerPoint version for download",
            },
        ],
    },
    GoogleFileType {
        kind: LinkKind::GoogleDrive,
        host: "drive.google.com",
        path_prefix: "/file/d/",
        exports: &[ExportTemplate {
            format: "direct_download",
            template: "https://drive.google.com/u/0/uc?id={id}&export=download",
            description: "Direct download link for the file",
        }],
    },
    GoogleFileType {
        kind: LinkKind::GoogleDocs,
        host: "docs.google.com",
        path_prefix: "/document/d/",
        exports: &[
            ExportTemplate {
                format: "pdf",
                template: "https://docs.google.com/document/d/{id}/export?format=pdf",
                description: "PDF version for document analysis",
            },
            ExportTemplate {
                format: "docx",
                template: "https://docs.google.com/document/d/{id}/export?format=docx",
                description: "Word document version",
            },
        ],
    },
    GoogleFileType {
        kind: LinkKind::GoogleSheets,
        host: "docs.google.com",
        path_prefix: "/spreadsheets/d/",
        exports: &[
            ExportTemplate {
                format: "pdf",
                template: "https://docs.google.com/spreadsheets/d/{id}/export?format=pdf",
                description: "PDF version for analysis",
            },
            ExportTemplate {
                format: "xlsx",
                template: "https://docs.google.com/spreadsheets/d/{id}/export?format=xlsx",
                description: "Excel version for download",
            },
        ],
    },
];

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

pub fn resolve(url: &str) -> ResourceLink {
    let url = url.trim();
    if url.is_empty() {
        return ResourceLink::unknown(url, "URL is empty");
    }

    if let Some(link) = resolve_export_link(url) {
        return link;
    }

    let Ok(parsed) = Url::parse(url) else {
        return ResourceLink::unknown(url, "URL could not be parsed");
    };

    if let Some(link) = resolve_google_file(url, &parsed) {
        return link;
    }

    if let Some(link) = resolve_direct_file(url, &parsed) {
        return link;
    }

    let is_http = matches!(parsed.scheme(), "http" | "https");
    if is_http && parsed.host_str().is_some_and(|host| !host.is_empty()) {
        return ResourceLink {
            original_url: url.to_string(),
            kind: LinkKind::Website,
            file_id: None,
            candidates: Vec::new(),
            note: None,
        };
    }

    ResourceLink::unknown(url, "URL format not recognized as an analyzable resource")
}

/// Export links are served files: pdf exports analyze as PDFs, Drive direct
/// downloads as images, and office formats are not analyzable.
fn resolve_export_link(url: &str) -> Option<ResourceLink> {
    for file_type in GOOGLE_FILE_TYPES {
        for export in file_type.exports {
            if export.match_rendered(url).is_none() {
                continue;
            }
            let link = match export.format {
                "pdf" => ResourceLink::direct(url, LinkKind::Pdf, "pdf", export.description),
                "direct_download" => {
                    ResourceLink::direct(url, LinkKind::Image, "direct_download", export.description)
                }
                other => ResourceLink::unknown(
                    url,
                    format!("{other} export is not analyzable; use the pdf export instead"),
                ),
            };
            return Some(link);
        }
    }
    None
}

fn resolve_google_file(url: &str, parsed: &Url) -> Option<ResourceLink> {
    let host = parsed.host_str()?;
    let file_type = GOOGLE_FILE_TYPES.iter().find(|file_type| {
        host == file_type.host && parsed.path().starts_with(file_type.path_prefix)
    })?;

    let Some(file_id) = extract_file_id(parsed.path()) else {
        return Some(ResourceLink::unknown(
            url,
            "URL format not recognized as a Google file sharing link: no valid file id after /d/",
        ));
    };

    let candidates = file_type
        .exports
        .iter()
        .map(|export| ExportCandidate {
            format: export.format.to_string(),
            url: export.render(&file_id),
            description: export.description.to_string(),
        })
        .collect();

    Some(ResourceLink {
        original_url: url.to_string(),
        kind: file_type.kind,
        file_id: Some(file_id),
        candidates,
        note: None,
    })
}

fn resolve_direct_file(url: &str, parsed: &Url) -> Option<ResourceLink> {
    let path = parsed.path().to_ascii_lowercase();
    let (_, extension) = path.rsplit_once('.')?;
    if extension.contains('/') {
        return None;
    }
    if extension == "pdf" {
        return Some(ResourceLink::direct(url, LinkKind::Pdf, "pdf", "Direct PDF file"));
    }
    if IMAGE_EXTENSIONS.contains(&extension) {
        return Some(ResourceLink::direct(url, LinkKind::Image, extension, "Direct image file"));
    }
    None
}

/// The path segment immediately after `/d/`, cut at the next `/` or `?`.
pub fn extract_file_id(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("/d/")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let candidate = &rest[..end];
    is_valid_file_id(candidate).then(|| candidate.to_string())
}

fn is_valid_file_id(candidate: &str) -> bool {
    candidate.len() >= MIN_FILE_ID_LEN
        && candidate
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
}

/// Picks the single export used for fetching, driven by the caller's
/// `analysis_type` hint. Falls back to the first candidate.
pub fn select_candidate<'a>(
    link: &'a ResourceLink,
    analysis_type: Option<&str>,
) -> Option<&'a ExportCandidate> {
    let preferred: &[&str] = match analysis_type.map(str::trim) {
        Some("presentation") => &["pdf"],
        Some("copywriting") => &["pdf", "docx"],
        Some("layout") => &["pdf"],
        _ => &[],
    };

    preferred
        .iter()
        .find_map(|format| link.candidates.iter().find(|c| c.format == *format))
        .or_else(|| link.candidates.first())
}
