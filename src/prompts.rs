//! Analysis kinds, their scoring categories, and the prompt sent to the model.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    Design,
    Copywriting,
    Website,
    Layout,
    PdfPresentation,
    Architectural,
    GoogleFile,
}

const DESIGN_CATEGORIES: &[&str] = &[
    "Visual Harmony",
    "Clarity",
    "User Friendliness",
    "Interactivity",
    "Creativity",
];
const COPYWRITING_CATEGORIES: &[&str] = &[
    "Clarity",
    "Persuasiveness",
    "Tone Consistency",
    "Grammar",
    "Call To Action",
];
const WEBSITE_CATEGORIES: &[&str] = &[
    "Visual Design",
    "Navigation",
    "Readability",
    "Responsiveness",
    "Accessibility",
];
const LAYOUT_CATEGORIES: &[&str] = &[
    "Alignment",
    "Hierarchy",
    "Spacing",
    "Balance",
    "Grid Consistency",
];
const PRESENTATION_CATEGORIES: &[&str] = &[
    "Structure",
    "Visual Design",
    "Readability",
    "Storytelling",
    "Consistency",
];
const ARCHITECTURAL_CATEGORIES: &[&str] = &[
    "Functionality",
    "Aesthetics",
    "Spatial Organization",
    "Materiality",
    "Context",
];

impl AnalysisKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "design" => Some(AnalysisKind::Design),
            "copywriting" => Some(AnalysisKind::Copywriting),
            "website" => Some(AnalysisKind::Website),
            "layout" => Some(AnalysisKind::Layout),
            "pdf-presentation" | "presentation" => Some(AnalysisKind::PdfPresentation),
            "architectural" | "architecture" => Some(AnalysisKind::Architectural),
            "google-file" => Some(AnalysisKind::GoogleFile),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Design => "design",
            AnalysisKind::Copywriting => "copywriting",
            AnalysisKind::Website => "website",
            AnalysisKind::Layout => "layout",
            AnalysisKind::PdfPresentation => "pdf-presentation",
            AnalysisKind::Architectural => "architectural",
            AnalysisKind::GoogleFile => "google-file",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AnalysisKind::Design => "Design Analysis",
            AnalysisKind::Copywriting => "Copywriting Analysis",
            AnalysisKind::Website => "Website Analysis",
            AnalysisKind::Layout => "Layout Analysis",
            AnalysisKind::PdfPresentation => "Presentation Analysis",
            AnalysisKind::Architectural => "Architectural Analysis",
            AnalysisKind::GoogleFile => "Google File Analysis",
        }
    }

    /// Categories scored for this kind. Google files borrow the set of the
    /// kind their `analysis_type` points at.
    pub fn categories(&self, analysis_type: Option<&str>) -> &'static [&'static str] {
        match self {
            AnalysisKind::Design => DESIGN_CATEGORIES,
            AnalysisKind::Copywriting => COPYWRITING_CATEGORIES,
            AnalysisKind::Website => WEBSITE_CATEGORIES,
            AnalysisKind::Layout => LAYOUT_CATEGORIES,
            AnalysisKind::PdfPresentation => PRESENTATION_CATEGORIES,
            AnalysisKind::Architectural => ARCHITECTURAL_CATEGORIES,
            AnalysisKind::GoogleFile => match analysis_type.map(str::trim) {
                Some("presentation") => PRESENTATION_CATEGORIES,
                Some("copywriting") => COPYWRITING_CATEGORIES,
                Some("layout") => LAYOUT_CATEGORIES,
                _ => DESIGN_CATEGORIES,
            },
        }
    }

    fn role(&self) -> &'static str {
        match self {
            AnalysisKind::Design | AnalysisKind::GoogleFile => {
                "You are a professional UI/UX and graphic design expert."
            }
            AnalysisKind::Copywriting => "You are a senior copywriter and content strategist.",
            AnalysisKind::Website => "You are a web design and usability expert.",
            AnalysisKind::Layout => "You are an expert in layout, grids and visual hierarchy.",
            AnalysisKind::PdfPresentation => {
                "You are a presentation design coach reviewing a slide deck."
            }
            AnalysisKind::Architectural => {
                "You are an experienced architect reviewing an architectural drawing or rendering."
            }
        }
    }
}

/// One tool invocation's worth of analysis input. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub kind: AnalysisKind,
    pub target_url: String,
    /// Only set for brand-consistency comparisons.
    pub secondary_url: Option<String>,
    pub language: Option<String>,
    pub content_type: Option<String>,
    pub analysis_type: Option<String>,
}

impl AnalysisRequest {
    pub fn new(kind: AnalysisKind, target_url: impl Into<String>) -> Self {
        Self {
            kind,
            target_url: target_url.into(),
            secondary_url: None,
            language: None,
            content_type: None,
            analysis_type: None,
        }
    }

    pub fn categories(&self) -> &'static [&'static str] {
        self.kind.categories(self.analysis_type.as_deref())
    }
}

pub fn build_prompt(request: &AnalysisRequest) -> String {
    let mut prompt = String::new();
    prompt.push_str(request.kind.role());
    prompt.push('\n');

    match request.kind {
        AnalysisKind::GoogleFile => {
            let focus = request.analysis_type.as_deref().unwrap_or("design");
            prompt.push_str(&format!(
                "The attached file was exported from Google Workspace. Review it with a {focus} focus.\n"
            ));
        }
        AnalysisKind::Copywriting => {
            if let Some(content_type) = &request.content_type {
                prompt.push_str(&format!("The content is a {content_type}.\n"));
            }
        }
        _ => {}
    }

    if let Some(secondary) = &request.secondary_url {
        prompt.push_str(&format!(
            "The second image is a capture of the brand's website ({secondary}). \
             Judge how consistent the first design is with that brand.\n"
        ));
    }

    prompt.push_str("Analyze the attached material in these categories:\n\n");
    for (index, category) in request.categories().iter().enumerate() {
        prompt.push_str(&format!("{}. {category}\n", index + 1));
    }

    prompt.push_str(
        "\nFor each category write exactly one line in the form\n\
         `<Category>: <score>/10 - <short explanation>`\n\
         using an integer score from 0 to 10 and the category name exactly as listed.\n\
         Finish with a line `Overall: <average>/10`.\n",
    );

    if let Some(language) = &request.language {
        prompt.push_str(&format!("Write the explanations in {language}.\n"));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(AnalysisKind::parse("pdf_presentation"), Some(AnalysisKind::PdfPresentation));
        assert_eq!(AnalysisKind::parse(" Architecture "), Some(AnalysisKind::Architectural));
        assert_eq!(AnalysisKind::parse("google-file"), Some(AnalysisKind::GoogleFile));
        assert_eq!(AnalysisKind::parse("poetry"), None);
    }

    #[test]
    fn google_file_categories_follow_analysis_type() {
        let kind = AnalysisKind::GoogleFile;
        assert_eq!(kind.categories(Some("presentation")), PRESENTATION_CATEGORIES);
        assert_eq!(kind.categories(Some("copywriting")), COPYWRITING_CATEGORIES);
        assert_eq!(kind.categories(Some("layout")), LAYOUT_CATEGORIES);
        assert_eq!(kind.categories(None), DESIGN_CATEGORIES);
    }

    #[test]
    fn prompt_lists_categories_and_hints() {
        let mut request = AnalysisRequest::new(AnalysisKind::Copywriting, "https://example.com/ad.png");
        request.language = Some("Turkish".to_string());
        request.content_type = Some("social media post".to_string());

        let prompt = build_prompt(&request);
        assert!(prompt.contains("1. Clarity\n"));
        assert!(prompt.contains("5. Call To Action\n"));
        assert!(prompt.contains("The content is a social media post."));
        assert!(prompt.contains("Write the explanations in Turkish."));
        assert!(!prompt.contains("brand's website"));
    }

    #[test]
    fn brand_prompt_mentions_website() {
        let mut request = AnalysisRequest::new(AnalysisKind::Design, "https://example.com/logo.png");
        request.secondary_url = Some("https://example.com".to_string());
        let prompt = build_prompt(&request);
        assert!(prompt.contains("brand's website (https://example.com)"));
    }
}
