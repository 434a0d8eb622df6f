//! Ties resolution, fetching, the model call, parsing, rendering and
//! publishing together for one analysis request.

use crate::config::Config;
use crate::error::{AnalysisError, ResolutionError};
use crate::fetch::{ContentSource, FetchedContent, HttpFetcher};
use crate::gateway::{ModelGateway, OpenAiGateway};
use crate::http::build_client;
use crate::locator::{self, LinkKind, ResourceLink};
use crate::mcp::errors;
use crate::parser::ResponseParser;
use crate::prompts::{AnalysisRequest, build_prompt};
use crate::publish::{GitHubPublisher, LocalStore, Publisher, report_file_name};
use crate::render::{self, RenderedReport};
use crate::report::ScoreReport;
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// A non-fatal failure after the report was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub kind: &'static str,
    pub message: String,
}

impl Note {
    fn new(kind: &'static str, message: String) -> Self {
        Self { kind, message }
    }
}

/// Everything one analysis produced. Render and publish failures are
/// recorded in `notes`; the textual report is always present.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub link: ResourceLink,
    pub report: ScoreReport,
    pub rendered: Option<RenderedReport>,
    pub saved_path: Option<PathBuf>,
    pub published_url: Option<String>,
    pub notes: Vec<Note>,
}

pub struct Analyzer {
    source: Box<dyn ContentSource>,
    gateway: Box<dyn ModelGateway>,
    store: Option<LocalStore>,
    publisher: Option<Box<dyn Publisher>>,
}

impl Analyzer {
    pub fn new(source: Box<dyn ContentSource>, gateway: Box<dyn ModelGateway>) -> Self {
        Self {
            source,
            gateway,
            store: None,
            publisher: None,
        }
    }

    pub fn with_store(mut self, store: LocalStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_publisher(mut self, publisher: Box<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        let http = build_client(config.timeout())?;
        let retry = config.retry_policy();

        let source = HttpFetcher::new(http.clone(), retry, config.screenshot_service.clone());
        let gateway = OpenAiGateway::new(
            http.clone(),
            retry,
            &config.api_base,
            config.api_key().map(str::to_string),
            &config.model,
            config.max_tokens,
        );

        let mut analyzer = Self::new(Box::new(source), Box::new(gateway));
        if !config.no_save {
            analyzer = analyzer.with_store(LocalStore::new(&config.reports_dir));
        }
        if let Some((repo, token)) = config.github() {
            analyzer = analyzer.with_publisher(Box::new(GitHubPublisher::new(
                http,
                retry,
                repo,
                token,
                &config.github_branch,
                &config.github_dir,
            )));
        }
        Ok(analyzer)
    }

    pub fn run(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome, AnalysisError> {
        let link = locator::resolve(&request.target_url);
        info!(
            kind = request.kind.as_str(),
            link = link.kind.as_str(),
            "resolved analysis target"
        );
        let mut contents = vec![self.load(&link, request.analysis_type.as_deref())?];

        if let Some(secondary) = &request.secondary_url {
            let secondary_link = locator::resolve(secondary);
            contents.push(self.load(&secondary_link, None)?);
        }

        for content in &contents {
            debug!(
                url = %content.url,
                mime_type = %content.mime_type,
                bytes = content.bytes.len(),
                "attaching content"
            );
        }
        let prompt = build_prompt(request);
        let raw = self.gateway.complete(&prompt, &contents)?;

        let report = ResponseParser::new(request.categories())?.parse(request.kind, &raw)?;
        info!(
            overall = report.overall_score(),
            verdict = report.verdict().as_str(),
            "parsed model response"
        );

        let mut outcome = AnalysisOutcome {
            link,
            report,
            rendered: None,
            saved_path: None,
            published_url: None,
            notes: Vec::new(),
        };
        self.finish(&mut outcome);
        Ok(outcome)
    }

    /// Renders and persists; failures here never drop the report.
    fn finish(&self, outcome: &mut AnalysisOutcome) {
        let rendered = match render::render(&outcome.report) {
            Ok(rendered) => rendered,
            Err(err) => {
                warn!(error = %err, "render failed");
                outcome.notes.push(Note::new(
                    errors::RENDER_FAILED,
                    format!("Visual report unavailable: {err}"),
                ));
                return;
            }
        };

        let file_name = report_file_name(rendered.source.kind(), Utc::now());
        if let Some(store) = &self.store {
            match store.save(&rendered.image_bytes, &file_name) {
                Ok(path) => outcome.saved_path = Some(path),
                Err(err) => {
                    warn!(error = %err, "saving report failed");
                    outcome.notes.push(Note::new(
                        errors::PUBLISH_FAILED,
                        format!("Report not saved: {err}"),
                    ));
                }
            }
        }
        if let Some(publisher) = &self.publisher {
            match publisher.publish(&rendered.image_bytes, &file_name) {
                Ok(url) => outcome.published_url = Some(url),
                Err(err) => {
                    warn!(error = %err, "publishing report failed");
                    outcome.notes.push(Note::new(
                        errors::PUBLISH_FAILED,
                        format!("Shareable link unavailable: {err}"),
                    ));
                }
            }
        }
        outcome.rendered = Some(rendered);
    }

    fn load(
        &self,
        link: &ResourceLink,
        analysis_type: Option<&str>,
    ) -> Result<FetchedContent, AnalysisError> {
        match link.kind {
            LinkKind::Unknown => Err(ResolutionError::Unrecognized {
                url: link.original_url.clone(),
                note: link
                    .note
                    .clone()
                    .unwrap_or_else(|| "URL format not recognized".to_string()),
            }
            .into()),
            LinkKind::Website => Ok(self.source.capture_website(&link.original_url)?),
            _ => {
                let candidate = locator::select_candidate(link, analysis_type)
                    .ok_or_else(|| ResolutionError::NoCandidate(link.original_url.clone()))?;
                Ok(self.source.fetch(&candidate.url)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, GatewayError, PublishError};
    use crate::prompts::AnalysisKind;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::tempdir;

    #[derive(Default)]
    struct Calls {
        fetched: Vec<String>,
        captured: Vec<String>,
        prompts: Vec<(String, Vec<String>)>,
    }

    struct FakeSource {
        calls: Rc<RefCell<Calls>>,
        fail: bool,
    }

    impl ContentSource for FakeSource {
        fn fetch(&self, url: &str) -> Result<FetchedContent, FetchError> {
            self.calls.borrow_mut().fetched.push(url.to_string());
            if self.fail {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                });
            }
            let mime_type = if url.ends_with("/pdf") {
                "application/pdf"
            } else {
                "image/png"
            };
            Ok(FetchedContent {
                url: url.to_string(),
                mime_type: mime_type.to_string(),
                bytes: vec![1, 2, 3],
            })
        }

        fn capture_website(&self, url: &str) -> Result<FetchedContent, FetchError> {
            self.calls.borrow_mut().captured.push(url.to_string());
            Ok(FetchedContent {
                url: url.to_string(),
                mime_type: "image/png".to_string(),
                bytes: vec![4, 5, 6],
            })
        }
    }

    struct FakeGateway {
        calls: Rc<RefCell<Calls>>,
        reply: Result<String, ()>,
    }

    impl ModelGateway for FakeGateway {
        fn complete(
            &self,
            prompt: &str,
            attachments: &[FetchedContent],
        ) -> Result<String, GatewayError> {
            let mime_types = attachments
                .iter()
                .map(|content| content.mime_type.clone())
                .collect();
            self.calls
                .borrow_mut()
                .prompts
                .push((prompt.to_string(), mime_types));
            self.reply.clone().map_err(|_| GatewayError::EmptyResponse)
        }
    }

    struct FailingPublisher;

    impl Publisher for FailingPublisher {
        fn publish(&self, _bytes: &[u8], _file_name: &str) -> Result<String, PublishError> {
            Err(PublishError::Remote("push rejected".to_string()))
        }
    }

    struct EchoPublisher;

    impl Publisher for EchoPublisher {
        fn publish(&self, _bytes: &[u8], file_name: &str) -> Result<String, PublishError> {
            Ok(format!("https://example.com/{file_name}"))
        }
    }

    fn fake_analyzer(reply: Result<&str, ()>, fail_fetch: bool) -> (Analyzer, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let source = FakeSource {
            calls: Rc::clone(&calls),
            fail: fail_fetch,
        };
        let gateway = FakeGateway {
            calls: Rc::clone(&calls),
            reply: reply.map(str::to_string),
        };
        (Analyzer::new(Box::new(source), Box::new(gateway)), calls)
    }

    const DESIGN_REPLY: &str = "Visual Harmony: 8/10 - balanced\n\
                                Clarity: 9/10 - great contrast\n\
                                User Friendliness: 7/10\n\
                                Interactivity: 6/10\n\
                                Creativity: 9/10";

    #[test]
    fn full_run_saves_and_publishes() {
        let dir = tempdir().expect("tempdir");
        let (analyzer, calls) = fake_analyzer(Ok(DESIGN_REPLY), false);
        let analyzer = analyzer
            .with_store(LocalStore::new(dir.path()))
            .with_publisher(Box::new(EchoPublisher));

        let request = AnalysisRequest::new(AnalysisKind::Design, "https://example.com/shot.png");
        let outcome = analyzer.run(&request).expect("outcome");

        assert_eq!(outcome.report.overall_score(), 7.8);
        assert!(outcome.rendered.is_some());
        assert!(outcome.notes.is_empty());
        let saved = outcome.saved_path.expect("saved path");
        assert!(saved.exists());
        let file_name = saved.file_name().and_then(|n| n.to_str()).expect("name");
        assert_eq!(
            outcome.published_url.as_deref(),
            Some(format!("https://example.com/{file_name}").as_str())
        );
        assert_eq!(calls.borrow().fetched, ["https://example.com/shot.png"]);
        assert_eq!(calls.borrow().prompts[0].1, ["image/png"]);
    }

    #[test]
    fn google_slides_fetch_pdf_export() {
        let (analyzer, calls) = fake_analyzer(Ok("Structure: 8\nStorytelling: 6"), false);
        let mut request = AnalysisRequest::new(
            AnalysisKind::GoogleFile,
            "https://docs.google.com/presentation/d/1A2b3C4d5E6f7G8h9I0j/edit?usp=sharing",
        );
        request.analysis_type = Some("presentation".to_string());

        let outcome = analyzer.run(&request).expect("outcome");
        assert_eq!(outcome.link.kind, LinkKind::GoogleSlides);
        assert_eq!(
            calls.borrow().fetched,
            ["https://docs.google.com/presentation/d/1A2b3C4d5E6f7G8h9I0j/export/pdf"]
        );
        assert_eq!(calls.borrow().prompts[0].1, ["application/pdf"]);
        assert_eq!(outcome.report.categories().len(), 5);
        assert_eq!(outcome.report.overall_score(), 2.8);
    }

    #[test]
    fn brand_comparison_sends_two_images() {
        let (analyzer, calls) = fake_analyzer(Ok(DESIGN_REPLY), false);
        let mut request = AnalysisRequest::new(AnalysisKind::Design, "https://example.com/logo.png");
        request.secondary_url = Some("https://example.com".to_string());

        analyzer.run(&request).expect("outcome");
        assert_eq!(calls.borrow().captured, ["https://example.com"]);
        assert_eq!(calls.borrow().prompts[0].1.len(), 2);
    }

    #[test]
    fn unknown_link_aborts_before_fetch() {
        let (analyzer, calls) = fake_analyzer(Ok(DESIGN_REPLY), false);
        let request = AnalysisRequest::new(
            AnalysisKind::GoogleFile,
            "https://docs.google.com/document/d/short/edit",
        );
        let err = analyzer.run(&request).expect_err("error");
        assert!(matches!(err, AnalysisError::Resolution(_)));
        assert!(calls.borrow().fetched.is_empty());
        assert!(calls.borrow().prompts.is_empty());
    }

    #[test]
    fn fetch_failure_skips_gateway() {
        let (analyzer, calls) = fake_analyzer(Ok(DESIGN_REPLY), true);
        let request = AnalysisRequest::new(AnalysisKind::Design, "https://example.com/a.png");
        let err = analyzer.run(&request).expect_err("error");
        assert!(matches!(err, AnalysisError::Fetch(_)));
        assert!(calls.borrow().prompts.is_empty());
    }

    #[test]
    fn gateway_and_parse_failures_are_fatal() {
        let (analyzer, _) = fake_analyzer(Err(()), false);
        let request = AnalysisRequest::new(AnalysisKind::Design, "https://example.com/a.png");
        let err = analyzer.run(&request).expect_err("error");
        assert!(matches!(err, AnalysisError::Gateway(_)));

        let (analyzer, _) = fake_analyzer(Ok("I cannot rate this image."), false);
        let err = analyzer.run(&request).expect_err("error");
        assert!(matches!(err, AnalysisError::Parse(_)));
    }

    #[test]
    fn publish_failure_keeps_report() {
        let (analyzer, _) = fake_analyzer(Ok(DESIGN_REPLY), false);
        let analyzer = analyzer.with_publisher(Box::new(FailingPublisher));
        let request = AnalysisRequest::new(AnalysisKind::Design, "https://example.com/a.png");

        let outcome = analyzer.run(&request).expect("outcome");
        assert!(outcome.rendered.is_some());
        assert!(outcome.published_url.is_none());
        assert_eq!(outcome.notes.len(), 1);
        assert_eq!(outcome.notes[0].kind, errors::PUBLISH_FAILED);
        assert!(outcome.notes[0].message.contains("push rejected"));
    }
}
