use crate::input::{InputError, load_brand_request, load_request};
use crate::pipeline::Analyzer;
use crate::prompts::{AnalysisKind, AnalysisRequest};
use crate::tools::{ReportExtras, error_result, report_result};
use serde_json::{Value, json};
use tracing::warn;

pub fn call(analyzer: &Analyzer, kind: AnalysisKind, args: &Value) -> Value {
    run(analyzer, load_request(kind, args))
}

pub fn call_brand_consistency(analyzer: &Analyzer, args: &Value) -> Value {
    run(analyzer, load_brand_request(args))
}

fn run(analyzer: &Analyzer, request: Result<AnalysisRequest, InputError>) -> Value {
    let request = match request {
        Ok(request) => request,
        Err(err) => return error_result(err.kind, err.message, None),
    };

    let outcome = match analyzer.run(&request) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(kind = request.kind.as_str(), error = %err, "analysis failed");
            return error_result(err.kind(), err.to_string(), Some(request.target_url.as_str()));
        }
    };

    report_result(
        &outcome.report,
        outcome.rendered.as_ref(),
        ReportExtras {
            saved_path: outcome.saved_path.as_deref(),
            published_url: outcome.published_url.as_deref(),
            notes: &outcome.notes,
            link: Some(json!(outcome.link)),
        },
    )
}
