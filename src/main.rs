use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value, json};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod fetch;
mod gateway;
mod http;
mod input;
mod locator;
mod mcp;
mod parser;
mod pipeline;
mod prompts;
mod publish;
mod render;
mod report;
mod tools;

use config::Config;
use pipeline::Analyzer;
use prompts::AnalysisKind;

const JSONRPC_PARSE_ERROR: i64 = -32700;
const JSONRPC_METHOD_NOT_FOUND: i64 = -32601;

#[derive(Parser)]
#[command(name = "mcp-design-review")]
#[command(
    version,
    about = "Design critique tools for MCP: vision-model scoring rendered as PNG reports"
)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct ConvertLinkArgs {
    /// Google sharing link
    #[arg(long)]
    url: String,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
}

#[derive(Args, Clone)]
struct RenderReportArgs {
    /// Analysis kind the critique was written for
    #[arg(long)]
    kind: String,
    /// File holding the critique text
    #[arg(long)]
    text_file: PathBuf,
    /// Where to write the PNG
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Design,
    Copywriting,
    Website,
    Layout,
    PdfPresentation,
    Architecture,
    GoogleFile,
    BrandConsistency,
}

impl KindArg {
    fn analysis_kind(self) -> Option<AnalysisKind> {
        match self {
            KindArg::Design => Some(AnalysisKind::Design),
            KindArg::Copywriting => Some(AnalysisKind::Copywriting),
            KindArg::Website => Some(AnalysisKind::Website),
            KindArg::Layout => Some(AnalysisKind::Layout),
            KindArg::PdfPresentation => Some(AnalysisKind::PdfPresentation),
            KindArg::Architecture => Some(AnalysisKind::Architectural),
            KindArg::GoogleFile => Some(AnalysisKind::GoogleFile),
            KindArg::BrandConsistency => None,
        }
    }
}

#[derive(Args, Clone)]
struct AnalyzeArgs {
    #[arg(long, value_enum)]
    kind: KindArg,
    /// Image, PDF, website or Google link to critique
    #[arg(long)]
    url: String,
    /// Brand website (brand-consistency only)
    #[arg(long)]
    website_url: Option<String>,
    /// Language for the explanations
    #[arg(long)]
    language: Option<String>,
    /// What the copy is, e.g. "landing page" (copywriting only)
    #[arg(long)]
    content_type: Option<String>,
    /// design, presentation, copywriting or layout (google-file only)
    #[arg(long)]
    analysis_type: Option<String>,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
    #[command(flatten)]
    config: Config,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP stdio server
    Serve {
        /// Serve MCP over stdio (NDJSON)
        #[arg(long)]
        stdio: bool,
        #[command(flatten)]
        config: Config,
    },
    /// Convert a Google sharing link into export URLs
    ConvertLink(ConvertLinkArgs),
    /// Parse a critique text and render its PNG report
    RenderReport(RenderReportArgs),
    /// Run one analysis from the command line
    Analyze(AnalyzeArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Serve { stdio, config } => {
            if stdio {
                let analyzer =
                    Analyzer::from_config(&config).context("failed to build HTTP client")?;
                run_stdio_server(&analyzer)
            } else {
                anyhow::bail!("only --stdio transport is supported")
            }
        }
        Commands::ConvertLink(args) => run_convert_link(args),
        Commands::RenderReport(args) => run_render_report(args),
        Commands::Analyze(args) => run_analyze(args),
    }
}

/// Logs go to stderr; stdout carries the MCP stream.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "mcp_design_review=debug"
    } else {
        "mcp_design_review=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run_convert_link(args: ConvertLinkArgs) -> Result<()> {
    let mut map = Map::new();
    map.insert("url".to_string(), json!(args.url));
    let result = tools::convert_link::call(&Value::Object(map));
    print_tool_result(result, args.json)
}

fn run_render_report(args: RenderReportArgs) -> Result<()> {
    let text = fs::read_to_string(&args.text_file)
        .with_context(|| format!("failed to read {}", args.text_file.display()))?;

    let mut map = Map::new();
    map.insert("kind".to_string(), json!(args.kind));
    map.insert("text".to_string(), json!(text));
    if let Some(out) = &args.out {
        map.insert("output_path".to_string(), json!(out.display().to_string()));
    }
    let result = tools::render_report::call(&Value::Object(map));
    print_tool_result(result, args.json)
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let analyzer = Analyzer::from_config(&args.config).context("failed to build HTTP client")?;

    let mut map = Map::new();
    map.insert("url".to_string(), json!(args.url));
    let optional = [
        ("website_url", &args.website_url),
        ("language", &args.language),
        ("content_type", &args.content_type),
        ("analysis_type", &args.analysis_type),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            map.insert(key.to_string(), json!(value));
        }
    }

    let arguments = Value::Object(map);
    let result = match args.kind.analysis_kind() {
        Some(kind) => tools::analyze::call(&analyzer, kind, &arguments),
        None => tools::analyze::call_brand_consistency(&analyzer, &arguments),
    };
    print_tool_result(result, args.json)
}

fn print_tool_result(result: Value, json_output: bool) -> Result<()> {
    let is_error = result
        .get("isError")
        .and_then(|value| value.as_bool())
        .unwrap_or(false);

    if is_error {
        let message = result
            .get("structuredContent")
            .and_then(|value| value.get("error"))
            .and_then(|value| value.get("message"))
            .and_then(|value| value.as_str())
            .unwrap_or("tool error");
        eprintln!("{} {message}", tools::FAILURE_PREFIX);
        process::exit(1);
    }

    if json_output {
        let structured = result
            .get("structuredContent")
            .cloned()
            .unwrap_or_else(|| json!({}));
        let output = serde_json::to_string_pretty(&structured)?;
        println!("{output}");
        return Ok(());
    }

    let text = result
        .get("content")
        .and_then(|value| value.as_array())
        .and_then(|arr| arr.first())
        .and_then(|value| value.get("text"))
        .and_then(|value| value.as_str())
        .unwrap_or("");
    // Inline images are for MCP clients; a terminal only gets the summary.
    let printable: Vec<&str> = text
        .lines()
        .filter(|line| !line.starts_with("!["))
        .collect();
    println!("{}", printable.join("\n").trim_end());
    Ok(())
}

fn run_stdio_server(analyzer: &Analyzer) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let reader = stdin.lock().lines();
    let mut writer = io::BufWriter::new(stdout.lock());
    info!("serving MCP over stdio");

    for line in reader {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let request: serde_json::Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(err) => {
                debug!(error = %err, "malformed request line");
                let response = error_response(Value::Null, JSONRPC_PARSE_ERROR, "Parse error");
                write_response(&mut writer, &response)?;
                continue;
            }
        };

        let method = request.get("method").and_then(|value| value.as_str());
        let id = request.get("id").cloned();
        let response = match (method, id) {
            (Some("initialize"), Some(id)) => Some(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "protocolVersion": "2025-11-25",
                    "capabilities": {
                        "tools": {"listChanged": false}
                    },
                    "serverInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }
            })),
            (Some("ping"), Some(id)) => Some(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {}
            })),
            (Some("tools/list"), Some(id)) => Some(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "tools": mcp::tool_definitions()
                }
            })),
            (Some("tools/call"), Some(id)) => {
                let result = handle_tool_call(analyzer, &request);
                Some(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": result
                }))
            }
            (Some(method), Some(id)) => Some(error_response(
                id,
                JSONRPC_METHOD_NOT_FOUND,
                &format!("Method not found: {method}"),
            )),
            _ => None,
        };

        if let Some(response) = response {
            write_response(&mut writer, &response)?;
        }
    }

    Ok(())
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message
        }
    })
}

fn write_response(writer: &mut impl Write, response: &Value) -> Result<()> {
    let serialized = serde_json::to_string(response).context("failed to serialize response")?;
    writeln!(writer, "{serialized}").context("failed to write response")?;
    writer.flush().context("failed to flush response")?;
    Ok(())
}

fn handle_tool_call(analyzer: &Analyzer, request: &serde_json::Value) -> serde_json::Value {
    let params = request.get("params");
    let Some(params) = params.and_then(|value| value.as_object()) else {
        return tools::error_result(mcp::errors::INVALID_INPUT, "params must be an object", None);
    };

    let name = params.get("name").and_then(|value| value.as_str());
    let Some(name) = name else {
        return tools::error_result(
            mcp::errors::INVALID_INPUT,
            "params.name must be a string",
            None,
        );
    };

    let args = params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| json!({}));
    info!(tool = name, "tool call");

    use mcp::contracts as c;
    match name {
        c::TOOL_DESIGN => tools::analyze::call(analyzer, AnalysisKind::Design, &args),
        c::TOOL_COPYWRITING => tools::analyze::call(analyzer, AnalysisKind::Copywriting, &args),
        c::TOOL_WEBSITE => tools::analyze::call(analyzer, AnalysisKind::Website, &args),
        c::TOOL_LAYOUT => tools::analyze::call(analyzer, AnalysisKind::Layout, &args),
        c::TOOL_PDF_PRESENTATION => {
            tools::analyze::call(analyzer, AnalysisKind::PdfPresentation, &args)
        }
        c::TOOL_ARCHITECTURE => tools::analyze::call(analyzer, AnalysisKind::Architectural, &args),
        c::TOOL_GOOGLE_FILE => tools::analyze::call(analyzer, AnalysisKind::GoogleFile, &args),
        c::TOOL_BRAND_CONSISTENCY => tools::analyze::call_brand_consistency(analyzer, &args),
        c::TOOL_CONVERT_LINK => tools::convert_link::call(&args),
        c::TOOL_RENDER_REPORT => tools::render_report::call(&args),
        _ => tools::error_result(
            mcp::errors::INVALID_INPUT,
            format!("tool not implemented: {name}"),
            Some(name),
        ),
    }
}
