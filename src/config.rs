//! Runtime configuration, read once at process start and passed down
//! explicitly. Nothing below `main` looks at the environment.

use crate::http::RetryPolicy;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_REPORTS_DIR: &str = "reports";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

#[derive(Args, Clone)]
pub struct Config {
    /// API key for the vision model endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "DESIGN_REVIEW_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,
    /// Vision-capable model name
    #[arg(long, env = "DESIGN_REVIEW_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,
    /// Maximum tokens the model may generate
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,
    /// Directory rendered reports are written to
    #[arg(long, env = "DESIGN_REVIEW_REPORTS_DIR", default_value = DEFAULT_REPORTS_DIR)]
    pub reports_dir: PathBuf,
    /// Do not write rendered reports to disk
    #[arg(long)]
    pub no_save: bool,
    /// Screenshot service URL template containing `{url}`
    #[arg(long, env = "DESIGN_REVIEW_SCREENSHOT_SERVICE")]
    pub screenshot_service: Option<String>,
    /// GitHub repository (`owner/name`) reports are committed to
    #[arg(long, env = "DESIGN_REVIEW_GITHUB_REPO")]
    pub github_repo: Option<String>,
    /// GitHub token with contents write access
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,
    /// Branch reports are committed to
    #[arg(long, default_value = "main")]
    pub github_branch: String,
    /// Directory inside the repository for reports
    #[arg(long, default_value = "reports")]
    pub github_dir: String,
    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
    /// Retries for transient network failures
    #[arg(long, default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,
    /// Base backoff between retries, doubled per attempt
    #[arg(long, default_value_t = DEFAULT_RETRY_BACKOFF_MS)]
    pub retry_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
            no_save: false,
            screenshot_service: None,
            github_repo: None,
            github_token: None,
            github_branch: "main".to_string(),
            github_dir: "reports".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retries: DEFAULT_RETRIES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    /// Repository and token, when remote publishing is enabled.
    pub fn github(&self) -> Option<(&str, &str)> {
        let repo = self.github_repo.as_deref().filter(|v| !v.trim().is_empty())?;
        let token = self.github_token.as_deref().filter(|v| !v.trim().is_empty())?;
        Some((repo, token))
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|v| !v.trim().is_empty())
    }
}
