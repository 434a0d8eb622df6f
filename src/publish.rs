//! Persisting rendered reports: a local append-only directory and an
//! optional GitHub repository reached through the contents API.

use crate::error::PublishError;
use crate::http::{RetryPolicy, send_with_retries, truncate_body};
use crate::prompts::AnalysisKind;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde_json::{Value, json};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

const GITHUB_API: &str = "https://api.github.com";

pub trait Publisher {
    /// Stores `bytes` under `file_name` and returns a shareable URL.
    fn publish(&self, bytes: &[u8], file_name: &str) -> Result<String, PublishError>;
}

/// `{kind}-{timestamp}-{random}.png`; unique across concurrent writers.
pub fn report_file_name(kind: AnalysisKind, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}.png",
        kind.as_str(),
        now.format("%Y%m%dT%H%M%SZ"),
        &suffix[..8]
    )
}

pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes a new file; an existing file with the same name is never
    /// overwritten.
    pub fn save(&self, bytes: &[u8], file_name: &str) -> Result<PathBuf, PublishError> {
        let io_error = |path: &Path, source| PublishError::Io {
            path: path.display().to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(|err| io_error(&self.dir, err))?;
        let path = self.dir.join(file_name);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|err| io_error(&path, err))?;
        file.write_all(bytes).map_err(|err| io_error(&path, err))?;
        info!(path = %path.display(), bytes = bytes.len(), "report saved");
        Ok(path)
    }
}

pub struct GitHubPublisher {
    http: Client,
    retry: RetryPolicy,
    api_base: String,
    repo: String,
    token: String,
    branch: String,
    dir: String,
}

impl GitHubPublisher {
    pub fn new(
        http: Client,
        retry: RetryPolicy,
        repo: &str,
        token: &str,
        branch: &str,
        dir: &str,
    ) -> Self {
        Self {
            http,
            retry,
            api_base: GITHUB_API.to_string(),
            repo: repo.trim().to_string(),
            token: token.trim().to_string(),
            branch: branch.to_string(),
            dir: dir.trim_matches('/').to_string(),
        }
    }

    fn repo_path(&self, file_name: &str) -> String {
        if self.dir.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{file_name}", self.dir)
        }
    }

    fn contents_url(&self, repo_path: &str) -> String {
        format!("{}/repos/{}/contents/{repo_path}", self.api_base, self.repo)
    }
}

impl Publisher for GitHubPublisher {
    fn publish(&self, bytes: &[u8], file_name: &str) -> Result<String, PublishError> {
        let repo_path = self.repo_path(file_name);
        let url = self.contents_url(&repo_path);
        let payload = commit_payload(&repo_path, &self.branch, bytes);

        let response = send_with_retries(&self.retry, "publish", || {
            self.http
                .put(&url)
                .bearer_auth(&self.token)
                .header("Accept", "application/vnd.github+json")
                .json(&payload)
        })
        .map_err(|err| PublishError::Remote(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| PublishError::Remote(format!("failed reading response: {err}")))?;
        if !status.is_success() {
            return Err(PublishError::Status {
                status: status.as_u16(),
                body: truncate_body(&body, 512),
            });
        }

        let parsed: Value = serde_json::from_str(&body)
            .map_err(|err| PublishError::Remote(format!("invalid response: {err}")))?;
        let shared = parsed
            .get("content")
            .and_then(|content| content.get("html_url"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "https://github.com/{}/blob/{}/{repo_path}",
                    self.repo, self.branch
                )
            });
        info!(url = %shared, "report published");
        Ok(shared)
    }
}

pub fn commit_payload(repo_path: &str, branch: &str, bytes: &[u8]) -> Value {
    json!({
        "message": format!("Add design report {repo_path}"),
        "content": STANDARD.encode(bytes),
        "branch": branch
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn file_names_are_unique_and_timestamped() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).single().expect("time");
        let first = report_file_name(AnalysisKind::Design, now);
        let second = report_file_name(AnalysisKind::Design, now);
        assert!(first.starts_with("design-20260304T050607Z-"));
        assert!(first.ends_with(".png"));
        assert_eq!(first.len(), "design-20260304T050607Z-12345678.png".len());
        assert_ne!(first, second);
    }

    #[test]
    fn local_store_never_overwrites() {
        let dir = tempdir().expect("tempdir");
        let store = LocalStore::new(dir.path().join("nested"));
        let path = store.save(b"png", "a.png").expect("save");
        assert_eq!(fs::read(&path).expect("read"), b"png");

        let err = store.save(b"other", "a.png").expect_err("error");
        assert!(matches!(err, PublishError::Io { .. }));
        assert_eq!(fs::read(&path).expect("read"), b"png");
    }

    #[test]
    fn github_paths_and_payload() {
        let publisher = GitHubPublisher::new(
            Client::new(),
            RetryPolicy {
                max_retries: 0,
                backoff: Duration::ZERO,
            },
            "acme/design",
            "token",
            "main",
            "/reports/",
        );
        let repo_path = publisher.repo_path("x.png");
        assert_eq!(repo_path, "reports/x.png");
        assert_eq!(
            publisher.contents_url(&repo_path),
            "https://api.github.com/repos/acme/design/contents/reports/x.png"
        );

        let payload = commit_payload(&repo_path, "main", b"abc");
        assert_eq!(payload["content"], "YWJj");
        assert_eq!(payload["branch"], "main");
    }
}
