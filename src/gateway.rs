//! Vision model access. The rest of the crate only sees [`ModelGateway`].

use crate::error::GatewayError;
use crate::fetch::FetchedContent;
use crate::http::{RetryPolicy, send_with_retries, truncate_body};
use reqwest::blocking::Client;
use serde_json::{Value, json};
use tracing::info;

pub trait ModelGateway {
    /// Runs `prompt` against the attached images and PDFs and returns the
    /// model's raw text.
    fn complete(
        &self,
        prompt: &str,
        attachments: &[FetchedContent],
    ) -> Result<String, GatewayError>;
}

pub struct OpenAiGateway {
    http: Client,
    retry: RetryPolicy,
    api_base: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl OpenAiGateway {
    pub fn new(
        http: Client,
        retry: RetryPolicy,
        api_base: &str,
        api_key: Option<String>,
        model: &str,
        max_tokens: u32,
    ) -> Self {
        Self {
            http,
            retry,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            max_tokens,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

impl ModelGateway for OpenAiGateway {
    fn complete(
        &self,
        prompt: &str,
        attachments: &[FetchedContent],
    ) -> Result<String, GatewayError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(GatewayError::MissingCredential);
        };

        let payload = chat_payload(&self.model, self.max_tokens, prompt, attachments);
        let endpoint = self.endpoint();
        let response = send_with_retries(&self.retry, "model", || {
            self.http.post(&endpoint).bearer_auth(api_key).json(&payload)
        })
        .map_err(|err| GatewayError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| GatewayError::Transport(format!("failed reading response: {err}")))?;
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: truncate_body(&body, 512),
            });
        }

        let parsed: Value =
            serde_json::from_str(&body).map_err(|err| GatewayError::Decode(err.to_string()))?;
        let text = extract_text(&parsed)?;
        info!(model = %self.model, chars = text.len(), "model responded");
        Ok(text)
    }
}

pub fn chat_payload(
    model: &str,
    max_tokens: u32,
    prompt: &str,
    attachments: &[FetchedContent],
) -> Value {
    let mut content = vec![json!({"type": "text", "text": prompt})];
    content.extend(attachments.iter().map(attachment_part));
    json!({
        "model": model,
        "max_tokens": max_tokens,
        "messages": [{
            "role": "user",
            "content": content
        }]
    })
}

/// PDFs travel as `file` parts; `image_url` only accepts images.
fn attachment_part(attachment: &FetchedContent) -> Value {
    if attachment.is_pdf() {
        json!({
            "type": "file",
            "file": {
                "filename": attachment.file_name(),
                "file_data": attachment.data_url()
            }
        })
    } else {
        json!({
            "type": "image_url",
            "image_url": {"url": attachment.data_url()}
        })
    }
}

/// `choices[0].message.content`, as a plain string or a list of text parts.
pub fn extract_text(payload: &Value) -> Result<String, GatewayError> {
    let content = payload
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .ok_or_else(|| GatewayError::Decode("missing choices[0].message.content".to_string()))?;

    let text = match content {
        Value::String(text) => text.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Null => String::new(),
        other => {
            return Err(GatewayError::Decode(format!(
                "unexpected content type: {other}"
            )));
        }
    };

    if text.trim().is_empty() {
        return Err(GatewayError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn attachment(url: &str, mime_type: &str, bytes: &[u8]) -> FetchedContent {
        FetchedContent {
            url: url.to_string(),
            mime_type: mime_type.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn payload_carries_prompt_and_images() {
        let payload = chat_payload(
            "gpt-4o",
            1000,
            "rate this",
            &[attachment("https://example.com/a.png", "image/png", &[0, 0, 0])],
        );
        assert_eq!(payload["model"], "gpt-4o");
        assert_eq!(payload["max_tokens"], 1000);
        let content = payload["messages"][0]["content"]
            .as_array()
            .expect("content array");
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["text"], "rate this");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,AAAA");
    }

    #[test]
    fn pdf_attachments_become_file_parts() {
        let payload = chat_payload(
            "gpt-4o",
            1000,
            "rate this deck",
            &[
                attachment(
                    "https://docs.google.com/presentation/d/1A2b3C4d5E6f7G8h9I0j/export/pdf",
                    "application/pdf",
                    b"%PDF-1.4",
                ),
                attachment("https://example.com/brand.jpg", "image/jpeg", b"abc"),
            ],
        );
        let content = payload["messages"][0]["content"]
            .as_array()
            .expect("content array");
        assert_eq!(content[1]["type"], "file");
        assert!(content[1].get("image_url").is_none());
        assert_eq!(content[1]["file"]["filename"], "attachment.pdf");
        assert_eq!(
            content[1]["file"]["file_data"],
            "data:application/pdf;base64,JVBERi0xLjQ="
        );
        assert_eq!(content[2]["type"], "image_url");
        assert_eq!(content[2]["image_url"]["url"], "data:image/jpeg;base64,YWJj");
    }

    #[test]
    fn extracts_string_and_part_content() {
        let payload = json!({"choices": [{"message": {"content": "Clarity: 9/10"}}]});
        assert_eq!(extract_text(&payload).expect("text"), "Clarity: 9/10");

        let payload = json!({"choices": [{"message": {"content": [
            {"type": "text", "text": "Clarity: 9/10"},
            {"type": "text", "text": "Creativity: 6/10"}
        ]}}]});
        assert_eq!(
            extract_text(&payload).expect("text"),
            "Clarity: 9/10\nCreativity: 6/10"
        );
    }

    #[test]
    fn empty_and_missing_content_fail() {
        let payload = json!({"choices": [{"message": {"content": "   "}}]});
        assert!(matches!(extract_text(&payload), Err(GatewayError::EmptyResponse)));

        let payload = json!({"choices": []});
        assert!(matches!(extract_text(&payload), Err(GatewayError::Decode(_))));
    }

    #[test]
    fn missing_credential_fails_before_network() {
        let gateway = OpenAiGateway::new(
            Client::new(),
            RetryPolicy {
                max_retries: 0,
                backoff: Duration::ZERO,
            },
            "https://api.openai.com/v1/",
            None,
            "gpt-4o",
            1000,
        );
        assert_eq!(gateway.endpoint(), "https://api.openai.com/v1/chat/completions");
        let err = gateway.complete("prompt", &[]).expect_err("error");
        assert!(matches!(err, GatewayError::MissingCredential));
    }
}
