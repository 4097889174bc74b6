//! OpenAI Assistants API Client
//!
//! `AssistantService` over the Assistants v2 threads/messages/runs endpoints.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{AssistantService, RunHandle, RunState, RunStatus, ThreadHandle};
use crate::config::AssistantConfig;
use crate::constants::{assistant as assistant_constants, network};
use crate::types::{FileId, ForecastError, Result, classify_http_status};

/// OpenAI Assistants client with secure API key handling
pub struct OpenAiAssistant {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAssistant")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl OpenAiAssistant {
    pub fn new(config: &AssistantConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ForecastError::Auth(
                    "OpenAI API key not found. Set OPENAI_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(network::CONNECTION_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                ForecastError::ServiceUnavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("OpenAI-Beta", assistant_constants::BETA_HEADER)
    }

    /// Send a request and decode a successful JSON body
    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        builder: reqwest::RequestBuilder,
        operation: &str,
    ) -> Result<T> {
        let response = builder.send().await.map_err(|e| {
            ForecastError::ServiceUnavailable(format!("{} request failed: {}", operation, e))
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_status(
                status,
                &format!("{}: {}", operation, error_message(&body)),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            ForecastError::ServiceUnavailable(format!(
                "Failed to parse {} response: {}",
                operation, e
            ))
        })
    }
}

#[async_trait]
impl AssistantService for OpenAiAssistant {
    async fn create_thread(&self, label: &str) -> Result<ThreadHandle> {
        let body: IdObject = self
            .send(
                self.request(reqwest::Method::POST, "/threads")
                    .json(&serde_json::json!({})),
                "create thread",
            )
            .await?;

        info!("Created thread {}: {}", label, body.id);
        Ok(ThreadHandle {
            id: body.id,
            label: label.to_string(),
        })
    }

    async fn post_message(
        &self,
        thread: &ThreadHandle,
        text: &str,
        attachments: &[FileId],
    ) -> Result<()> {
        let request = CreateMessageRequest {
            role: "user",
            content: text,
            attachments: attachments
                .iter()
                .map(|id| Attachment {
                    file_id: id.as_str(),
                    tools: vec![ToolRef {
                        tool_type: "file_search",
                    }],
                })
                .collect(),
        };

        let _: IdObject = self
            .send(
                self.request(
                    reqwest::Method::POST,
                    &format!("/threads/{}/messages", thread.id),
                )
                .json(&request),
                "post message",
            )
            .await?;

        debug!(
            "Added message to thread {} ({} attachments)",
            thread.id,
            attachments.len()
        );
        Ok(())
    }

    async fn create_run(&self, thread: &ThreadHandle, assistant_id: &str) -> Result<RunHandle> {
        let body: IdObject = self
            .send(
                self.request(reqwest::Method::POST, &format!("/threads/{}/runs", thread.id))
                    .json(&serde_json::json!({ "assistant_id": assistant_id })),
                "create run",
            )
            .await?;

        info!("Started run {} on thread {}", body.id, thread.id);
        Ok(RunHandle {
            id: body.id,
            thread_id: thread.id.clone(),
        })
    }

    async fn run_state(&self, run: &RunHandle) -> Result<RunState> {
        let body: RunObject = self
            .send(
                self.request(
                    reqwest::Method::GET,
                    &format!("/threads/{}/runs/{}", run.thread_id, run.id),
                ),
                "get run",
            )
            .await?;

        Ok(RunState {
            status: body.status,
            last_error: body.last_error.map(|e| e.message),
        })
    }

    async fn latest_assistant_message(&self, thread: &ThreadHandle) -> Result<Option<String>> {
        let body: MessageList = self
            .send(
                self.request(
                    reqwest::Method::GET,
                    &format!(
                        "/threads/{}/messages?order=desc&limit={}",
                        thread.id,
                        assistant_constants::MESSAGE_PAGE_SIZE
                    ),
                ),
                "list messages",
            )
            .await?;

        Ok(body
            .data
            .into_iter()
            .find(|m| m.role == "assistant")
            .map(|m| m.text()))
    }

    async fn delete_thread(&self, thread: &ThreadHandle) -> Result<()> {
        let _: DeletedObject = self
            .send(
                self.request(reqwest::Method::DELETE, &format!("/threads/{}", thread.id)),
                "delete thread",
            )
            .await?;

        info!("Deleted thread {}", thread.id);
        Ok(())
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Pull `error.message` out of an API error body, falling back to the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

// Request/Response types

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<Attachment<'a>>,
}

#[derive(Debug, Serialize)]
struct Attachment<'a> {
    file_id: &'a str,
    tools: Vec<ToolRef>,
}

#[derive(Debug, Serialize)]
struct ToolRef {
    #[serde(rename = "type")]
    tool_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct IdObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DeletedObject {
    #[allow(dead_code)]
    deleted: bool,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    status: RunStatus,
    last_error: Option<RunError>,
}

#[derive(Debug, Deserialize)]
struct RunError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<MessageObject>,
}

#[derive(Debug, Deserialize)]
struct MessageObject {
    role: String,
    content: Vec<ContentPart>,
}

impl MessageObject {
    /// Concatenate all text parts, ignoring images and other content types
    fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.value.as_str()),
                ContentPart::Other => None,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text {
        text: TextValue,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> AssistantConfig {
        AssistantConfig {
            api_key: Some("sk-test".to_string()),
            api_base: "https://example.invalid/v1/".to_string(),
            ..AssistantConfig::default()
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = OpenAiAssistant::new(&config_with_key()).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("sk-test"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_url_strips_trailing_slash() {
        let client = OpenAiAssistant::new(&config_with_key()).unwrap();
        assert_eq!(
            client.url("/threads"),
            "https://example.invalid/v1/threads"
        );
    }

    #[test]
    fn test_message_serialization_with_attachments() {
        let ids = [FileId::new("file-1"), FileId::new("file-2")];
        let request = CreateMessageRequest {
            role: "user",
            content: "hello",
            attachments: ids
                .iter()
                .map(|id| Attachment {
                    file_id: id.as_str(),
                    tools: vec![ToolRef {
                        tool_type: "file_search",
                    }],
                })
                .collect(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["attachments"][1]["file_id"], "file-2");
        assert_eq!(json["attachments"][0]["tools"][0]["type"], "file_search");
    }

    #[test]
    fn test_message_serialization_omits_empty_attachments() {
        let request = CreateMessageRequest {
            role: "user",
            content: "hello",
            attachments: vec![],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("attachments").is_none());
    }

    #[test]
    fn test_latest_message_text_extraction() {
        let body = r#"{"data":[
            {"role":"assistant","content":[
                {"type":"text","text":{"value":"Aloha ","annotations":[]}},
                {"type":"image_file","image_file":{"file_id":"x"}},
                {"type":"text","text":{"value":"North Shore","annotations":[]}}
            ]},
            {"role":"user","content":[{"type":"text","text":{"value":"prompt"}}]}
        ]}"#;
        let list: MessageList = serde_json::from_str(body).unwrap();
        let reply = list.data.into_iter().find(|m| m.role == "assistant").unwrap();
        assert_eq!(reply.text(), "Aloha North Shore");
    }

    #[test]
    fn test_run_object_parsing() {
        let body = r#"{"id":"run_1","status":"failed","last_error":{"code":"server_error","message":"boom"}}"#;
        let run: RunObject = serde_json::from_str(body).unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.last_error.unwrap().message, "boom");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error":{"message":"Incorrect API key","type":"invalid_request_error"}}"#),
            "Incorrect API key"
        );
        assert_eq!(error_message("gateway down"), "gateway down");
    }

    #[test]
    fn test_empty_key_is_auth_error() {
        // an explicit empty key never falls through to OPENAI_API_KEY
        let config = AssistantConfig {
            api_key: Some(String::new()),
            ..AssistantConfig::default()
        };
        let result = OpenAiAssistant::new(&config);
        assert!(matches!(result, Err(ForecastError::Auth(_))));
    }
}
