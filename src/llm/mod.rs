// Generation collaborator: Anthropic Messages API client.
//
// Failures here propagate unchanged to the caller; retry policy is the
// caller's decision.
pub mod prompt;

use crate::config::GenerationConfig;
use crate::context::ContextBundle;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

pub struct Generator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl Generator {
    pub fn new(config: &GenerationConfig, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    /// Generate recipe recommendations for an assembled context bundle.
    pub async fn recommend(&self, bundle: &ContextBundle) -> Result<String> {
        let prompt = prompt::build_prompt(bundle);
        debug!(model = %self.model, prompt_chars = prompt.len(), "requesting generation");
        self.complete(&prompt).await
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(Error::Generation(format!(
                "upstream returned {status}: {snippet}"
            )));
        }

        let parsed: MessagesResponse = response.json().await?;
        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text)
            .ok_or_else(|| Error::Generation("response contained no text block".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;

    fn generator(base_url: &str) -> Generator {
        let config = GenerationConfig {
            api_key: None,
            base_url: base_url.to_string(),
            model: "claude-3-5-haiku-20241022".to_string(),
            max_tokens: 256,
        };
        Generator::new(&config, "test-key")
    }

    #[tokio::test]
    async fn test_complete_extracts_text_block() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content":[{"type":"text","text":"Try the garlic chicken."}]}"#)
            .create_async()
            .await;

        let result = generator(&server.url())
            .complete("what can I cook?")
            .await
            .unwrap();
        assert_eq!(result, "Try the garlic chicken.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_surfaces_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(429)
            .with_body(r#"{"error":{"type":"rate_limit_error"}}"#)
            .create_async()
            .await;

        let err = generator(&server.url())
            .complete("what can I cook?")
            .await
            .unwrap_err();
        match err {
            Error::Generation(msg) => assert!(msg.contains("429")),
            other => panic!("expected Generation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_rejects_missing_text_block() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content":[]}"#)
            .create_async()
            .await;

        let err = generator(&server.url())
            .complete("what can I cook?")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }
}
