//! Insight generator backed by an OpenAI-compatible chat completions endpoint.
//!
//! One blocking `POST` per report, bounded by the configured timeout. There is no retry:
//! a slow or failing service only costs the report its commentary.

use std::time::Duration;

use reqwest::{blocking::Client, header};
use serde::{Deserialize, Serialize};

use crate::insight::{InsightError, InsightGenerator};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum HttpInsightError {
    #[display("failed to build HTTP client")]
    Client { source: reqwest::Error },
    #[display("request to insight endpoint failed")]
    Request { source: reqwest::Error },
    #[display("insight endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[display("malformed chat completions response")]
    Malformed { source: serde_json::Error },
    #[display("chat completions response has no text")]
    Empty,
}

impl From<HttpInsightError> for InsightError {
    fn from(err: HttpInsightError) -> Self {
        match err {
            HttpInsightError::Empty => Self::Empty,
            other => Self::backend(other),
        }
    }
}

const SYSTEM_PROMPT: &str = "You are an environmental advisor. Given a person's lifestyle \
     answers and their estimated annual carbon footprint, explain in a short paragraph which \
     habits contribute most and suggest two or three concrete changes.";

#[derive(Debug, Clone)]
pub struct HttpInsightConfig {
    /// Full URL of the chat completions endpoint
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug)]
pub struct HttpInsightGenerator {
    client: Client,
    config: HttpInsightConfig,
}

impl HttpInsightGenerator {
    pub fn new(config: HttpInsightConfig) -> Result<Self, HttpInsightError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .user_agent(concat!("footprint/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| HttpInsightError::Client { source })?;
        Ok(Self { client, config })
    }

    fn complete(&self, profile_summary: &str, annual_kg: f64) -> Result<String, HttpInsightError> {
        let prompt = user_prompt(profile_summary, annual_kg);
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        tracing::debug!(endpoint = %self.config.endpoint, model = %self.config.model, "requesting insight");
        let mut builder = self
            .client
            .post(&self.config.endpoint)
            .header(header::ACCEPT, "application/json")
            .json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .map_err(|source| HttpInsightError::Request { source })?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|source| HttpInsightError::Request { source })?;
        if !status.is_success() {
            return Err(HttpInsightError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        parse_completion(&body)
    }
}

/// User message sent alongside the system prompt.
#[must_use]
pub fn user_prompt(profile_summary: &str, annual_kg: f64) -> String {
    format!(
        "Lifestyle answers:\n{profile_summary}\nEstimated annual carbon footprint: {annual_kg:.2} kg CO2."
    )
}

/// Extracts the first choice's text from a chat completions response body.
pub fn parse_completion(body: &str) -> Result<String, HttpInsightError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|source| HttpInsightError::Malformed { source })?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
        .ok_or(HttpInsightError::Empty)
}

impl InsightGenerator for HttpInsightGenerator {
    fn summarize(&self, profile_summary: &str, annual_kg: f64) -> Result<String, InsightError> {
        Ok(self.complete(profile_summary, annual_kg)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion_takes_first_choice() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "  Drive less.  " } },
                { "index": 1, "message": { "role": "assistant", "content": "Fly less." } }
            ]
        }"#;
        assert_eq!(parse_completion(body).unwrap(), "Drive less.");
    }

    #[test]
    fn test_parse_completion_rejects_empty_text() {
        let empty = r#"{ "choices": [ { "message": { "content": "   " } } ] }"#;
        assert!(matches!(parse_completion(empty), Err(HttpInsightError::Empty)));
        let none = r#"{ "choices": [] }"#;
        assert!(matches!(parse_completion(none), Err(HttpInsightError::Empty)));
        let null = r#"{ "choices": [ { "message": { "content": null } } ] }"#;
        assert!(matches!(parse_completion(null), Err(HttpInsightError::Empty)));
    }

    #[test]
    fn test_parse_completion_rejects_malformed_body() {
        assert!(matches!(
            parse_completion("<html>bad gateway</html>"),
            Err(HttpInsightError::Malformed { .. })
        ));
    }

    #[test]
    fn test_empty_completion_maps_to_generic_empty() {
        assert!(matches!(
            InsightError::from(HttpInsightError::Empty),
            InsightError::Empty
        ));
        let status = InsightError::from(HttpInsightError::Status {
            status: 503,
            body: "overloaded".to_owned(),
        });
        assert_eq!(
            std::error::Error::source(&status).map(ToString::to_string),
            Some("insight endpoint returned HTTP 503: overloaded".to_owned())
        );
    }

    #[test]
    fn test_request_body_shape() {
        let prompt = user_prompt("Diet: Vegan\n", 1234.5);
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][1]["role"], "user");
        let content = value["messages"][1]["content"].as_str().unwrap();
        assert!(content.contains("Diet: Vegan"));
        assert!(content.contains("1234.50 kg"));
    }

    #[test]
    fn test_unreachable_endpoint_fails_without_panicking() {
        let generator = HttpInsightGenerator::new(HttpInsightConfig {
            endpoint: "http://127.0.0.1:9/v1/chat/completions".to_owned(),
            model: "test".to_owned(),
            api_key: None,
            timeout: Duration::from_millis(200),
        })
        .unwrap();
        let result = generator.summarize("Diet: Vegan\n", 100.0);
        let Err(InsightError::Backend { source }) = result else {
            panic!("expected a backend failure");
        };
        assert!(matches!(
            source.downcast_ref::<HttpInsightError>(),
            Some(HttpInsightError::Request { .. })
        ));
    }
}
