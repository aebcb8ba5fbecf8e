use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::InferenceConfig;

const FIXED_CODE_START: &str = "### FIXED_CODE_BLOCK";
const FIXED_CODE_END: &str = "### END_BLOCK";

const SYSTEM_PROMPT: &str = "Review code for correctness, security and performance. \
Format: Suggestions first, then FULL CORRECTED CODE between ### FIXED_CODE_BLOCK \
and ### END_BLOCK.";

/// Client for the external review model. Behind a trait so tests and the fake
/// app state can stub the network call.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Submits the code for review and returns the model's raw reply text.
    async fn review_code(&self, code: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Talks to an OpenAI-style chat-completion endpoint over HTTPS.
pub struct HttpInferenceClient {
    client: Client,
    config: InferenceConfig,
}

impl HttpInferenceClient {
    pub fn new(config: InferenceConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("build inference http client")?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn review_code(&self, code: &str) -> anyhow::Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: code,
                },
            ],
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_token)
            .json(&request)
            .send()
            .await
            .context("inference request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("inference endpoint returned {}", status));
        }

        let body: ChatResponse = response
            .json()
            .await
            .context("decode inference response")?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow!("inference response had no choices"))?;

        debug!(model = %self.config.model, reply_len = content.len(), "inference reply received");
        Ok(content)
    }
}

/// Splits the model reply into the narrative review and the corrected code.
///
/// The corrected code is the substring between the fixed delimiter pair, with
/// markdown fence markers stripped; the review is everything before the first
/// delimiter. A reply without the delimiter pair is all review.
pub fn parse_reply(full_text: &str) -> (String, String) {
    lazy_static! {
        static ref FENCE_RE: Regex = Regex::new(r"```[a-zA-Z]*").unwrap();
    }

    let block = full_text.find(FIXED_CODE_START).and_then(|start| {
        let body_start = start + FIXED_CODE_START.len();
        full_text[body_start..]
            .find(FIXED_CODE_END)
            .map(|end| (start, &full_text[body_start..body_start + end]))
    });

    match block {
        Some((start, body)) => {
            let review = full_text[..start].trim().to_string();
            let fixed = FENCE_RE.replace_all(body, "").trim().to_string();
            (review, fixed)
        }
        None => (full_text.trim().to_string(), String::new()),
    }
}
