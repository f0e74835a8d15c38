use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{GenerationError, Result};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Anything that turns a prompt into one text blob.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_output_tokens: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(GeminiClient {
            http,
            api_key: settings.gemini_api_key()?.to_string(),
            model: settings.gemini_model.clone(),
            max_output_tokens: settings.max_output_tokens,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", API_BASE, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
            },
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "sending prompt");
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Api {
                service: "gemini",
                status: status.as_u16(),
                body: raw,
            });
        }

        let text = first_candidate_text(&raw)?;
        info!(model = %self.model, chars = text.len(), "received generation");
        Ok(text)
    }
}

/// Text of the first part of the first candidate, trimmed.
fn first_candidate_text(raw: &str) -> Result<String> {
    let parsed: GenerateResponse = serde_json::from_str(raw)?;
    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .map(|p| p.text.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(GenerationError::EmptyResponse("gemini"))
}
