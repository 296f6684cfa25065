//! Client for the text-generation service.

use crate::config::GenerationConfig;
use crate::error::{AppError, Result};
use log;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const HEADER_API_KEY: &str = "x-goog-api-key";
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Anything that turns a prompt into generated text.
pub trait GenerationService {
    fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}

/// Blocking Gemini `generateContent` client.
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl GeminiClient {
    /// Builds a client using the API key from the environment variable named in `config`.
    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        let api_key = env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::Generation(format!(
                    "API key not found. Set the {} environment variable.",
                    config.api_key_env
                ))
            })?;
        Self::new(&api_key, &config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(AppError::Config(
                "Generation base URL must not be empty".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let mut key_header = HeaderValue::from_str(api_key.trim()).map_err(|_| {
            AppError::Generation("API key contains invalid header characters".to_string())
        })?;
        key_header.set_sensitive(true);
        headers.insert(HEADER_API_KEY, key_header);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Generation(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        let model = model.trim().trim_start_matches("models/");
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

impl GenerationService for GeminiClient {
    fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let endpoint = self.endpoint(model);
        log::info!(
            "Sending {} byte prompt to model {}...",
            prompt.len(),
            model
        );
        let response = self
            .client
            .post(&endpoint)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(AppError::Generation(format!(
                "Service returned {}: {}",
                status,
                truncate(&body, MAX_ERROR_BODY_CHARS)
            )));
        }
        log::debug!("Received {} byte response.", body.len());

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        parsed.text()
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> Result<String> {
        let Some(candidate) = self.candidates.first() else {
            let reason = self
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
                .unwrap_or("no candidates returned");
            return Err(AppError::Generation(format!(
                "Empty response from service: {}",
                reason
            )));
        };

        let text: String = candidate
            .content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            return Err(AppError::Generation(format!(
                "Response contained no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(text)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
