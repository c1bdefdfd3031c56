use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::TranslateError;
use super::prompt::SchemaPrompt;
use super::Translator;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-pro";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
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

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Blocking client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model: String,
    http: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            http: reqwest::blocking::Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl Translator for GeminiClient {
    fn translate(&self, question: &str, prompt: &SchemaPrompt) -> Result<String, TranslateError> {
        if self.api_key.is_empty() {
            return Err(TranslateError::MissingApiKey);
        }

        let body = request_body(prompt.text(), question);
        info!(model = %self.model, question, "requesting SQL from translator");

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()?;

        let status = response.status();
        let payload = response.text()?;
        if !status.is_success() {
            return Err(TranslateError::Api {
                status: status.as_u16(),
                message: api_error_message(&payload),
            });
        }

        let text = parse_response(&payload)?;
        debug!(response = %text, "translator answered");
        Ok(text)
    }
}

fn request_body<'a>(prompt: &'a str, question: &'a str) -> GenerateRequest<'a> {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt }, Part { text: question }],
        }],
    }
}

fn parse_response(payload: &str) -> Result<String, TranslateError> {
    let response: GenerateResponse = serde_json::from_str(payload)?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(TranslateError::EmptyResponse);
    }
    Ok(text)
}

fn api_error_message(payload: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(payload)
        .map(|body| body.error.message)
        .unwrap_or_else(|_| payload.trim().to_string())
}
