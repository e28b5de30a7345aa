//! Chat-completion outline generator.
//!
//! Sends the segmented document to an OpenAI-compatible chat completions
//! endpoint and returns the model's reply as parsed JSON. The reply is
//! treated as untrusted; shaping it into slide specs happens downstream.

use deck_core::{DocumentTree, Error, OutlineGenerator, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write as FmtWrite;
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You are a helpful presentation creation assistant.";

/// Configuration for the chat-completion generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl GeneratorConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            max_tokens: 4000,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            timeout_secs: 120,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Outline generator backed by an OpenAI-compatible API.
pub struct OpenAiGenerator {
    client: reqwest::blocking::Client,
    config: GeneratorConfig,
}

impl OpenAiGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::GenerationError(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageContent,
}

#[derive(Debug, Deserialize)]
struct ChatMessageContent {
    content: String,
}

impl OutlineGenerator for OpenAiGenerator {
    fn generate(&self, document: &DocumentTree) -> Result<Value> {
        let prompt = build_prompt(document);
        log::debug!(
            "Requesting outline from {} ({} prompt chars)",
            self.config.model,
            prompt.len()
        );

        let body = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| Error::GenerationError(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().unwrap_or_default();
            return Err(Error::GenerationError(format!("HTTP {}: {}", status, text)));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| Error::GenerationError(format!("unexpected response shape: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::GenerationError("response contained no choices".to_string()))?;

        let stripped = strip_code_fences(&content);
        if stripped.is_empty() {
            return Err(Error::GenerationError(
                "model returned empty content".to_string(),
            ));
        }

        serde_json::from_str(stripped)
            .map_err(|e| Error::OutlineFormatError(format!("reply is not valid JSON: {}", e)))
    }
}

/// Build the outline request prompt from a segmented document.
fn build_prompt(document: &DocumentTree) -> String {
    let mut sections_text = String::new();
    for section in &document.sections {
        let _ = write!(
            sections_text,
            "\nSection: {}\nContent:\n{}\n",
            section.heading.text,
            section.paragraphs.join("\n")
        );
    }

    format!(
        "Create a complete presentation outline from the following document content. \
         For each section, create a section slide followed by content slides summarizing \
         the section's content as bullet points. Do not limit the number of slides; \
         generate as many slides as necessary based on the document content. \
         Format the response as a JSON object with these keys:\n\
         - presentation_title: The document title\n\
         - presentation_subtitle: Optional subtitle\n\
         - slides: Array of slide objects containing:\n\
         \x20 - slide_type: One of 'title', 'section', or 'content'\n\
         \x20 - title: Slide title\n\
         \x20 - subtitle: Optional subtitle (for title slides)\n\
         \x20 - bullets: Array of bullet points summarizing the section content (for content slides)\n\
         \x20 - notes: Optional speaker notes\n\n\
         Document Title: {}\n\
         Document Content:{}",
        document.title, sections_text
    )
}

/// Strip a surrounding markdown code fence from a model reply.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();

    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };

    match inner.trim_end().strip_suffix("```") {
        Some(rest) => rest.trim(),
        None => inner.trim(),
    }
}

/// Generator that returns a fixed value, for tests and offline runs.
pub struct StaticOutlineGenerator {
    pub value: Value,
}

impl OutlineGenerator for StaticOutlineGenerator {
    fn generate(&self, _document: &DocumentTree) -> Result<Value> {
        Ok(self.value.clone())
    }
}
