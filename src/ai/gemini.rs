//! Gemini API client

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai::{
    prompts, AiBackend, Citation, RefactorSuggestion, SearchResult, SecurityAudit, Severity,
    Vulnerability,
};
use crate::core::config::{Config, GeminiModel};
use crate::core::credentials::CredentialStore;
use crate::error::{ForgeError, Result};

/// Gemini API base URL
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: GeminiModel,
    analysis_model: GeminiModel,
}

impl GeminiClient {
    /// Create a client from the stored key and configuration
    pub fn new() -> Result<Self> {
        let api_key = CredentialStore::require_gemini_key()?;
        let config = Config::load()?;
        Ok(Self::with_key(api_key, &config))
    }

    /// Create a client with an explicit key
    pub fn with_key(api_key: SecretString, config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: GEMINI_API_BASE.to_string(),
            api_key,
            model: config.gemini_model,
            analysis_model: config.analysis_model,
        }
    }

    /// Get the current model name
    pub fn model_name(&self) -> &str {
        self.model.display_name()
    }

    async fn generate(&self, model: GeminiModel, request: &GeminiRequest) -> Result<GeminiResponse> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url,
            model.api_name(),
            self.api_key.expose_secret()
        );

        tracing::debug!(model = model.api_name(), "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ForgeError::Network(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ForgeError::GeminiApi(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ForgeError::GeminiApi(format!("Failed to parse response: {}", e)))
    }

    /// Request a JSON answer constrained by `schema`
    async fn generate_json(&self, model: GeminiModel, prompt: String, schema: Value) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![Content::user(prompt)],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.4),
                max_output_tokens: Some(8192),
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema),
            }),
            tools: None,
        };

        let response = self.generate(model, &request).await?;
        first_candidate_text(&response)
    }
}

#[async_trait]
impl AiBackend for GeminiClient {
    async fn suggest_refactor(&self, code: &str) -> Result<RefactorSuggestion> {
        let text = self
            .generate_json(self.model, prompts::refactor_prompt(code), prompts::refactor_schema())
            .await?;
        parse_refactor(&text)
    }

    async fn audit_security(&self, file_name: &str, content: &str) -> Result<SecurityAudit> {
        let text = self
            .generate_json(
                self.analysis_model,
                prompts::security_audit_prompt(file_name, content),
                prompts::security_audit_schema(),
            )
            .await?;
        parse_audit(&text)
    }

    async fn search(&self, query: &str) -> Result<SearchResult> {
        let request = GeminiRequest {
            contents: vec![Content::user(query.to_string())],
            generation_config: None,
            tools: Some(vec![Tool {
                google_search: serde_json::Map::new(),
            }]),
        };

        let response = self.generate(self.analysis_model, &request).await?;
        let synthesis = first_candidate_text(&response)?;
        let citations = response
            .candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| citations_from_chunks(&m.grounding_chunks))
            .unwrap_or_default();

        Ok(SearchResult {
            synthesis,
            citations,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Concatenated text parts of the first candidate
fn first_candidate_text(response: &GeminiResponse) -> Result<String> {
    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| ForgeError::GeminiApi("Empty response from API".to_string()))?;

    let text: String = candidate
        .content
        .as_ref()
        .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ForgeError::GeminiApi("Empty response from API".to_string()));
    }
    Ok(text)
}

fn citations_from_chunks(chunks: &[GroundingChunk]) -> Vec<Citation> {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let web = chunk.web.as_ref();
            Citation {
                id: format!("[{}]", i + 1),
                title: web
                    .and_then(|w| w.title.clone())
                    .unwrap_or_else(|| "External Source".to_string()),
                url: web
                    .and_then(|w| w.uri.clone())
                    .unwrap_or_else(|| "#".to_string()),
            }
        })
        .collect()
}

/// Extract JSON content from a response (handles markdown code blocks)
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```") {
        let rest = &trimmed[start + 3..];
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        let body = rest.find("```").map(|end| &rest[..end]).unwrap_or(rest).trim();
        if body.starts_with('{') {
            return body;
        }
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => &trimmed[start..=end],
        _ => trimmed,
    }
}

fn parse_refactor(text: &str) -> Result<RefactorSuggestion> {
    serde_json::from_str(extract_json(text)).map_err(|e| {
        ForgeError::GeminiApi(format!(
            "Failed to parse refactor suggestion ({}). Preview: {}",
            e,
            preview(text)
        ))
    })
}

fn parse_audit(text: &str) -> Result<SecurityAudit> {
    let raw: RawAudit = serde_json::from_str(extract_json(text)).map_err(|e| {
        ForgeError::GeminiApi(format!(
            "Failed to parse security audit ({}). Preview: {}",
            e,
            preview(text)
        ))
    })?;

    let vulnerabilities = raw
        .vulnerabilities
        .into_iter()
        .map(|v| Vulnerability {
            line: v.line.map(|n| n.max(0.0) as u32).unwrap_or(0),
            kind: v.kind.unwrap_or_else(|| "Unknown".to_string()),
            severity: v.severity.as_deref().map(Severity::parse).unwrap_or_default(),
            description: v.description.unwrap_or_default(),
            fix: v.fix.unwrap_or_default(),
        })
        .collect();

    Ok(SecurityAudit { vulnerabilities })
}

fn preview(text: &str) -> String {
    text.chars().take(120).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Gemini API Request/Response types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(text: String) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part { text: Some(text) }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAudit {
    #[serde(default)]
    vulnerabilities: Vec<RawVulnerability>,
}

#[derive(Debug, Deserialize)]
struct RawVulnerability {
    line: Option<f64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    severity: Option<String>,
    description: Option<String>,
    fix: Option<String>,
}
