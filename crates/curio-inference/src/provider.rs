//! Classification provider backends.
//!
//! Each backend exposes the same `complete(request) -> Result<String>`
//! surface; the classifier walks an ordered list of them until one
//! succeeds or all fail. Credential resolution (including migration of
//! the deprecated single-credential configuration) happens in
//! [`resolve_providers`], so the orchestration never special-cases a
//! provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use curio_core::{defaults, AiSettings, Error, Result};

// ---------------------------------------------------------------------------
// Provider identity
// ---------------------------------------------------------------------------

/// Identity of a classification provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl ProviderKind {
    /// Human-facing label used in failure reasons.
    pub fn label(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Gemini => "Gemini",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

// ---------------------------------------------------------------------------
// Endpoint configuration
// ---------------------------------------------------------------------------

/// Endpoint and model configuration shared by all provider backends.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub openai_base_url: String,
    pub openai_model: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    /// Per-request timeout applied to every provider call.
    pub timeout: Duration,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            openai_base_url: defaults::OPENAI_URL.to_string(),
            openai_model: defaults::OPENAI_GEN_MODEL.to_string(),
            gemini_base_url: defaults::GEMINI_URL.to_string(),
            gemini_model: defaults::GEMINI_GEN_MODEL.to_string(),
            timeout: Duration::from_secs(defaults::PROVIDER_TIMEOUT_SECS),
        }
    }
}

impl ProviderEndpoints {
    /// Build endpoint config from environment variables (with defaults).
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `CURIO_OPENAI_BASE_URL` | `https://api.openai.com/v1` |
    /// | `CURIO_OPENAI_MODEL` | `gpt-4o-mini` |
    /// | `CURIO_GEMINI_BASE_URL` | `https://generativelanguage.googleapis.com` |
    /// | `CURIO_GEMINI_MODEL` | `gemini-1.5-flash` |
    /// | `CURIO_PROVIDER_TIMEOUT_SECS` | `30` |
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            openai_base_url: std::env::var("CURIO_OPENAI_BASE_URL")
                .unwrap_or(base.openai_base_url),
            openai_model: std::env::var("CURIO_OPENAI_MODEL").unwrap_or(base.openai_model),
            gemini_base_url: std::env::var("CURIO_GEMINI_BASE_URL")
                .unwrap_or(base.gemini_base_url),
            gemini_model: std::env::var("CURIO_GEMINI_MODEL").unwrap_or(base.gemini_model),
            timeout: std::env::var("CURIO_PROVIDER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(base.timeout),
        }
    }

    pub fn with_openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.openai_base_url = url.into();
        self
    }

    pub fn with_gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.gemini_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// One completion request, provider-agnostic.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub max_tokens: u32,
}

/// Uniform surface over the remote classification providers.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Run one completion and return the raw response text.
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String>;
}

fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
}

async fn error_for_status(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Error::ProviderRequest(format!("API error: {} - {}", status, body))
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// OpenAI-compatible chat-completions backend.
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>, endpoints: &ProviderEndpoints) -> Result<Self> {
        Ok(Self {
            client: build_client(endpoints.timeout)?,
            base_url: endpoints.openai_base_url.trim_end_matches('/').to_string(),
            model: endpoints.openai_model.clone(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String> {
        debug!(
            provider = %self.kind(),
            model = %self.model,
            prompt_len = request.prompt.len(),
            "sending completion request"
        );

        let mut messages = Vec::with_capacity(2);
        if !request.system.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: request.system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt.to_string(),
        });

        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: 0.0,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::ProviderResponse(format!("malformed completion body: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::ProviderResponse("response carried no choices".to_string()))?;

        Ok(content.trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// Gemini-compatible backend
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    parts: Vec<GeminiPart>,
}

/// Gemini-compatible generate-content backend.
///
/// This API has no separate system role; the system text is carried by
/// the prompt instructions instead.
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, endpoints: &ProviderEndpoints) -> Result<Self> {
        Ok(Self {
            client: build_client(endpoints.timeout)?,
            base_url: endpoints.gemini_base_url.trim_end_matches('/').to_string(),
            model: endpoints.gemini_model.clone(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String> {
        debug!(
            provider = %self.kind(),
            model = %self.model,
            prompt_len = request.prompt.len(),
            "sending completion request"
        );

        let body = GenerateContentRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: request.prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: request.max_tokens,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::ProviderResponse(format!("malformed generation body: {}", e)))?;

        let content = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| Error::ProviderResponse("response carried no candidates".to_string()))?;

        Ok(content.trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// Credential resolution
// ---------------------------------------------------------------------------

fn configured(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Resolve settings into the ordered provider strategy list.
///
/// Priority is OpenAI, then Gemini. The deprecated single-credential
/// `{legacy_provider, legacy_api_key}` pair is honored only when
/// neither dedicated key is configured, and is migrated into the
/// matching backend — an unknown legacy provider flag falls back to
/// OpenAI, as the original settings surface did. An empty result means
/// no credential is configured anywhere.
pub fn resolve_providers(
    settings: &AiSettings,
    endpoints: &ProviderEndpoints,
) -> Result<Vec<Box<dyn ChatProvider>>> {
    let mut openai_key = configured(&settings.openai_api_key);
    let mut gemini_key = configured(&settings.gemini_api_key);

    if openai_key.is_none() && gemini_key.is_none() {
        if let Some(legacy_key) = configured(&settings.legacy_api_key) {
            match settings.legacy_provider.as_deref() {
                Some("gemini") => gemini_key = Some(legacy_key),
                _ => openai_key = Some(legacy_key),
            }
            debug!(
                provider = settings.legacy_provider.as_deref().unwrap_or("openai"),
                "migrated legacy credential configuration"
            );
        }
    }

    let mut providers: Vec<Box<dyn ChatProvider>> = Vec::new();
    if let Some(key) = openai_key {
        providers.push(Box::new(OpenAiProvider::new(key, endpoints)?));
    }
    if let Some(key) = gemini_key {
        providers.push(Box::new(GeminiProvider::new(key, endpoints)?));
    }

    Ok(providers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_labels() {
        assert_eq!(ProviderKind::OpenAi.label(), "OpenAI");
        assert_eq!(ProviderKind::Gemini.label(), "Gemini");
        assert_eq!(ProviderKind::OpenAi.to_string(), "openai");
    }

    #[test]
    fn test_endpoints_default() {
        let endpoints = ProviderEndpoints::default();
        assert_eq!(endpoints.openai_base_url, defaults::OPENAI_URL);
        assert_eq!(endpoints.timeout.as_secs(), defaults::PROVIDER_TIMEOUT_SECS);
    }

    #[test]
    fn test_endpoints_builders() {
        let endpoints = ProviderEndpoints::default()
            .with_openai_base_url("http://localhost:9000/v1")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(endpoints.openai_base_url, "http://localhost:9000/v1");
        assert_eq!(endpoints.timeout.as_secs(), 5);
    }

    fn kinds(providers: &[Box<dyn ChatProvider>]) -> Vec<ProviderKind> {
        providers.iter().map(|p| p.kind()).collect()
    }

    #[test]
    fn test_resolution_order_openai_first() {
        let settings = AiSettings::default()
            .with_openai_key("sk-a")
            .with_gemini_key("g-b");
        let providers = resolve_providers(&settings, &ProviderEndpoints::default()).unwrap();
        assert_eq!(kinds(&providers), vec![ProviderKind::OpenAi, ProviderKind::Gemini]);
    }

    #[test]
    fn test_resolution_gemini_only() {
        let settings = AiSettings::default().with_gemini_key("g-b");
        let providers = resolve_providers(&settings, &ProviderEndpoints::default()).unwrap();
        assert_eq!(kinds(&providers), vec![ProviderKind::Gemini]);
    }

    #[test]
    fn test_resolution_empty_without_credentials() {
        let providers =
            resolve_providers(&AiSettings::default(), &ProviderEndpoints::default()).unwrap();
        assert!(providers.is_empty());
    }

    #[test]
    fn test_blank_keys_are_unconfigured() {
        let settings = AiSettings::default().with_openai_key("   ");
        let providers = resolve_providers(&settings, &ProviderEndpoints::default()).unwrap();
        assert!(providers.is_empty());
    }

    #[test]
    fn test_legacy_migrates_to_flagged_provider() {
        let settings = AiSettings::default().with_legacy("gemini", "legacy-key");
        let providers = resolve_providers(&settings, &ProviderEndpoints::default()).unwrap();
        assert_eq!(kinds(&providers), vec![ProviderKind::Gemini]);
    }

    #[test]
    fn test_legacy_unknown_flag_defaults_to_openai() {
        let settings = AiSettings::default().with_legacy("watson", "legacy-key");
        let providers = resolve_providers(&settings, &ProviderEndpoints::default()).unwrap();
        assert_eq!(kinds(&providers), vec![ProviderKind::OpenAi]);
    }

    #[test]
    fn test_dedicated_keys_shadow_legacy() {
        let settings = AiSettings::default()
            .with_openai_key("sk-a")
            .with_legacy("gemini", "legacy-key");
        let providers = resolve_providers(&settings, &ProviderEndpoints::default()).unwrap();
        assert_eq!(kinds(&providers), vec![ProviderKind::OpenAi]);
    }
}
