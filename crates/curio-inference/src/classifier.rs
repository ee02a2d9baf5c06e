//! Classification orchestration across the provider strategy list.

use std::sync::Arc;

use tracing::{debug, info, warn};

use curio_core::usage::CategoryUsage;
use curio_core::{
    defaults, AiSettings, CategorizationOutcome, ContentRecord, Error, ReorgRequest,
    ReorgSuggestions, Result,
};

use crate::parse::{parse_category_list, parse_reorg_suggestions};
use crate::prompt::{
    classification_prompt, reorg_prompt, CLASSIFICATION_SYSTEM_PROMPT, REORG_SYSTEM_PROMPT,
};
use crate::provider::{resolve_providers, ChatProvider, CompletionRequest, ProviderEndpoints};
use crate::ratelimit::RateLimiter;

/// Stateless-per-call classification client over an ordered provider
/// list.
///
/// Rebuilt from settings at the start of every drain cycle so credential
/// changes take effect without a restart; the rate limiter is shared
/// across rebuilds and charges **one slot per network request actually
/// made**, fallback attempts included.
pub struct Classifier {
    providers: Vec<Box<dyn ChatProvider>>,
    limiter: Arc<RateLimiter>,
}

impl Classifier {
    /// Build the provider strategy list from settings.
    pub fn from_settings(
        settings: &AiSettings,
        endpoints: &ProviderEndpoints,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self> {
        let providers = resolve_providers(settings, endpoints)?;
        Ok(Self::with_providers(providers, limiter))
    }

    /// Build a classifier over an explicit provider list.
    pub fn with_providers(providers: Vec<Box<dyn ChatProvider>>, limiter: Arc<RateLimiter>) -> Self {
        Self { providers, limiter }
    }

    /// Whether any credential resolved to a usable provider.
    pub fn is_configured(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Categorize one record.
    ///
    /// Never fails: provider, network, and parse errors are converted
    /// into an `Uncategorized` outcome with a failure reason. With no
    /// provider configured the call returns immediately — no rate-limit
    /// slot is consumed and no network I/O happens.
    pub async fn classify(
        &self,
        record: &ContentRecord,
        existing: &[CategoryUsage],
    ) -> CategorizationOutcome {
        if self.providers.is_empty() {
            warn!(record_id = %record.id, "no API key configured for categorization");
            return CategorizationOutcome::uncategorized(Error::NoCredential.to_string());
        }

        let prompt = classification_prompt(record, existing);
        let request = CompletionRequest {
            system: CLASSIFICATION_SYSTEM_PROMPT,
            prompt: &prompt,
            max_tokens: defaults::GEN_MAX_TOKENS,
        };

        let mut attempted = 0usize;
        let mut last_failure: Option<(&'static str, Error)> = None;

        for provider in &self.providers {
            self.limiter.wait_for_slot().await;
            attempted += 1;

            let raw = match provider.complete(&request).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(
                        record_id = %record.id,
                        provider = %provider.kind(),
                        error = %e,
                        "classification request failed"
                    );
                    last_failure = Some((provider.kind().label(), e));
                    continue;
                }
            };

            match parse_category_list(&raw) {
                Ok(categories) => {
                    debug!(
                        record_id = %record.id,
                        provider = %provider.kind(),
                        categories = ?categories,
                        "record classified"
                    );
                    return CategorizationOutcome::success(categories);
                }
                Err(e) => {
                    warn!(
                        record_id = %record.id,
                        provider = %provider.kind(),
                        error = %e,
                        "classification response unparseable"
                    );
                    last_failure = Some((provider.kind().label(), e));
                }
            }
        }

        match last_failure {
            Some((_, err)) if attempted > 1 => {
                CategorizationOutcome::uncategorized(format!("Both AI providers failed: {}", err))
            }
            Some((label, err)) => {
                CategorizationOutcome::uncategorized(format!("{} failed: {}", label, err))
            }
            // Unreachable with a non-empty provider list; kept total.
            None => CategorizationOutcome::uncategorized(Error::NoCredential.to_string()),
        }
    }

    /// Ask the provider chain for category reorg mappings.
    ///
    /// Unlike `classify`, this is a user-initiated foreground call: it
    /// returns `Err` and lets the invoking surface report the failure.
    /// Returned mappings are raw proposals; shape filtering happens at
    /// apply time.
    pub async fn suggest_reorg(&self, request: &ReorgRequest) -> Result<ReorgSuggestions> {
        if self.providers.is_empty() {
            return Err(Error::NoCredential);
        }

        let prompt = reorg_prompt(request);
        let completion = CompletionRequest {
            system: REORG_SYSTEM_PROMPT,
            prompt: &prompt,
            max_tokens: defaults::REORG_MAX_TOKENS,
        };

        let mut last_failure: Option<Error> = None;
        for provider in &self.providers {
            self.limiter.wait_for_slot().await;

            match provider.complete(&completion).await {
                Ok(raw) => match parse_reorg_suggestions(&raw) {
                    Ok(suggestions) => {
                        info!(
                            provider = %provider.kind(),
                            result_count = suggestions.suggestions.len(),
                            "reorg suggestions received"
                        );
                        return Ok(suggestions);
                    }
                    Err(e) => {
                        warn!(provider = %provider.kind(), error = %e, "reorg response unparseable");
                        last_failure = Some(e);
                    }
                },
                Err(e) => {
                    warn!(provider = %provider.kind(), error = %e, "reorg request failed");
                    last_failure = Some(e);
                }
            }
        }

        Err(last_failure.unwrap_or(Error::NoCredential))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderKind;
    use async_trait::async_trait;
    use curio_core::{InteractionType, Platform, ReorgAction, UNCATEGORIZED};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted provider returning canned results in order.
    struct ScriptedProvider {
        kind: ProviderKind,
        responses: Mutex<Vec<Result<String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(kind: ProviderKind, responses: Vec<Result<String>>) -> Self {
            Self {
                kind,
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ChatProvider for Arc<ScriptedProvider> {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn complete(&self, _request: &CompletionRequest<'_>) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(Error::ProviderRequest("script exhausted".to_string()));
            }
            responses.remove(0)
        }
    }

    fn record() -> ContentRecord {
        ContentRecord::new(
            "x1",
            Platform::Twitter,
            InteractionType::Like,
            "new GPU architecture",
        )
    }

    fn classifier_with(
        scripts: Vec<Arc<ScriptedProvider>>,
        limiter: Arc<RateLimiter>,
    ) -> Classifier {
        let providers: Vec<Box<dyn ChatProvider>> = scripts
            .into_iter()
            .map(|s| Box::new(s) as Box<dyn ChatProvider>)
            .collect();
        Classifier::with_providers(providers, limiter)
    }

    #[tokio::test]
    async fn test_no_credentials_short_circuits() {
        let limiter = Arc::new(RateLimiter::with_defaults());
        let classifier = Classifier::with_providers(Vec::new(), limiter.clone());

        let outcome = classifier.classify(&record(), &[]).await;
        assert_eq!(outcome.categories, vec![UNCATEGORIZED.to_string()]);
        assert_eq!(
            outcome.failure_reason.as_deref(),
            Some("No API key configured")
        );
        // No slot consumed.
        assert_eq!(limiter.available().await, 10);
    }

    #[tokio::test]
    async fn test_primary_success_skips_secondary() {
        let limiter = Arc::new(RateLimiter::with_defaults());
        let openai = Arc::new(ScriptedProvider::new(
            ProviderKind::OpenAi,
            vec![Ok(r#"["Technology", "AI"]"#.to_string())],
        ));
        let gemini = Arc::new(ScriptedProvider::new(ProviderKind::Gemini, vec![]));
        let classifier = classifier_with(vec![openai.clone(), gemini.clone()], limiter);

        let outcome = classifier.classify(&record(), &[]).await;
        assert_eq!(outcome.categories, vec!["Technology", "AI"]);
        assert!(outcome.is_success());
        assert_eq!(openai.calls.load(Ordering::SeqCst), 1);
        assert_eq!(gemini.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_invokes_secondary_exactly_once() {
        let limiter = Arc::new(RateLimiter::with_defaults());
        let openai = Arc::new(ScriptedProvider::new(
            ProviderKind::OpenAi,
            vec![Err(Error::ProviderRequest("API error: 500 - down".to_string()))],
        ));
        let gemini = Arc::new(ScriptedProvider::new(
            ProviderKind::Gemini,
            vec![Ok(r#"["Gaming"]"#.to_string())],
        ));
        let classifier = classifier_with(vec![openai.clone(), gemini.clone()], limiter.clone());

        let outcome = classifier.classify(&record(), &[]).await;
        assert_eq!(outcome.categories, vec!["Gaming"]);
        assert!(outcome.is_success());
        assert_eq!(openai.calls.load(Ordering::SeqCst), 1);
        assert_eq!(gemini.calls.load(Ordering::SeqCst), 1);
        // One slot per network request made, fallback included.
        assert_eq!(limiter.available().await, 8);
    }

    #[tokio::test]
    async fn test_both_providers_failing() {
        let limiter = Arc::new(RateLimiter::with_defaults());
        let openai = Arc::new(ScriptedProvider::new(
            ProviderKind::OpenAi,
            vec![Err(Error::ProviderRequest("API error: 500 - a".to_string()))],
        ));
        let gemini = Arc::new(ScriptedProvider::new(
            ProviderKind::Gemini,
            vec![Err(Error::ProviderRequest("API error: 502 - b".to_string()))],
        ));
        let classifier = classifier_with(vec![openai, gemini], limiter);

        let outcome = classifier.classify(&record(), &[]).await;
        assert_eq!(outcome.categories, vec![UNCATEGORIZED.to_string()]);
        let reason = outcome.failure_reason.unwrap();
        assert!(
            reason.starts_with("Both AI providers failed:"),
            "unexpected reason: {}",
            reason
        );
        assert!(reason.contains("502 - b"), "carries the last error: {}", reason);
    }

    #[tokio::test]
    async fn test_single_provider_failure_names_provider() {
        let limiter = Arc::new(RateLimiter::with_defaults());
        let gemini = Arc::new(ScriptedProvider::new(
            ProviderKind::Gemini,
            vec![Err(Error::ProviderRequest("API error: 429 - slow down".to_string()))],
        ));
        let classifier = classifier_with(vec![gemini], limiter);

        let outcome = classifier.classify(&record(), &[]).await;
        let reason = outcome.failure_reason.unwrap();
        assert!(reason.starts_with("Gemini failed:"), "{}", reason);
    }

    #[tokio::test]
    async fn test_unparseable_primary_falls_back() {
        let limiter = Arc::new(RateLimiter::with_defaults());
        let openai = Arc::new(ScriptedProvider::new(
            ProviderKind::OpenAi,
            vec![Ok("definitely about computers".to_string())],
        ));
        let gemini = Arc::new(ScriptedProvider::new(
            ProviderKind::Gemini,
            vec![Ok(r#"["Technology"]"#.to_string())],
        ));
        let classifier = classifier_with(vec![openai, gemini.clone()], limiter);

        let outcome = classifier.classify(&record(), &[]).await;
        assert_eq!(outcome.categories, vec!["Technology"]);
        assert_eq!(gemini.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_array_json_is_definitive_no_result() {
        let limiter = Arc::new(RateLimiter::with_defaults());
        let openai = Arc::new(ScriptedProvider::new(
            ProviderKind::OpenAi,
            vec![Ok(r#"{"answer": "Technology"}"#.to_string())],
        ));
        let gemini = Arc::new(ScriptedProvider::new(ProviderKind::Gemini, vec![]));
        let classifier = classifier_with(vec![openai, gemini.clone()], limiter);

        let outcome = classifier.classify(&record(), &[]).await;
        // Coerced, successful, no fallback fired.
        assert_eq!(outcome.categories, vec![UNCATEGORIZED.to_string()]);
        assert!(outcome.is_success());
        assert_eq!(gemini.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_suggest_reorg_no_credentials() {
        let limiter = Arc::new(RateLimiter::with_defaults());
        let classifier = Classifier::with_providers(Vec::new(), limiter);
        let request = ReorgRequest {
            action: ReorgAction::Merge,
            categories: vec!["Tech".to_string()],
            usage: vec![],
            goal: None,
        };
        assert!(matches!(
            classifier.suggest_reorg(&request).await,
            Err(Error::NoCredential)
        ));
    }

    #[tokio::test]
    async fn test_suggest_reorg_fallback_and_parse() {
        let limiter = Arc::new(RateLimiter::with_defaults());
        let openai = Arc::new(ScriptedProvider::new(
            ProviderKind::OpenAi,
            vec![Err(Error::ProviderRequest("API error: 500 - x".to_string()))],
        ));
        let gemini = Arc::new(ScriptedProvider::new(
            ProviderKind::Gemini,
            vec![Ok(
                "```json\n{\"suggestions\": [{\"from\": \"Tech\", \"to\": \"Technology\"}]}\n```"
                    .to_string(),
            )],
        ));
        let classifier = classifier_with(vec![openai, gemini], limiter);

        let request = ReorgRequest {
            action: ReorgAction::Merge,
            categories: vec!["Tech".to_string(), "Technology".to_string()],
            usage: vec![],
            goal: None,
        };
        let suggestions = classifier.suggest_reorg(&request).await.unwrap();
        assert_eq!(suggestions.suggestions.len(), 1);
        assert_eq!(suggestions.suggestions[0].from, "Tech");
    }
}
