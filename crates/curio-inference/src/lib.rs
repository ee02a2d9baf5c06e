//! # curio-inference
//!
//! Classification provider backends and rate limiting for curio.
//!
//! This crate provides:
//! - A sliding-window rate limiter shared by all outbound calls
//! - OpenAI-compatible and Gemini-compatible provider backends behind
//!   a uniform [`ChatProvider`] surface
//! - Credential resolution with legacy single-credential migration
//! - The never-throws [`Classifier`] that walks the provider strategy
//!   list until one attempt parses or all fail
//! - Prompt templates and fence-tolerant response parsing
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use curio_inference::{Classifier, ProviderEndpoints, RateLimiter};
//!
//! let limiter = Arc::new(RateLimiter::with_defaults());
//! let classifier = Classifier::from_settings(&settings, &ProviderEndpoints::from_env(), limiter)?;
//! let outcome = classifier.classify(&record, &usage).await;
//! ```

pub mod classifier;
pub mod parse;
pub mod prompt;
pub mod provider;
pub mod ratelimit;

// Re-export core types
pub use curio_core::*;

pub use classifier::Classifier;
pub use parse::{parse_category_list, parse_reorg_suggestions, strip_code_fences};
pub use prompt::{
    classification_prompt, reorg_prompt, CATEGORY_CATALOGUE, CLASSIFICATION_SYSTEM_PROMPT,
    REORG_SYSTEM_PROMPT,
};
pub use provider::{
    resolve_providers, ChatProvider, CompletionRequest, GeminiProvider, OpenAiProvider,
    ProviderEndpoints, ProviderKind,
};
pub use ratelimit::RateLimiter;
