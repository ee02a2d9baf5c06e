//! Centralized default constants for the curio system.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their
//! own magic numbers. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// RATE LIMITING
// =============================================================================

/// Max classification requests admitted per trailing window.
pub const RATE_LIMIT_MAX_REQUESTS: usize = 10;

/// Trailing rate-limit window in milliseconds (one minute).
pub const RATE_LIMIT_WINDOW_MS: u64 = 60_000;

/// Buffer added to a computed wait so the re-check lands after the
/// oldest admission has actually expired (tolerates clock drift and
/// interleaved acquisition).
pub const RATE_LIMIT_RECHECK_BUFFER_MS: u64 = 100;

// =============================================================================
// CATEGORIZATION QUEUE
// =============================================================================

/// Records attempted per drain cycle. Bounds per-cycle latency and
/// rate-limit consumption.
pub const QUEUE_BATCH_SIZE: usize = 5;

/// Delay between drain cycles while the queue is non-empty, in
/// milliseconds. Self-throttling, not a tight loop.
pub const QUEUE_DRAIN_DELAY_MS: u64 = 2_000;

/// Periodic drain trigger interval in seconds (five minutes).
pub const QUEUE_PERIOD_SECS: u64 = 300;

/// Delay before the one-shot startup drain, in seconds.
pub const QUEUE_STARTUP_DELAY_SECS: u64 = 5;

/// Broadcast capacity for queue events.
pub const QUEUE_EVENT_CAPACITY: usize = 256;

// =============================================================================
// PROVIDERS
// =============================================================================

/// Default OpenAI-compatible API endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default OpenAI generation model.
pub const OPENAI_GEN_MODEL: &str = "gpt-4o-mini";

/// Default Gemini-compatible API endpoint.
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

/// Default Gemini generation model.
pub const GEMINI_GEN_MODEL: &str = "gemini-1.5-flash";

/// Per-request provider timeout in seconds.
pub const PROVIDER_TIMEOUT_SECS: u64 = 30;

/// Token cap for classification responses. A JSON array of 1-3 short
/// category names fits comfortably.
pub const GEN_MAX_TOKENS: u32 = 100;

/// Token cap for reorg suggestion responses, which carry reasons.
pub const REORG_MAX_TOKENS: u32 = 600;

// =============================================================================
// SIMILARITY
// =============================================================================

/// Tokens of this many characters or fewer are dropped.
pub const TOKEN_MIN_CHARS: usize = 2;

/// Strict band: high-precision suggestions.
pub const SIMILARITY_STRICT_THRESHOLD: f64 = 0.25;
pub const SIMILARITY_STRICT_MAX: usize = 30;

/// Balanced band: the default slider midpoint.
pub const SIMILARITY_BALANCED_THRESHOLD: f64 = 0.18;
pub const SIMILARITY_BALANCED_MAX: usize = 50;

/// Loose band: favors recall over precision.
pub const SIMILARITY_LOOSE_THRESHOLD: f64 = 0.12;
pub const SIMILARITY_LOOSE_MAX: usize = 75;
