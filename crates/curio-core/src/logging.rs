//! Structured logging schema and field name constants for curio.
//!
//! All crates use these constants for consistent structured logging
//! fields, so log queries work across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, drain/apply completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "queue", "inference", "curate", "store"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "drain", "classify", "find_similar", "apply_mappings"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Record id being operated on.
pub const RECORD_ID: &str = "record_id";

/// Capture platform of the record.
pub const PLATFORM: &str = "platform";

/// Provider attempted for a classification request.
pub const PROVIDER: &str = "provider";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Pending queue length at drain start.
pub const QUEUE_LEN: &str = "queue_len";

/// Records attempted in one drain cycle.
pub const BATCH_SIZE: &str = "batch_size";

/// Number of suggestions/results returned.
pub const RESULT_COUNT: &str = "result_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Initialize the global tracing subscriber for host binaries and
/// integration harnesses. Respects `RUST_LOG`; defaults to `info`.
/// Safe to call more than once — later calls are no-ops.
pub fn init() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
