//! Core data models for curio.
//!
//! A [`ContentRecord`] is one captured social-media interaction. Records
//! are created by the platform trackers (out of scope here), queued for
//! AI categorization, and mutated in place by the queue and the curation
//! engines. Deletion is the host surface's responsibility.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel category meaning "processed, but no usable result".
pub const UNCATEGORIZED: &str = "Uncategorized";

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Stable identifier of a captured record.
///
/// Platform-assigned ids are opaque strings; curio never inspects their
/// structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// =============================================================================
// ENUMS
// =============================================================================

/// Supported capture sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Instagram,
    Threads,
    Twitter,
    Linkedin,
    Tiktok,
    Youtube,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Instagram => write!(f, "instagram"),
            Self::Threads => write!(f, "threads"),
            Self::Twitter => write!(f, "twitter"),
            Self::Linkedin => write!(f, "linkedin"),
            Self::Tiktok => write!(f, "tiktok"),
            Self::Youtube => write!(f, "youtube"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "instagram" => Ok(Self::Instagram),
            "threads" => Ok(Self::Threads),
            "twitter" => Ok(Self::Twitter),
            "linkedin" => Ok(Self::Linkedin),
            "tiktok" => Ok(Self::Tiktok),
            "youtube" => Ok(Self::Youtube),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}

/// How the user interacted with the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Like,
    Save,
    Repost,
    /// Auto-saved after the dwell-time threshold elapsed.
    TimeBased,
    /// Brought in by a bulk import rather than a live interaction.
    Imported,
}

impl std::fmt::Display for InteractionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Like => write!(f, "like"),
            Self::Save => write!(f, "save"),
            Self::Repost => write!(f, "repost"),
            Self::TimeBased => write!(f, "time_based"),
            Self::Imported => write!(f, "imported"),
        }
    }
}

// =============================================================================
// CONTENT RECORD
// =============================================================================

/// A single captured interaction with its extracted content fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: RecordId,
    pub platform: Platform,
    pub interaction_type: InteractionType,
    /// Extracted post text. Opaque to this core beyond tokenization.
    pub text: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Assigned topical categories (typically 0-3). `["Uncategorized"]`
    /// means "processed but no result".
    #[serde(default)]
    pub categories: Vec<String>,
    /// A categorization attempt produced a usable result. Failed
    /// attempts leave this false (with `ai_failure_reason` set), so
    /// the record is eligible again if the host re-enqueues it.
    #[serde(default)]
    pub ai_processed: bool,
    #[serde(default)]
    pub ai_failure_reason: Option<String>,
    /// Import provenance; set only for records created by bulk imports.
    #[serde(default)]
    pub imported_from: Option<String>,
    /// The user edited the category list by hand.
    #[serde(default)]
    pub manually_edited: bool,
    /// Opaque token naming the UI context that created the record.
    /// Outcome notifications are routed back to it.
    #[serde(default)]
    pub origin: Option<String>,
    pub captured_at: DateTime<Utc>,
}

impl ContentRecord {
    /// Create a freshly captured record with empty categorization state.
    pub fn new(
        id: impl Into<RecordId>,
        platform: Platform,
        interaction_type: InteractionType,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            platform,
            interaction_type,
            text: text.into(),
            author: None,
            url: None,
            categories: Vec::new(),
            ai_processed: false,
            ai_failure_reason: None,
            imported_from: None,
            manually_edited: false,
            origin: None,
            captured_at: Utc::now(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_imported_from(mut self, source: impl Into<String>) -> Self {
        self.imported_from = Some(source.into());
        self
    }

    /// Whether this record came from a bulk import.
    pub fn is_import(&self) -> bool {
        self.imported_from.is_some() || self.interaction_type == InteractionType::Imported
    }

    /// Whether the category list is exactly the sentinel.
    pub fn is_uncategorized(&self) -> bool {
        self.categories.len() == 1 && self.categories[0] == UNCATEGORIZED
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }
}

// =============================================================================
// CATEGORIZATION RESULTS
// =============================================================================

/// Result of one classification call. Never an error: provider failures
/// surface as the sentinel category plus a failure reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizationOutcome {
    pub categories: Vec<String>,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

impl CategorizationOutcome {
    pub fn success(categories: Vec<String>) -> Self {
        Self {
            categories,
            failure_reason: None,
        }
    }

    pub fn uncategorized(reason: impl Into<String>) -> Self {
        Self {
            categories: vec![UNCATEGORIZED.to_string()],
            failure_reason: Some(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure_reason.is_none()
    }
}

/// Mutation applied to a record after a categorization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorizationUpdate {
    /// New category list; `None` leaves the existing list untouched.
    pub categories: Option<Vec<String>>,
    pub ai_processed: bool,
    pub ai_failure_reason: Option<String>,
}

impl CategorizationUpdate {
    /// The attempt ran to completion. Only a successful outcome marks
    /// the record processed; a failed one records the reason and leaves
    /// `ai_processed` false so a re-enqueue can try again.
    pub fn completed(outcome: &CategorizationOutcome) -> Self {
        Self {
            categories: Some(outcome.categories.clone()),
            ai_processed: outcome.is_success(),
            ai_failure_reason: outcome.failure_reason.clone(),
        }
    }

    /// The attempt aborted before completion; categories are untouched
    /// so a later attempt can still run.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            categories: None,
            ai_processed: false,
            ai_failure_reason: Some(reason.into()),
        }
    }
}

/// Fire-and-forget outcome message routed to the record's origin
/// context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizationNotice {
    pub success: bool,
    pub categories: Vec<String>,
    pub ai_processed: bool,
    pub ai_failure_reason: Option<String>,
    pub interaction_type: InteractionType,
    pub platform: Platform,
}

// =============================================================================
// CATEGORY REORGANIZATION
// =============================================================================

/// Requested reorganization action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorgAction {
    Merge,
    Rename,
    Split,
    Reorganize,
}

impl std::fmt::Display for ReorgAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
            Self::Rename => write!(f, "rename"),
            Self::Split => write!(f, "split"),
            Self::Reorganize => write!(f, "reorganize"),
        }
    }
}

/// Input to a reorg suggestion call.
#[derive(Debug, Clone)]
pub struct ReorgRequest {
    pub action: ReorgAction,
    /// User-selected subset of categories to reorganize.
    pub categories: Vec<String>,
    /// Usage snapshot for prompt context.
    pub usage: Vec<crate::usage::CategoryUsage>,
    /// Optional free-text goal from the user.
    pub goal: Option<String>,
}

/// One provider-proposed category rename/merge transform.
///
/// Deserialized leniently: malformed entries keep empty fields and are
/// filtered at apply time, not at suggest time, so the raw proposal can
/// still be shown for user review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorgMapping {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl ReorgMapping {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            reason: None,
        }
    }

    /// A mapping is applicable only when both names are non-empty and
    /// actually differ.
    pub fn is_applicable(&self) -> bool {
        !self.from.trim().is_empty() && !self.to.trim().is_empty() && self.from != self.to
    }
}

/// Provider response to a reorg suggestion call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReorgSuggestions {
    #[serde(default)]
    pub suggestions: Vec<ReorgMapping>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// SETTINGS
// =============================================================================

/// AI-related settings supplied by the host's settings surface.
///
/// The legacy `{provider, api_key}` pair predates the dedicated
/// per-provider keys and is honored only when neither dedicated key is
/// configured.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiSettings {
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    /// Deprecated single-provider flag: "openai" or "gemini".
    #[serde(default)]
    pub legacy_provider: Option<String>,
    /// Deprecated single credential matching `legacy_provider`.
    #[serde(default)]
    pub legacy_api_key: Option<String>,
    /// Skip AI categorization for imported records.
    #[serde(default)]
    pub skip_ai_for_imports: bool,
}

impl AiSettings {
    pub fn with_openai_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    pub fn with_gemini_key(mut self, key: impl Into<String>) -> Self {
        self.gemini_api_key = Some(key.into());
        self
    }

    pub fn with_legacy(
        mut self,
        provider: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        self.legacy_provider = Some(provider.into());
        self.legacy_api_key = Some(api_key.into());
        self
    }
}
