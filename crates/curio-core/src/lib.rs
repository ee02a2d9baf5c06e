//! # curio-core
//!
//! Core types, traits, and abstractions for the curio capture system.
//!
//! This crate provides the foundational data structures and trait
//! definitions that the other curio crates depend on: the content
//! record model, the error taxonomy, the storage/notification seams,
//! the hierarchical category usage index, and derived statistics.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod stats;
pub mod traits;
pub mod usage;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::{
    AiSettings, CategorizationNotice, CategorizationOutcome, CategorizationUpdate, ContentRecord,
    InteractionType, Platform, RecordId, ReorgAction, ReorgMapping, ReorgRequest,
    ReorgSuggestions, UNCATEGORIZED,
};
pub use stats::RecordStats;
pub use traits::{
    NoOpNotifier, OutcomeNotifier, QueueStore, RecordStore, SettingsProvider, UserCategoryStore,
};
pub use usage::{compute_usage, distinct_categories, CategoryUsage};
