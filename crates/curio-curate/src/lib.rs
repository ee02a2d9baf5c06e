//! # curio-curate
//!
//! Category curation engines for the curio dashboard.
//!
//! This crate provides:
//! - Deterministic "find similar items" suggestions over Jaccard token
//!   overlap, with sensitivity-banded thresholds
//! - Record tokenization with stopword removal and per-snapshot token
//!   caching
//! - The category reorg engine: provider-suggested merge/rename
//!   mappings plus the bulk best-effort apply step
//!
//! ## Example
//!
//! ```ignore
//! use curio_curate::{Sensitivity, SimilarityEngine};
//!
//! let engine = SimilarityEngine::new(records);
//! let suggestions = engine.find_similar(&seed_ids, "Hardware", Sensitivity::Balanced);
//! ```

pub mod reorg;
pub mod similarity;
pub mod tokenize;

// Re-export core types
pub use curio_core::*;

pub use reorg::{ApplyReport, ReorgEngine};
pub use similarity::{jaccard, Sensitivity, SimilarityEngine, Suggestion, SuggestionBand};
pub use tokenize::{tokenize, TokenSets};
