//! # curio-store
//!
//! In-memory implementation of curio's storage traits.
//!
//! The host persists everything through a generic key-value store with
//! whole-collection read-modify-write semantics. [`MemoryStore`] models
//! exactly that contract in process memory: it is the reference backing
//! for tests and the default store for embedded hosts that bring their
//! own snapshot/restore layer.

pub mod memory;

// Re-export core types
pub use curio_core::*;

pub use memory::MemoryStore;
