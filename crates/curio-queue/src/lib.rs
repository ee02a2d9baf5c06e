//! # curio-queue
//!
//! Background categorization queue for curio.
//!
//! This crate provides:
//! - A persisted-id batch queue drained in fixed-size cycles
//! - An instance-owned drain state machine with silent re-entrancy
//!   suppression
//! - Save/explicit/periodic/startup triggers funneling into one drain
//! - Progress notifications via broadcast events and the host's
//!   outcome-notification sink
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use curio_queue::{CategorizeQueue, QueueConfig};
//!
//! let queue = Arc::new(
//!     CategorizeQueue::new(records, queue_store, settings, notifier)
//!         .with_config(QueueConfig::from_env()),
//! );
//!
//! // Scheduler: startup drain + periodic drains.
//! let handle = queue.clone().start();
//!
//! // A fresh capture: enqueue and kick off a drain.
//! queue.enqueue_on_save(&record).await?;
//!
//! // Listen for events
//! let mut events = handle.events();
//! while let Ok(event) = events.recv().await {
//!     println!("Event: {:?}", event);
//! }
//!
//! // Graceful shutdown
//! handle.shutdown().await?;
//! ```

pub mod queue;

// Re-export core types
pub use curio_core::*;

pub use queue::{CategorizeQueue, DrainState, QueueConfig, QueueEvent, QueueHandle};
