//! Error handling and failure statistics.
//!
//! This module provides:
//! - Error type definitions for discovery, analysis and batch runs
//! - Failure categorization and retry decisions
//! - Failure statistics tracking

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_analyze_error, get_retry_strategy};
pub(crate) use categorization::is_retriable_error;
pub use stats::ProcessingStats;
pub use types::{
    AnalyzeError, BatchError, DiscoveryError, ErrorType, FetchError, InitializationError,
};
