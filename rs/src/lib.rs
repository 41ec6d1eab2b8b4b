//! Reach: engagement analytics over authors, posts and engagements
//!
//! Scores authors and post categories by posting volume against engagement quality, and
//! serves trend, summary and time-of-day reports over the same data.
//!
//! This library provides both a programmatic API for embedding into other applications
//! and a standalone MCP server for direct usage.

pub mod analyzer;
pub mod classify;
pub mod constants;
pub mod error;
pub mod fixtures;
pub mod metrics;
pub mod models;
pub mod patterns;
pub mod population;
pub mod server;
pub mod stats;
pub mod storage;
pub mod trends;

// Re-export main types for convenience
pub use analyzer::{Analyzer, AnalyzerConfig, OpportunityRow, UnderperformerRow};
pub use classify::OpportunityLabel;
pub use error::AnalysisError;
pub use metrics::EntityMetric;
pub use models::{
    AnalysisWindow, Author, Engagement, EngagementKind, EngagementStore, EntityKey, Grouping,
    Post,
};
pub use population::PopulationStats;
pub use server::ReachServer;
pub use storage::{Dataset, FileStore, MemoryStore, StoreError};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
