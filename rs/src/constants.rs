//! Constants for the reach engagement analytics system
//!
//! Defaults match the canned reports so that numbers line up with existing dashboards.

// Analysis windows

/// Default trailing window for opportunity analysis.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 90;

/// Default period length for post and author trend comparisons.
pub const DEFAULT_TREND_DAYS: u32 = 7;

/// Default window for the analytics summary.
pub const DEFAULT_SUMMARY_DAYS: u32 = 30;

/// Default window for the top-authors report.
pub const DEFAULT_TOP_AUTHORS_LOOKBACK_DAYS: u32 = 365;

/// Default number of rows returned by the top-authors report.
pub const DEFAULT_TOP_AUTHORS_LIMIT: usize = 20;

/// Largest accepted window (roughly a century).
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

// Population thresholds

/// Percentile of post volume at or above which an entity is "high volume".
pub const HIGH_VOLUME_PERCENTILE: f64 = 0.75;

/// Percentile of post volume below which an entity is "low volume".
pub const LOW_VOLUME_PERCENTILE: f64 = 0.25;

/// Percentile of per-post engagement at or below which a high-volume entity underperforms.
pub const LOW_ENGAGEMENT_PERCENTILE: f64 = 0.25;

/// Smallest population for which quartile thresholds are reported.
pub const MIN_CLASSIFIABLE_POPULATION: usize = 4;

/// Minimum posts an entity needs before it can appear in the underperformer view.
pub const UNDERPERFORMER_MIN_POSTS: u32 = 5;

// Store access

/// Upper bound on a single engagement store call made by the analyzer.
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 30;
