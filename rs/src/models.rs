//! Core data models for the reach analytics system
//!
//! Field names follow the relational schema the canned reports were written against
//! (`author_id`, `publish_timestamp`, `engaged_timestamp`, ...), so datasets exported from
//! that schema load without translation.

use crate::constants::{
    DEFAULT_LOOKBACK_DAYS, DEFAULT_SUMMARY_DAYS, DEFAULT_TOP_AUTHORS_LIMIT,
    DEFAULT_TOP_AUTHORS_LOOKBACK_DAYS, DEFAULT_TREND_DAYS, MAX_LOOKBACK_DAYS,
};
use crate::error::AnalysisError;
use crate::storage::StoreError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub type AuthorId = i64;
pub type PostId = i64;
pub type EngagementId = i64;
pub type UserId = i64;

/// A content author
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    pub author_id: AuthorId,
    pub name: String,

    /// Category label the author primarily writes in
    #[serde(rename = "author_category")]
    pub category: String,

    #[serde(default)]
    pub joined_date: Option<NaiveDate>,
}

/// A published post, owned by exactly one author
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub post_id: PostId,
    pub author_id: AuthorId,

    /// Category label of the post itself (may differ from the author's category)
    pub category: String,

    pub publish_timestamp: DateTime<Utc>,

    #[serde(default)]
    pub title: String,

    /// Content length in characters
    pub content_length: u32,

    pub has_media: bool,
}

/// The four recorded interaction kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EngagementKind {
    View,
    Like,
    Comment,
    Share,
}

/// A single recorded user interaction with a post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Engagement {
    pub engagement_id: EngagementId,
    pub post_id: PostId,

    #[serde(rename = "type")]
    pub kind: EngagementKind,

    /// Absent for anonymous engagements
    #[serde(default)]
    pub user_id: Option<UserId>,

    pub engaged_timestamp: DateTime<Utc>,
}

/// Per-kind engagement counters
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KindCounts {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
}

impl KindCounts {
    pub fn record(&mut self, kind: EngagementKind) {
        match kind {
            EngagementKind::View => self.views += 1,
            EngagementKind::Like => self.likes += 1,
            EngagementKind::Comment => self.comments += 1,
            EngagementKind::Share => self.shares += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.views + self.likes + self.comments + self.shares
    }
}

/// Trailing time window `[end - lookback_days, end]`
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct AnalysisWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub lookback_days: u32,
}

impl AnalysisWindow {
    /// Build the window ending at `now`
    ///
    /// Rejects non-positive and absurdly large lookbacks before any store is touched.
    pub fn trailing(lookback_days: i64, now: DateTime<Utc>) -> Result<Self, AnalysisError> {
        if lookback_days <= 0 {
            return Err(AnalysisError::InputValidation {
                message: format!("lookback_days must be a positive integer, got {lookback_days}"),
            });
        }
        if lookback_days > MAX_LOOKBACK_DAYS {
            return Err(AnalysisError::InputValidation {
                message: format!(
                    "lookback_days must be at most {MAX_LOOKBACK_DAYS}, got {lookback_days}"
                ),
            });
        }

        Ok(Self {
            start: now - Duration::days(lookback_days),
            end: now,
            lookback_days: lookback_days as u32,
        })
    }

    /// Window ending now
    pub fn trailing_from_now(lookback_days: i64) -> Result<Self, AnalysisError> {
        Self::trailing(lookback_days, Utc::now())
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

/// What an opportunity analysis groups by
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    #[default]
    Author,
    Category,
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grouping::Author => write!(f, "author"),
            Grouping::Category => write!(f, "category"),
        }
    }
}

/// Identity of an analyzed entity
///
/// Serializes as the bare author id or category label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityKey {
    Author(AuthorId),
    Category(String),
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Author(id) => write!(f, "author:{id}"),
            EntityKey::Category(label) => write!(f, "category:{label}"),
        }
    }
}

/// Read-only engagement store interface
///
/// Abstracts over the backing tables (JSON files, in-memory fixtures, a database).
/// Time filters are lower bounds only; callers apply upper bounds themselves.
#[async_trait::async_trait]
pub trait EngagementStore: Send + Sync {
    /// All authors
    async fn authors(&self) -> Result<Vec<Author>, StoreError>;

    /// Look up one author
    async fn author(&self, id: AuthorId) -> Result<Option<Author>, StoreError>;

    /// Look up one post
    async fn post(&self, id: PostId) -> Result<Option<Post>, StoreError>;

    /// All posts
    async fn posts(&self) -> Result<Vec<Post>, StoreError>;

    /// Posts with `publish_timestamp >= since`
    async fn posts_published_since(&self, since: DateTime<Utc>) -> Result<Vec<Post>, StoreError>;

    /// Every engagement referencing one of the given posts, whatever its timestamp
    async fn engagements_on_posts(
        &self,
        post_ids: &HashSet<PostId>,
    ) -> Result<Vec<Engagement>, StoreError>;

    /// Engagements with `engaged_timestamp >= since`
    async fn engagements_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Engagement>, StoreError>;
}


// MCP Tool Parameter Structs

/// Parameters for the author opportunity report
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AuthorOpportunitiesParams {
    /// Trailing window in days (posts published in this window are analyzed)
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
    /// Only authors with at least this many posts in the window are analyzed
    #[serde(default)]
    pub min_posts: u32,
}

/// Parameters for the category opportunity report
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CategoryOpportunitiesParams {
    /// Trailing window in days (posts published in this window are analyzed)
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
}

/// Parameters for the detailed underperformer view
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UnderperformersParams {
    /// Group by author or by post category
    #[serde(default)]
    pub grouping: Grouping,
    /// Trailing window in days
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
}

/// Parameters for post engagement trends
#[derive(Debug, Deserialize, JsonSchema)]
pub struct PostTrendsParams {
    pub post_id: PostId,
    /// Period length in days; the current period is compared with the one before it
    #[serde(default = "default_trend_days")]
    pub days: i64,
}

/// Parameters for author engagement trends
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AuthorTrendsParams {
    pub author_id: AuthorId,
    /// Period length in days; the current period is compared with the one before it
    #[serde(default = "default_trend_days")]
    pub days: i64,
}

/// Parameters for the analytics summary
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SummaryParams {
    /// Posts published in the last `days` days are summarized
    #[serde(default = "default_summary_days")]
    pub days: i64,
}

/// Parameters for the top authors report
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TopAuthorsParams {
    /// Engagements recorded in the last `lookback_days` days are counted
    #[serde(default = "default_top_authors_lookback_days")]
    pub lookback_days: i64,
    /// Maximum number of authors returned
    #[serde(default = "default_top_authors_limit")]
    pub limit: usize,
}

/// Parameters for the hour-of-day and heatmap reports
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TimePatternParams {
    /// Restrict to engagements in the last `lookback_days` days (all history when absent)
    #[serde(default)]
    pub lookback_days: Option<i64>,
}

fn default_lookback_days() -> i64 {
    DEFAULT_LOOKBACK_DAYS as i64
}

fn default_trend_days() -> i64 {
    DEFAULT_TREND_DAYS as i64
}

fn default_summary_days() -> i64 {
    DEFAULT_SUMMARY_DAYS as i64
}

fn default_top_authors_lookback_days() -> i64 {
    DEFAULT_TOP_AUTHORS_LOOKBACK_DAYS as i64
}

fn default_top_authors_limit() -> usize {
    DEFAULT_TOP_AUTHORS_LIMIT
}
