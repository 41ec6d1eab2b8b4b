//! Engagement trends and the analytics summary
//!
//! Trends compare the last `days` days of engagement activity against the `days` days
//! before that, bucketed per calendar date (UTC). They filter on the engagement
//! timestamp, unlike the opportunity pipeline which windows on publish time.

use crate::error::AnalysisError;
use crate::models::{
    AnalysisWindow, AuthorId, Engagement, EngagementStore, KindCounts, PostId,
};
use crate::stats::{percent_change, ratio_or_zero};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Engagement counts on one calendar date
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub total: u64,
}

/// Current period against the one before it
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PeriodComparison {
    pub current_period: Vec<TrendPoint>,
    pub previous_period: Vec<TrendPoint>,

    /// Change in total engagement, `0` when the previous period had none
    pub change_percent: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PostTrends {
    pub post_id: PostId,
    pub post_title: String,
    #[serde(flatten)]
    pub comparison: PeriodComparison,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuthorTrends {
    pub author_id: AuthorId,
    pub author_name: String,
    #[serde(flatten)]
    pub comparison: PeriodComparison,
}

/// Totals over posts published in a window
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryMetrics {
    pub total_authors: u64,
    pub total_posts: u64,
    pub total_engagements: u64,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub total_shares: u64,
    pub avg_engagement_per_post: f64,
}

/// Daily engagement trends for one post
pub async fn post_trends<S: EngagementStore + ?Sized>(
    store: &S,
    post_id: PostId,
    days: i64,
    now: DateTime<Utc>,
) -> Result<PostTrends, AnalysisError> {
    let current = AnalysisWindow::trailing(days, now)?;
    let post = store.post(post_id).await?.ok_or(AnalysisError::NotFound {
        entity: "Post",
        id: post_id,
    })?;

    let previous_start = current.start - (current.end - current.start);
    let engagements: Vec<Engagement> = store
        .engagements_since(previous_start)
        .await?
        .into_iter()
        .filter(|engagement| engagement.post_id == post_id)
        .collect();

    tracing::debug!(
        "Post {} has {} engagements since {}",
        post_id,
        engagements.len(),
        previous_start
    );

    Ok(PostTrends {
        post_id,
        post_title: post.title,
        comparison: compare_periods(&engagements, previous_start, current.start),
    })
}

/// Daily engagement trends across all posts of one author
pub async fn author_trends<S: EngagementStore + ?Sized>(
    store: &S,
    author_id: AuthorId,
    days: i64,
    now: DateTime<Utc>,
) -> Result<AuthorTrends, AnalysisError> {
    let current = AnalysisWindow::trailing(days, now)?;
    let author = store.author(author_id).await?.ok_or(AnalysisError::NotFound {
        entity: "Author",
        id: author_id,
    })?;

    let owned: HashSet<PostId> = store
        .posts()
        .await?
        .into_iter()
        .filter(|post| post.author_id == author_id)
        .map(|post| post.post_id)
        .collect();

    let previous_start = current.start - (current.end - current.start);
    let engagements: Vec<Engagement> = store
        .engagements_since(previous_start)
        .await?
        .into_iter()
        .filter(|engagement| owned.contains(&engagement.post_id))
        .collect();

    Ok(AuthorTrends {
        author_id,
        author_name: author.name,
        comparison: compare_periods(&engagements, previous_start, current.start),
    })
}

/// Summary over posts published in the last `days` days
///
/// Authors who have never posted are counted alongside authors with posts in the window;
/// authors whose posts all predate the window are not.
pub async fn summary<S: EngagementStore + ?Sized>(
    store: &S,
    days: i64,
    now: DateTime<Utc>,
) -> Result<SummaryMetrics, AnalysisError> {
    let window = AnalysisWindow::trailing(days, now)?;

    let authors = store.authors().await?;
    let all_posts = store.posts().await?;
    let posting_authors: HashSet<AuthorId> =
        all_posts.iter().map(|post| post.author_id).collect();

    let known_authors: HashSet<AuthorId> =
        authors.iter().map(|author| author.author_id).collect();
    let window_posts: HashSet<PostId> = all_posts
        .iter()
        .filter(|post| post.publish_timestamp >= window.start)
        .filter(|post| known_authors.contains(&post.author_id))
        .map(|post| post.post_id)
        .collect();
    let active_authors: HashSet<AuthorId> = all_posts
        .iter()
        .filter(|post| window_posts.contains(&post.post_id))
        .map(|post| post.author_id)
        .collect();

    let silent_authors = authors
        .iter()
        .filter(|author| !posting_authors.contains(&author.author_id))
        .count() as u64;

    let mut counts = KindCounts::default();
    if !window_posts.is_empty() {
        for engagement in store.engagements_on_posts(&window_posts).await? {
            counts.record(engagement.kind);
        }
    }

    let total_posts = window_posts.len() as u64;
    Ok(SummaryMetrics {
        total_authors: active_authors.len() as u64 + silent_authors,
        total_posts,
        total_engagements: counts.total(),
        total_views: counts.views,
        total_likes: counts.likes,
        total_comments: counts.comments,
        total_shares: counts.shares,
        avg_engagement_per_post: ratio_or_zero(counts.total(), total_posts),
    })
}

/// Split engagements into `[previous_start, current_start)` and `[current_start, ..)`
fn compare_periods(
    engagements: &[Engagement],
    previous_start: DateTime<Utc>,
    current_start: DateTime<Utc>,
) -> PeriodComparison {
    let mut current: BTreeMap<NaiveDate, KindCounts> = BTreeMap::new();
    let mut previous: BTreeMap<NaiveDate, KindCounts> = BTreeMap::new();

    for engagement in engagements {
        let at = engagement.engaged_timestamp;
        let bucket = if at >= current_start {
            &mut current
        } else if at >= previous_start {
            &mut previous
        } else {
            continue;
        };
        bucket.entry(at.date_naive()).or_default().record(engagement.kind);
    }

    let current_total: u64 = current.values().map(KindCounts::total).sum();
    let previous_total: u64 = previous.values().map(KindCounts::total).sum();
    PeriodComparison {
        current_period: to_points(current),
        previous_period: to_points(previous),
        change_percent: percent_change(current_total, previous_total),
    }
}

fn to_points(buckets: BTreeMap<NaiveDate, KindCounts>) -> Vec<TrendPoint> {
    buckets
        .into_iter()
        .map(|(date, counts)| TrendPoint {
            date,
            views: counts.views,
            likes: counts.likes,
            comments: counts.comments,
            shares: counts.shares,
            total: counts.total(),
        })
        .collect()
}
