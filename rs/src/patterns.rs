//! Engagement activity reports: top authors and time-of-day patterns
//!
//! These filter on the engagement timestamp. Hours and weekdays are taken in UTC, with
//! Sunday as day 0.

use crate::error::AnalysisError;
use crate::models::{AnalysisWindow, AuthorId, EngagementStore, KindCounts, PostId};
use crate::stats::ratio_or_zero;
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// One author's engagement within the window
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopAuthor {
    pub author_id: AuthorId,
    pub name: String,
    pub author_category: String,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub total_shares: u64,
    pub total_engagements: u64,
    pub posts_with_engagement: u64,
    pub avg_engagement_per_post: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct HourlyEngagement {
    pub hour_of_day: u32,
    pub total_engagements: u64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct HeatmapCell {
    /// 0 = Sunday
    pub day_of_week: u32,
    pub hour_of_day: u32,
    pub engagement_count: u64,
}

/// Authors ranked by engagements recorded in the window
pub async fn top_authors<S: EngagementStore + ?Sized>(
    store: &S,
    lookback_days: i64,
    limit: usize,
    now: DateTime<Utc>,
) -> Result<Vec<TopAuthor>, AnalysisError> {
    let window = AnalysisWindow::trailing(lookback_days, now)?;

    let authors = store.authors().await?;
    let owner: HashMap<PostId, AuthorId> = store
        .posts()
        .await?
        .into_iter()
        .map(|post| (post.post_id, post.author_id))
        .collect();

    let mut counts: HashMap<AuthorId, (KindCounts, HashSet<PostId>)> = HashMap::new();
    for engagement in store.engagements_since(window.start).await? {
        if !window.contains(engagement.engaged_timestamp) {
            continue;
        }
        let Some(author_id) = owner.get(&engagement.post_id) else {
            continue;
        };
        let (kinds, posts) = counts.entry(*author_id).or_default();
        kinds.record(engagement.kind);
        posts.insert(engagement.post_id);
    }

    let mut ranked: Vec<TopAuthor> = authors
        .into_iter()
        .filter_map(|author| {
            let (kinds, posts) = counts.remove(&author.author_id)?;
            let posts_with_engagement = posts.len() as u64;
            Some(TopAuthor {
                author_id: author.author_id,
                name: author.name,
                author_category: author.category,
                total_views: kinds.views,
                total_likes: kinds.likes,
                total_comments: kinds.comments,
                total_shares: kinds.shares,
                total_engagements: kinds.total(),
                posts_with_engagement,
                avg_engagement_per_post: ratio_or_zero(kinds.total(), posts_with_engagement),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.total_engagements
            .cmp(&a.total_engagements)
            .then_with(|| a.author_id.cmp(&b.author_id))
    });
    ranked.truncate(limit);
    Ok(ranked)
}

/// Engagement counts for each hour of the day, all 24 hours present
pub async fn engagement_by_hour<S: EngagementStore + ?Sized>(
    store: &S,
    lookback_days: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Vec<HourlyEngagement>, AnalysisError> {
    let mut hours = [0u64; 24];
    for at in engagement_times(store, lookback_days, now).await? {
        hours[at.hour() as usize] += 1;
    }

    Ok(hours
        .iter()
        .enumerate()
        .map(|(hour, count)| HourlyEngagement {
            hour_of_day: hour as u32,
            total_engagements: *count,
        })
        .collect())
}

/// Engagement counts per (weekday, hour) cell that saw any activity
pub async fn engagement_heatmap<S: EngagementStore + ?Sized>(
    store: &S,
    lookback_days: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Vec<HeatmapCell>, AnalysisError> {
    let mut cells: BTreeMap<(u32, u32), u64> = BTreeMap::new();
    for at in engagement_times(store, lookback_days, now).await? {
        *cells
            .entry((at.weekday().num_days_from_sunday(), at.hour()))
            .or_default() += 1;
    }

    Ok(cells
        .into_iter()
        .map(|((day_of_week, hour_of_day), engagement_count)| HeatmapCell {
            day_of_week,
            hour_of_day,
            engagement_count,
        })
        .collect())
}

/// Engagement timestamps in the window, or in all history when no lookback is given
async fn engagement_times<S: EngagementStore + ?Sized>(
    store: &S,
    lookback_days: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Vec<DateTime<Utc>>, AnalysisError> {
    let window = lookback_days
        .map(|days| AnalysisWindow::trailing(days, now))
        .transpose()?;
    let since = window.map_or(DateTime::<Utc>::MIN_UTC, |w| w.start);

    Ok(store
        .engagements_since(since)
        .await?
        .into_iter()
        .map(|engagement| engagement.engaged_timestamp)
        .filter(|at| window.is_none_or(|w| w.contains(*at)))
        .collect())
}
