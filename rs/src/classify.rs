//! Opportunity classification
//!
//! Rules are evaluated in order and the first match wins. Changing the order changes which
//! bucket an entity lands in, so the list below is the precedence:
//!
//! 1. `total_posts >= p75_post_count` and `avg < overall_avg` → `HIGH_VOLUME_LOW_ENGAGEMENT`
//! 2. `total_posts >= p75_post_count` and `avg >= overall_avg` → `HIGH_VOLUME_HIGH_ENGAGEMENT`
//! 3. `total_posts < p25_post_count` → `LOW_VOLUME`
//! 4. anything else → `MEDIUM`

use crate::metrics::EntityMetric;
use crate::population::PopulationStats;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opportunity bucket of an entity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpportunityLabel {
    HighVolumeLowEngagement,
    HighVolumeHighEngagement,
    LowVolume,
    Medium,
}

impl OpportunityLabel {
    pub const ALL: [OpportunityLabel; 4] = [
        OpportunityLabel::HighVolumeLowEngagement,
        OpportunityLabel::HighVolumeHighEngagement,
        OpportunityLabel::LowVolume,
        OpportunityLabel::Medium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityLabel::HighVolumeLowEngagement => "HIGH_VOLUME_LOW_ENGAGEMENT",
            OpportunityLabel::HighVolumeHighEngagement => "HIGH_VOLUME_HIGH_ENGAGEMENT",
            OpportunityLabel::LowVolume => "LOW_VOLUME",
            OpportunityLabel::Medium => "MEDIUM",
        }
    }
}

impl fmt::Display for OpportunityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Rule {
    label: OpportunityLabel,
    matches: fn(&EntityMetric, &PopulationStats) -> bool,
}

const RULES: [Rule; 4] = [
    Rule {
        label: OpportunityLabel::HighVolumeLowEngagement,
        matches: high_volume_low_engagement,
    },
    Rule {
        label: OpportunityLabel::HighVolumeHighEngagement,
        matches: high_volume_high_engagement,
    },
    Rule {
        label: OpportunityLabel::LowVolume,
        matches: low_volume,
    },
    Rule {
        label: OpportunityLabel::Medium,
        matches: always,
    },
];

fn is_high_volume(metric: &EntityMetric, stats: &PopulationStats) -> bool {
    f64::from(metric.total_posts) >= stats.p75_post_count
}

fn high_volume_low_engagement(metric: &EntityMetric, stats: &PopulationStats) -> bool {
    is_high_volume(metric, stats) && metric.avg_engagement_per_post < stats.overall_avg_engagement
}

fn high_volume_high_engagement(metric: &EntityMetric, stats: &PopulationStats) -> bool {
    is_high_volume(metric, stats) && metric.avg_engagement_per_post >= stats.overall_avg_engagement
}

fn low_volume(metric: &EntityMetric, stats: &PopulationStats) -> bool {
    f64::from(metric.total_posts) < stats.p25_post_count
}

fn always(_: &EntityMetric, _: &PopulationStats) -> bool {
    true
}

/// Assign exactly one label to `metric`
pub fn classify(metric: &EntityMetric, stats: &PopulationStats) -> OpportunityLabel {
    RULES
        .iter()
        .find(|rule| (rule.matches)(metric, stats))
        .map_or(OpportunityLabel::Medium, |rule| rule.label)
}

/// Stricter underperformer check
///
/// Requires at least `min_posts` posts, volume at or above the 75th percentile and an
/// engagement rate at or below the 25th percentile of per-post engagement.
pub fn is_underperformer(metric: &EntityMetric, stats: &PopulationStats, min_posts: u32) -> bool {
    metric.total_posts >= min_posts
        && is_high_volume(metric, stats)
        && metric.avg_engagement_per_post <= stats.p25_engagement_per_post
}
