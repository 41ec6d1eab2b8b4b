//! Population statistics: the reference distribution entities are classified against
//!
//! `overall_avg_engagement` is the mean of per-entity averages, not total engagements over
//! total posts. Low-volume entities therefore weigh as much as high-volume ones. The
//! definition is kept so figures match the existing reports; treat it as a known skew.

use crate::constants::{
    HIGH_VOLUME_PERCENTILE, LOW_ENGAGEMENT_PERCENTILE, LOW_VOLUME_PERCENTILE,
    MIN_CLASSIFIABLE_POPULATION,
};
use crate::error::AnalysisError;
use crate::metrics::EntityMetric;
use crate::stats::{mean, percentile_cont};
use serde::Serialize;

/// Thresholds derived from one population of entity metrics
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PopulationStats {
    /// Number of entities the thresholds were computed over
    pub population: usize,

    /// Mean of `avg_engagement_per_post` across entities
    pub overall_avg_engagement: f64,

    pub p25_post_count: f64,
    pub p75_post_count: f64,
    pub p25_engagement_per_post: f64,
}

impl PopulationStats {
    /// Compute thresholds over `metrics` with the default population floor
    pub fn compute(metrics: &[EntityMetric]) -> Result<Self, AnalysisError> {
        Self::compute_with_floor(metrics, MIN_CLASSIFIABLE_POPULATION)
    }

    /// Compute thresholds, refusing populations smaller than `min_population`
    ///
    /// Entities without posts are ignored. A floor below 2 is raised to 2: a single
    /// entity has no distribution to compare against.
    pub fn compute_with_floor(
        metrics: &[EntityMetric],
        min_population: usize,
    ) -> Result<Self, AnalysisError> {
        let required = min_population.max(2);
        let counted: Vec<&EntityMetric> = metrics.iter().filter(|m| m.total_posts > 0).collect();

        if counted.len() < required {
            return Err(AnalysisError::InsufficientPopulation {
                size: counted.len(),
                required,
            });
        }

        let post_counts: Vec<f64> = counted.iter().map(|m| f64::from(m.total_posts)).collect();
        let averages: Vec<f64> = counted.iter().map(|m| m.avg_engagement_per_post).collect();

        let insufficient = || AnalysisError::InsufficientPopulation {
            size: counted.len(),
            required,
        };

        Ok(Self {
            population: counted.len(),
            overall_avg_engagement: overall_average(metrics).ok_or_else(insufficient)?,
            p25_post_count: percentile_cont(&post_counts, LOW_VOLUME_PERCENTILE)
                .ok_or_else(insufficient)?,
            p75_post_count: percentile_cont(&post_counts, HIGH_VOLUME_PERCENTILE)
                .ok_or_else(insufficient)?,
            p25_engagement_per_post: percentile_cont(&averages, LOW_ENGAGEMENT_PERCENTILE)
                .ok_or_else(insufficient)?,
        })
    }
}

/// Mean of per-entity averages over entities with posts, `None` when there are none
///
/// Needs no population floor, so it is also reported for populations too small to
/// classify.
pub fn overall_average(metrics: &[EntityMetric]) -> Option<f64> {
    let averages: Vec<f64> = metrics
        .iter()
        .filter(|m| m.total_posts > 0)
        .map(|m| m.avg_engagement_per_post)
        .collect();
    mean(&averages)
}
