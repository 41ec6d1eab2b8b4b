//! Opportunity analyzer: the entry points behind the opportunity reports
//!
//! A run fetches the window's posts and engagements, aggregates them into entity metrics,
//! derives population thresholds and labels every entity. Each run owns its values; nothing
//! is cached between runs. Cancellation is honoured while waiting on the store and between
//! aggregation and classification.

use crate::classify::{classify, is_underperformer, OpportunityLabel};
use crate::constants::{
    DEFAULT_STORE_TIMEOUT_SECS, MIN_CLASSIFIABLE_POPULATION, UNDERPERFORMER_MIN_POSTS,
};
use crate::error::AnalysisError;
use crate::metrics::{aggregate, EntityMetric};
use crate::models::{AnalysisWindow, EngagementStore, EntityKey, Grouping, PostId};
use crate::population::PopulationStats;
use crate::stats::{percent_difference, round2};
use crate::storage::StoreError;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Analyzer tuning
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Smallest population thresholds are computed for
    pub min_population: usize,

    /// Post floor for the underperformer view
    pub underperformer_min_posts: u32,

    /// Upper bound on each store call
    pub store_timeout: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_population: MIN_CLASSIFIABLE_POPULATION,
            underperformer_min_posts: UNDERPERFORMER_MIN_POSTS,
            store_timeout: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
        }
    }
}

/// One classified entity, as served to API callers
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OpportunityRow {
    pub entity_id: EntityKey,
    pub entity_label: String,
    pub total_posts: u32,
    pub total_engagements: u64,
    pub avg_engagement_per_post: f64,
    pub overall_avg_engagement: f64,

    /// `None` when the overall average is zero
    pub performance_vs_avg_percent: Option<f64>,

    pub opportunity_category: OpportunityLabel,
}

impl OpportunityRow {
    fn new(metric: EntityMetric, stats: &PopulationStats) -> Self {
        let opportunity_category = classify(&metric, stats);
        Self {
            performance_vs_avg_percent: percent_difference(
                metric.avg_engagement_per_post,
                stats.overall_avg_engagement,
            ),
            overall_avg_engagement: round2(stats.overall_avg_engagement),
            entity_id: metric.entity_id,
            entity_label: metric.entity_label,
            total_posts: metric.total_posts,
            total_engagements: metric.total_engagements,
            avg_engagement_per_post: metric.avg_engagement_per_post,
            opportunity_category,
        }
    }
}

/// A high-confidence underperformer with the thresholds it was judged against
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UnderperformerRow {
    #[serde(flatten)]
    pub metric: EntityMetric,
    pub p75_post_count: f64,
    pub p25_engagement_per_post: f64,
    pub overall_avg_engagement: f64,

    /// How far the entity's rate sits below the 25th percentile (zero or negative)
    pub engagement_gap: f64,
}

/// Opportunity analyzer over an engagement store
pub struct Analyzer<S: ?Sized> {
    store: Arc<S>,
    config: AnalyzerConfig,
}

impl<S: EngagementStore + ?Sized> Analyzer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, AnalyzerConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: AnalyzerConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Aggregation stage only: one metric per entity with posts in the window
    ///
    /// Output is ordered by entity id.
    pub async fn entity_metrics(
        &self,
        grouping: Grouping,
        window: &AnalysisWindow,
        cancel: &CancellationToken,
    ) -> Result<Vec<EntityMetric>, AnalysisError> {
        let posts = self
            .call_store(cancel, self.store.posts_published_since(window.start))
            .await?;
        let post_ids: HashSet<PostId> = posts
            .iter()
            .filter(|post| window.contains(post.publish_timestamp))
            .map(|post| post.post_id)
            .collect();

        let engagements = if post_ids.is_empty() {
            Vec::new()
        } else {
            self.call_store(cancel, self.store.engagements_on_posts(&post_ids))
                .await?
        };

        let authors = match grouping {
            Grouping::Author => self.call_store(cancel, self.store.authors()).await?,
            Grouping::Category => Vec::new(),
        };

        let metrics = aggregate(grouping, window, &authors, &posts, &engagements);
        tracing::debug!(
            "Aggregated {} {} metrics from {} posts and {} engagements",
            metrics.len(),
            grouping,
            post_ids.len(),
            engagements.len()
        );
        Ok(metrics)
    }

    /// Classify authors with at least `min_posts` posts in the window
    pub async fn compute_author_opportunities(
        &self,
        window: &AnalysisWindow,
        min_posts: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<OpportunityRow>, AnalysisError> {
        self.opportunities(Grouping::Author, window, min_posts, cancel)
            .await
    }

    /// Classify post categories
    pub async fn compute_category_opportunities(
        &self,
        window: &AnalysisWindow,
        cancel: &CancellationToken,
    ) -> Result<Vec<OpportunityRow>, AnalysisError> {
        self.opportunities(Grouping::Category, window, 0, cancel)
            .await
    }

    /// Entities that post heavily yet sit in the bottom engagement quartile
    ///
    /// Thresholds come from every entity with posts in the window. The configured post
    /// floor only decides which of them may be reported.
    pub async fn detailed_underperformers(
        &self,
        grouping: Grouping,
        window: &AnalysisWindow,
        cancel: &CancellationToken,
    ) -> Result<Vec<UnderperformerRow>, AnalysisError> {
        let floor = self.config.underperformer_min_posts;
        let metrics = self.entity_metrics(grouping, window, cancel).await?;
        if metrics.is_empty() {
            return Ok(Vec::new());
        }
        ensure_not_cancelled(cancel)?;

        let stats = PopulationStats::compute_with_floor(&metrics, self.config.min_population)?;
        let mut rows: Vec<UnderperformerRow> = metrics
            .into_iter()
            .filter(|metric| is_underperformer(metric, &stats, floor))
            .map(|metric| UnderperformerRow {
                engagement_gap: round2(
                    metric.avg_engagement_per_post - stats.p25_engagement_per_post,
                ),
                metric,
                p75_post_count: stats.p75_post_count,
                p25_engagement_per_post: stats.p25_engagement_per_post,
                overall_avg_engagement: round2(stats.overall_avg_engagement),
            })
            .collect();
        rows.sort_by(|a, b| {
            b.metric
                .total_posts
                .cmp(&a.metric.total_posts)
                .then_with(|| a.metric.entity_id.cmp(&b.metric.entity_id))
        });

        tracing::info!(
            "{} {} underperformers out of {} entities",
            rows.len(),
            grouping,
            stats.population
        );
        Ok(rows)
    }

    async fn opportunities(
        &self,
        grouping: Grouping,
        window: &AnalysisWindow,
        min_posts: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<OpportunityRow>, AnalysisError> {
        let mut metrics = self.entity_metrics(grouping, window, cancel).await?;
        metrics.retain(|metric| metric.total_posts >= min_posts);
        if metrics.is_empty() {
            tracing::info!("No {} has posts in the window", grouping);
            return Ok(Vec::new());
        }
        ensure_not_cancelled(cancel)?;

        let stats = PopulationStats::compute_with_floor(&metrics, self.config.min_population)?;
        tracing::debug!("Population thresholds for {}: {:?}", grouping, stats);

        let mut rows: Vec<OpportunityRow> = metrics
            .into_iter()
            .map(|metric| OpportunityRow::new(metric, &stats))
            .collect();
        rows.sort_by(report_order);

        tracing::info!(
            "Classified {} {} entities over {} days",
            rows.len(),
            grouping,
            window.lookback_days
        );
        Ok(rows)
    }

    /// Await a store call, bounded by the configured timeout and the cancellation token
    async fn call_store<T>(
        &self,
        cancel: &CancellationToken,
        query: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, AnalysisError> {
        let timeout = self.config.store_timeout;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AnalysisError::Cancelled),
            result = tokio::time::timeout(timeout, query) => match result {
                Ok(rows) => Ok(rows?),
                Err(_) => Err(StoreError::Timeout { after: timeout }.into()),
            },
        }
    }
}

fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<(), AnalysisError> {
    if cancel.is_cancelled() {
        return Err(AnalysisError::Cancelled);
    }
    Ok(())
}

/// Most posts first, then weakest engagement, then entity id
fn report_order(a: &OpportunityRow, b: &OpportunityRow) -> Ordering {
    b.total_posts
        .cmp(&a.total_posts)
        .then_with(|| a.avg_engagement_per_post.total_cmp(&b.avg_engagement_per_post))
        .then_with(|| a.entity_id.cmp(&b.entity_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_dataset;
    use crate::models::{Author, AuthorId, Engagement, EngagementKind, Post};
    use crate::storage::{Dataset, MemoryStore};
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn window() -> AnalysisWindow {
        AnalysisWindow::trailing(90, fixed_now()).unwrap()
    }

    /// Ten authors; author `i` has `i` posts with `RATES[i - 1]` engagements each
    const RATES: [u64; 10] = [5, 1, 4, 2, 6, 3, 1, 2, 8, 1];
    const CATEGORIES: [&str; 4] = ["A", "B", "C", "D"];

    fn ten_author_dataset() -> Dataset {
        let shape: Vec<(i64, u64)> = RATES
            .iter()
            .enumerate()
            .map(|(index, rate)| (index as i64 + 1, *rate))
            .collect();
        dataset_of(&shape)
    }

    /// Author `i + 1` gets `shape[i].0` posts with `shape[i].1` engagements each
    fn dataset_of(shape: &[(i64, u64)]) -> Dataset {
        let mut dataset = Dataset::default();
        let mut next_post = 1;
        let mut next_engagement = 1;

        for (index, (post_count, rate)) in shape.iter().enumerate() {
            let author_id = index as AuthorId + 1;
            dataset.authors.push(Author {
                author_id,
                name: format!("Author {author_id}"),
                category: CATEGORIES[author_id as usize % 4].to_string(),
                joined_date: None,
            });

            for p in 0..*post_count {
                let published = fixed_now() - ChronoDuration::days(1 + p);
                dataset.posts.push(Post {
                    post_id: next_post,
                    author_id,
                    category: CATEGORIES[author_id as usize % 4].to_string(),
                    publish_timestamp: published,
                    title: format!("Post {next_post}"),
                    content_length: 900,
                    has_media: p % 2 == 0,
                });
                for _ in 0..*rate {
                    dataset.engagements.push(Engagement {
                        engagement_id: next_engagement,
                        post_id: next_post,
                        kind: EngagementKind::View,
                        user_id: Some(500 + next_engagement),
                        engaged_timestamp: published + ChronoDuration::hours(2),
                    });
                    next_engagement += 1;
                }
                next_post += 1;
            }
        }
        dataset
    }

    fn analyzer(dataset: Dataset) -> Analyzer<MemoryStore> {
        Analyzer::new(Arc::new(MemoryStore::new(dataset)))
    }

    fn row_for(rows: &[OpportunityRow], author_id: AuthorId) -> &OpportunityRow {
        rows.iter()
            .find(|row| row.entity_id == EntityKey::Author(author_id))
            .unwrap_or_else(|| panic!("no row for author {author_id}"))
    }

    #[tokio::test]
    async fn test_sample_population_is_too_small() {
        let analyzer = analyzer(sample_dataset(fixed_now()));
        let cancel = CancellationToken::new();

        let metrics = analyzer
            .entity_metrics(Grouping::Author, &window(), &cancel)
            .await
            .unwrap();
        assert_eq!(metrics.len(), 3);

        let result = analyzer
            .compute_author_opportunities(&window(), 0, &cancel)
            .await;
        assert!(matches!(
            result,
            Err(AnalysisError::InsufficientPopulation {
                size: 3,
                required: 4
            })
        ));
    }

    #[tokio::test]
    async fn test_author_opportunity_labels() {
        let analyzer = analyzer(ten_author_dataset());
        let rows = analyzer
            .compute_author_opportunities(&window(), 0, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(rows.len(), 10);
        for id in 1..=3 {
            assert_eq!(row_for(&rows, id).opportunity_category, OpportunityLabel::LowVolume);
        }
        for id in 4..=7 {
            assert_eq!(row_for(&rows, id).opportunity_category, OpportunityLabel::Medium);
        }
        assert_eq!(
            row_for(&rows, 8).opportunity_category,
            OpportunityLabel::HighVolumeLowEngagement
        );
        assert_eq!(
            row_for(&rows, 9).opportunity_category,
            OpportunityLabel::HighVolumeHighEngagement
        );
        assert_eq!(
            row_for(&rows, 10).opportunity_category,
            OpportunityLabel::HighVolumeLowEngagement
        );

        let top = row_for(&rows, 9);
        assert_eq!(top.total_posts, 9);
        assert_eq!(top.total_engagements, 72);
        assert_eq!(top.avg_engagement_per_post, 8.0);
        assert_eq!(top.overall_avg_engagement, 3.3);
        assert_eq!(top.performance_vs_avg_percent, Some(142.42));
        assert_eq!(row_for(&rows, 10).performance_vs_avg_percent, Some(-69.7));
    }

    #[tokio::test]
    async fn test_rows_are_in_report_order() {
        let analyzer = analyzer(ten_author_dataset());
        let rows = analyzer
            .compute_author_opportunities(&window(), 0, &CancellationToken::new())
            .await
            .unwrap();

        let posts: Vec<u32> = rows.iter().map(|row| row.total_posts).collect();
        assert_eq!(posts, vec![10, 9, 8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[tokio::test]
    async fn test_runs_are_deterministic() {
        let analyzer = analyzer(ten_author_dataset());
        let cancel = CancellationToken::new();

        let first = analyzer
            .compute_author_opportunities(&window(), 0, &cancel)
            .await
            .unwrap();
        let second = analyzer
            .compute_author_opportunities(&window(), 0, &cancel)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_min_posts_shrinks_population() {
        let analyzer = analyzer(ten_author_dataset());
        let rows = analyzer
            .compute_author_opportunities(&window(), 5, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|row| row.total_posts >= 5));

        // thresholds over authors 5..=10: p25 = 6.25, p75 = 8.75, mean = 3.5
        assert_eq!(row_for(&rows, 5).opportunity_category, OpportunityLabel::LowVolume);
        assert_eq!(row_for(&rows, 6).opportunity_category, OpportunityLabel::LowVolume);
        assert_eq!(row_for(&rows, 8).opportunity_category, OpportunityLabel::Medium);
        assert_eq!(
            row_for(&rows, 9).opportunity_category,
            OpportunityLabel::HighVolumeHighEngagement
        );
        assert_eq!(row_for(&rows, 10).overall_avg_engagement, 3.5);
    }

    #[tokio::test]
    async fn test_category_opportunities() {
        let analyzer = analyzer(ten_author_dataset());
        let rows = analyzer
            .compute_category_opportunities(&window(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(rows.len(), 4);
        let total_posts: u32 = rows.iter().map(|row| row.total_posts).sum();
        assert_eq!(total_posts, 55);
        for label in ["A", "B", "C", "D"] {
            assert!(rows
                .iter()
                .any(|row| row.entity_id == EntityKey::Category(label.to_string())));
        }
    }

    #[tokio::test]
    async fn test_underperformers() {
        let analyzer = analyzer(ten_author_dataset());
        let rows = analyzer
            .detailed_underperformers(Grouping::Author, &window(), &CancellationToken::new())
            .await
            .unwrap();

        // thresholds over all ten authors: p75 posts 7.75, p25 engagement 1.25
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].metric.entity_id, EntityKey::Author(10));
        assert_eq!(rows[0].p75_post_count, 7.75);
        assert_eq!(rows[0].p25_engagement_per_post, 1.25);
        assert_eq!(rows[0].overall_avg_engagement, 3.3);
        assert_eq!(rows[0].engagement_gap, -0.25);
    }

    #[tokio::test]
    async fn test_underperformer_thresholds_use_whole_population() {
        // seventeen one-post authors, one of them without engagement, and three regulars
        let mut shape: Vec<(i64, u64)> = vec![(1, 4); 17];
        shape[0] = (1, 0);
        shape.extend([(6, 1), (6, 2), (6, 9)]);
        let analyzer = analyzer(dataset_of(&shape));

        let rows = analyzer
            .detailed_underperformers(Grouping::Author, &window(), &CancellationToken::new())
            .await
            .unwrap();

        // p75 posts is 1, so only the post floor keeps author 1 out
        let ids: Vec<EntityKey> = rows.iter().map(|row| row.metric.entity_id.clone()).collect();
        assert_eq!(ids, vec![EntityKey::Author(18), EntityKey::Author(19)]);
        assert!(rows.iter().all(|row| row.p75_post_count == 1.0));
        assert!(rows.iter().all(|row| row.p25_engagement_per_post == 4.0));
        assert_eq!(rows[0].engagement_gap, -3.0);
        assert_eq!(rows[1].engagement_gap, -2.0);
    }

    #[tokio::test]
    async fn test_underperformer_floor_is_configurable() {
        let store = Arc::new(MemoryStore::new(ten_author_dataset()));
        let config = AnalyzerConfig {
            underperformer_min_posts: 11,
            ..AnalyzerConfig::default()
        };
        let rows = Analyzer::with_config(store, config)
            .detailed_underperformers(Grouping::Author, &window(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_empty_window_is_not_an_error() {
        let analyzer = analyzer(Dataset::default());
        let cancel = CancellationToken::new();

        let rows = analyzer
            .compute_author_opportunities(&window(), 0, &cancel)
            .await
            .unwrap();
        assert!(rows.is_empty());

        let rows = analyzer
            .detailed_underperformers(Grouping::Category, &window(), &cancel)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_zero_overall_average_yields_null_percentage() {
        let mut dataset = ten_author_dataset();
        dataset.engagements.clear();

        let analyzer = analyzer(dataset);
        let rows = analyzer
            .compute_author_opportunities(&window(), 0, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(rows.len(), 10);
        for row in &rows {
            assert_eq!(row.avg_engagement_per_post, 0.0);
            assert_eq!(row.overall_avg_engagement, 0.0);
            assert_eq!(row.performance_vs_avg_percent, None);
        }

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert!(json["performance_vs_avg_percent"].is_null());
    }

    #[tokio::test]
    async fn test_cancelled_run() {
        let analyzer = analyzer(ten_author_dataset());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = analyzer
            .compute_author_opportunities(&window(), 0, &cancel)
            .await;
        assert!(matches!(result, Err(AnalysisError::Cancelled)));
    }

    /// Delegates to a memory store, stalling on post queries
    struct SlowStore {
        inner: MemoryStore,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl EngagementStore for SlowStore {
        async fn authors(&self) -> Result<Vec<Author>, StoreError> {
            self.inner.authors().await
        }

        async fn author(&self, id: AuthorId) -> Result<Option<Author>, StoreError> {
            self.inner.author(id).await
        }

        async fn post(&self, id: PostId) -> Result<Option<Post>, StoreError> {
            self.inner.post(id).await
        }

        async fn posts(&self) -> Result<Vec<Post>, StoreError> {
            self.inner.posts().await
        }

        async fn posts_published_since(
            &self,
            since: DateTime<Utc>,
        ) -> Result<Vec<Post>, StoreError> {
            tokio::time::sleep(self.delay).await;
            self.inner.posts_published_since(since).await
        }

        async fn engagements_on_posts(
            &self,
            post_ids: &HashSet<PostId>,
        ) -> Result<Vec<Engagement>, StoreError> {
            self.inner.engagements_on_posts(post_ids).await
        }

        async fn engagements_since(
            &self,
            since: DateTime<Utc>,
        ) -> Result<Vec<Engagement>, StoreError> {
            self.inner.engagements_since(since).await
        }
    }

    /// Delegates to a memory store and cancels the run once authors are fetched
    struct CancellingStore {
        inner: MemoryStore,
        cancel: CancellationToken,
    }

    #[async_trait::async_trait]
    impl EngagementStore for CancellingStore {
        async fn authors(&self) -> Result<Vec<Author>, StoreError> {
            self.cancel.cancel();
            self.inner.authors().await
        }

        async fn author(&self, id: AuthorId) -> Result<Option<Author>, StoreError> {
            self.inner.author(id).await
        }

        async fn post(&self, id: PostId) -> Result<Option<Post>, StoreError> {
            self.inner.post(id).await
        }

        async fn posts(&self) -> Result<Vec<Post>, StoreError> {
            self.inner.posts().await
        }

        async fn posts_published_since(
            &self,
            since: DateTime<Utc>,
        ) -> Result<Vec<Post>, StoreError> {
            self.inner.posts_published_since(since).await
        }

        async fn engagements_on_posts(
            &self,
            post_ids: &HashSet<PostId>,
        ) -> Result<Vec<Engagement>, StoreError> {
            self.inner.engagements_on_posts(post_ids).await
        }

        async fn engagements_since(
            &self,
            since: DateTime<Utc>,
        ) -> Result<Vec<Engagement>, StoreError> {
            self.inner.engagements_since(since).await
        }
    }

    #[tokio::test]
    async fn test_slow_store_times_out() {
        let store = Arc::new(SlowStore {
            inner: MemoryStore::new(ten_author_dataset()),
            delay: Duration::from_secs(5),
        });
        let config = AnalyzerConfig {
            store_timeout: Duration::from_millis(20),
            ..AnalyzerConfig::default()
        };
        let analyzer = Analyzer::with_config(store, config);

        let result = analyzer
            .compute_author_opportunities(&window(), 0, &CancellationToken::new())
            .await;
        match result {
            Err(AnalysisError::UpstreamUnavailable(StoreError::Timeout { after })) => {
                assert_eq!(after, Duration::from_millis(20));
            }
            other => panic!("expected a store timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_between_aggregation_and_classification() {
        let cancel = CancellationToken::new();
        let store = Arc::new(CancellingStore {
            inner: MemoryStore::new(ten_author_dataset()),
            cancel: cancel.clone(),
        });
        let analyzer = Analyzer::new(store);

        let result = analyzer
            .compute_author_opportunities(&window(), 0, &cancel)
            .await;
        assert!(matches!(result, Err(AnalysisError::Cancelled)));
        assert!(cancel.is_cancelled());

        // aggregation itself completed; only classification was skipped
        let metrics = analyzer
            .entity_metrics(Grouping::Author, &window(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(metrics.len(), 10);
    }

    #[tokio::test]
    async fn test_row_json_shape() {
        let analyzer = analyzer(ten_author_dataset());
        let rows = analyzer
            .compute_author_opportunities(&window(), 0, &CancellationToken::new())
            .await
            .unwrap();

        let json = serde_json::to_value(row_for(&rows, 9)).unwrap();
        assert_eq!(json["entity_id"], 9);
        assert_eq!(json["entity_label"], "Author 9");
        assert_eq!(json["total_posts"], 9);
        assert_eq!(json["total_engagements"], 72);
        assert_eq!(json["opportunity_category"], "HIGH_VOLUME_HIGH_ENGAGEMENT");
    }
}
