//! Metric aggregation: per-entity post volume and engagement rate within a window
//!
//! Only the post publish timestamp is windowed. An engagement counts toward its post's
//! entity whenever the post itself was published in the window, whatever the engagement's
//! own timestamp. The rule is the same for author and category grouping.

use crate::models::{
    AnalysisWindow, Author, AuthorId, Engagement, EngagementId, EntityKey, Grouping, Post, PostId,
};
use crate::stats::ratio_or_zero;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Volume and engagement of one entity within one window
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EntityMetric {
    pub entity_id: EntityKey,
    pub entity_label: String,

    /// Distinct posts published in the window
    pub total_posts: u32,

    /// Engagements of any kind on those posts
    pub total_engagements: u64,

    /// `total_engagements / total_posts`, rounded to two places
    pub avg_engagement_per_post: f64,
}

#[derive(Default)]
struct Tally {
    posts: u32,
    engagements: u64,
}

/// Aggregate raw rows into one metric per entity with at least one post in the window
///
/// For author grouping, posts whose author is unknown are skipped, as an inner join on
/// the authors table would. Duplicate post or engagement rows are counted once.
pub fn aggregate(
    grouping: Grouping,
    window: &AnalysisWindow,
    authors: &[Author],
    posts: &[Post],
    engagements: &[Engagement],
) -> Vec<EntityMetric> {
    let author_names: HashMap<AuthorId, &str> = authors
        .iter()
        .map(|author| (author.author_id, author.name.as_str()))
        .collect();

    let mut labels: HashMap<EntityKey, String> = HashMap::new();
    let mut post_owner: HashMap<PostId, EntityKey> = HashMap::new();
    let mut tallies: BTreeMap<EntityKey, Tally> = BTreeMap::new();

    for post in posts {
        if !window.contains(post.publish_timestamp) || post_owner.contains_key(&post.post_id) {
            continue;
        }

        let (key, label) = match grouping {
            Grouping::Author => match author_names.get(&post.author_id) {
                Some(name) => (EntityKey::Author(post.author_id), name.to_string()),
                None => {
                    tracing::debug!(
                        "Skipping post {} with unknown author {}",
                        post.post_id,
                        post.author_id
                    );
                    continue;
                }
            },
            Grouping::Category => (
                EntityKey::Category(post.category.clone()),
                post.category.clone(),
            ),
        };

        tallies.entry(key.clone()).or_default().posts += 1;
        labels.entry(key.clone()).or_insert(label);
        post_owner.insert(post.post_id, key);
    }

    let mut seen: HashSet<EngagementId> = HashSet::new();
    for engagement in engagements {
        let Some(key) = post_owner.get(&engagement.post_id) else {
            continue;
        };
        if !seen.insert(engagement.engagement_id) {
            continue;
        }
        if let Some(tally) = tallies.get_mut(key) {
            tally.engagements += 1;
        }
    }

    tallies
        .into_iter()
        .map(|(key, tally)| EntityMetric {
            entity_label: labels.remove(&key).unwrap_or_default(),
            total_posts: tally.posts,
            total_engagements: tally.engagements,
            avg_engagement_per_post: ratio_or_zero(tally.engagements, u64::from(tally.posts)),
            entity_id: key,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_dataset;
    use crate::models::EngagementKind;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn window() -> AnalysisWindow {
        AnalysisWindow::trailing(90, fixed_now()).unwrap()
    }

    fn metric_for<'a>(metrics: &'a [EntityMetric], key: &EntityKey) -> &'a EntityMetric {
        metrics
            .iter()
            .find(|m| &m.entity_id == key)
            .unwrap_or_else(|| panic!("no metric for {key}"))
    }

    fn post(id: i64, author_id: i64, category: &str, published: DateTime<Utc>) -> Post {
        Post {
            post_id: id,
            author_id,
            category: category.to_string(),
            publish_timestamp: published,
            title: format!("post {id}"),
            content_length: 1000,
            has_media: false,
        }
    }

    fn engagement(id: i64, post_id: i64, at: DateTime<Utc>) -> Engagement {
        Engagement {
            engagement_id: id,
            post_id,
            kind: EngagementKind::View,
            user_id: None,
            engaged_timestamp: at,
        }
    }

    #[test]
    fn test_sample_author_metrics() {
        let data = sample_dataset(fixed_now());
        let metrics = aggregate(
            Grouping::Author,
            &window(),
            &data.authors,
            &data.posts,
            &data.engagements,
        );

        assert_eq!(metrics.len(), 3);

        let alice = metric_for(&metrics, &EntityKey::Author(1));
        assert_eq!(alice.entity_label, "Alice");
        assert_eq!(alice.total_posts, 1);
        assert_eq!(alice.total_engagements, 3);
        assert_eq!(alice.avg_engagement_per_post, 3.0);

        let bob = metric_for(&metrics, &EntityKey::Author(2));
        assert_eq!(bob.total_engagements, 1);
        assert_eq!(bob.avg_engagement_per_post, 1.0);

        let carlos = metric_for(&metrics, &EntityKey::Author(3));
        assert_eq!(carlos.total_engagements, 1);
        assert_eq!(carlos.avg_engagement_per_post, 1.0);
    }

    #[test]
    fn test_sample_category_metrics() {
        let data = sample_dataset(fixed_now());
        let metrics = aggregate(
            Grouping::Category,
            &window(),
            &data.authors,
            &data.posts,
            &data.engagements,
        );

        assert_eq!(metrics.len(), 2);

        let tech = metric_for(&metrics, &EntityKey::Category("Tech".to_string()));
        assert_eq!(tech.total_posts, 2);
        assert_eq!(tech.total_engagements, 4);
        assert_eq!(tech.avg_engagement_per_post, 2.0);

        let lifestyle = metric_for(&metrics, &EntityKey::Category("Lifestyle".to_string()));
        assert_eq!(lifestyle.total_posts, 1);
        assert_eq!(lifestyle.total_engagements, 1);
    }

    #[test]
    fn test_author_without_posts_in_window_is_excluded() {
        let mut data = sample_dataset(fixed_now());
        data.authors.push(Author {
            author_id: 4,
            name: "Dana".to_string(),
            category: "Health".to_string(),
            joined_date: None,
        });
        // Dana's only post predates the window
        data.posts
            .push(post(104, 4, "Health", fixed_now() - Duration::days(200)));
        data.engagements
            .push(engagement(3001, 104, fixed_now() - Duration::days(1)));

        let metrics = aggregate(
            Grouping::Author,
            &window(),
            &data.authors,
            &data.posts,
            &data.engagements,
        );

        assert_eq!(metrics.len(), 3);
        assert!(metrics.iter().all(|m| m.entity_id != EntityKey::Author(4)));
        assert!(metrics.iter().all(|m| m.total_posts > 0));
    }

    #[test]
    fn test_old_engagements_on_window_posts_count() {
        let authors = vec![Author {
            author_id: 1,
            name: "Alice".to_string(),
            category: "Tech".to_string(),
            joined_date: None,
        }];
        let published = fixed_now() - Duration::days(5);
        let posts = vec![post(1, 1, "Tech", published)];
        let engagements = vec![
            engagement(1, 1, published + Duration::hours(1)),
            // recorded before the window opened; still counted
            engagement(2, 1, fixed_now() - Duration::days(400)),
        ];

        let metrics = aggregate(Grouping::Author, &window(), &authors, &posts, &engagements);
        assert_eq!(metrics[0].total_engagements, 2);
    }

    #[test]
    fn test_duplicates_are_counted_once() {
        let authors = vec![Author {
            author_id: 1,
            name: "Alice".to_string(),
            category: "Tech".to_string(),
            joined_date: None,
        }];
        let published = fixed_now() - Duration::days(5);
        let posts = vec![
            post(1, 1, "Tech", published),
            post(1, 1, "Tech", published),
            post(2, 1, "Tech", published),
        ];
        let engagements = vec![
            engagement(10, 1, published),
            engagement(10, 1, published),
            engagement(11, 2, published),
            engagement(12, 2, published),
        ];

        let metrics = aggregate(Grouping::Author, &window(), &authors, &posts, &engagements);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].total_posts, 2);
        assert_eq!(metrics[0].total_engagements, 3);
        assert_eq!(metrics[0].avg_engagement_per_post, 1.5);
    }

    #[test]
    fn test_posts_without_engagement_average_zero() {
        let authors = vec![Author {
            author_id: 1,
            name: "Quiet".to_string(),
            category: "Tech".to_string(),
            joined_date: None,
        }];
        let posts = vec![post(1, 1, "Tech", fixed_now() - Duration::days(1))];

        let metrics = aggregate(Grouping::Author, &window(), &authors, &posts, &[]);
        assert_eq!(metrics[0].total_posts, 1);
        assert_eq!(metrics[0].total_engagements, 0);
        assert_eq!(metrics[0].avg_engagement_per_post, 0.0);
    }

    #[test]
    fn test_unknown_author_is_skipped() {
        let posts = vec![post(1, 42, "Tech", fixed_now() - Duration::days(1))];
        let engagements = vec![engagement(1, 1, fixed_now())];

        assert!(aggregate(Grouping::Author, &window(), &[], &posts, &engagements).is_empty());

        let by_category = aggregate(Grouping::Category, &window(), &[], &posts, &engagements);
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].total_engagements, 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(Grouping::Author, &window(), &[], &[], &[]).is_empty());
    }
}
