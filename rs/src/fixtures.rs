//! The three-author sample dataset
//!
//! Alice (Tech) has one post with a view, a like and a share; Bob (Lifestyle) has one post
//! with a comment; Carlos (Tech) has one post with a view. Timestamps are placed relative
//! to `now` so the sample always falls inside the default 90-day window.

use crate::models::{Author, Engagement, EngagementKind, Post};
use crate::storage::Dataset;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Build the sample dataset anchored at `now`
pub fn sample_dataset(now: DateTime<Utc>) -> Dataset {
    let authors = vec![
        author(1, "Alice", "Tech", NaiveDate::from_ymd_opt(2023, 1, 15)),
        author(2, "Bob", "Lifestyle", NaiveDate::from_ymd_opt(2023, 3, 22)),
        author(3, "Carlos", "Tech", NaiveDate::from_ymd_opt(2023, 6, 10)),
    ];

    let alice_post = now - Duration::days(20);
    let bob_post = now - Duration::days(15);
    let carlos_post = now - Duration::days(10);

    let posts = vec![
        Post {
            post_id: 101,
            author_id: 1,
            category: "Tech".to_string(),
            publish_timestamp: alice_post,
            title: "Getting started with Rust".to_string(),
            content_length: 1200,
            has_media: true,
        },
        Post {
            post_id: 102,
            author_id: 2,
            category: "Lifestyle".to_string(),
            publish_timestamp: bob_post,
            title: "Morning routines that stick".to_string(),
            content_length: 800,
            has_media: false,
        },
        Post {
            post_id: 103,
            author_id: 3,
            category: "Tech".to_string(),
            publish_timestamp: carlos_post,
            title: "Indexing strategies for analytics".to_string(),
            content_length: 1500,
            has_media: true,
        },
    ];

    let engagements = vec![
        engagement(2001, 101, EngagementKind::View, Some(501), alice_post + Duration::hours(1)),
        engagement(2002, 101, EngagementKind::Like, Some(502), alice_post + Duration::hours(2)),
        engagement(2003, 102, EngagementKind::Comment, Some(503), bob_post + Duration::hours(3)),
        engagement(2004, 101, EngagementKind::Share, Some(504), alice_post + Duration::hours(5)),
        engagement(2005, 103, EngagementKind::View, None, carlos_post + Duration::hours(1)),
    ];

    Dataset {
        authors,
        posts,
        engagements,
    }
}

fn author(id: i64, name: &str, category: &str, joined_date: Option<NaiveDate>) -> Author {
    Author {
        author_id: id,
        name: name.to_string(),
        category: category.to_string(),
        joined_date,
    }
}

fn engagement(
    id: i64,
    post_id: i64,
    kind: EngagementKind,
    user_id: Option<i64>,
    at: DateTime<Utc>,
) -> Engagement {
    Engagement {
        engagement_id: id,
        post_id,
        kind,
        user_id,
        engaged_timestamp: at,
    }
}
