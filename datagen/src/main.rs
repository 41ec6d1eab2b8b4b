//! Reach Dataset Generator
//!
//! Writes a synthetic authors/posts/engagements dataset into a store directory, on top of
//! the three-author sample. Post times lean toward business hours and engagements decay
//! exponentially after publication.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use reach::constants::MAX_LOOKBACK_DAYS;
use reach::fixtures::sample_dataset;
use reach::{Author, Dataset, Engagement, EngagementKind, FileStore, Post};
use std::path::PathBuf;

const CATEGORIES: [&str; 6] = [
    "Tech",
    "Lifestyle",
    "Business",
    "Health",
    "Entertainment",
    "Education",
];
const AUTHOR_CATEGORIES: [&str; 5] = ["Tech", "Lifestyle", "Business", "Health", "Entertainment"];

/// Relative weight of each publish hour, 00:00 through 23:00
const PUBLISH_HOUR_WEIGHTS: [u32; 24] = [
    1, 1, 1, 1, 2, 3, 4, 5, 6, 7, 8, 7, 6, 5, 4, 3, 2, 2, 1, 1, 1, 1, 1, 1,
];

const ENGAGEMENT_KINDS: [EngagementKind; 4] = [
    EngagementKind::View,
    EngagementKind::Like,
    EngagementKind::Comment,
    EngagementKind::Share,
];
const ENGAGEMENT_KIND_WEIGHTS: [f64; 4] = [0.7, 0.2, 0.07, 0.03];

/// Hour shifts -3..=3 applied to engagement times
const HOUR_JITTER_WEIGHTS: [u32; 7] = [1, 2, 3, 4, 3, 2, 1];

/// Engagements per hour after publication decay at this rate
const ENGAGEMENT_DECAY_RATE: f64 = 0.1;
const MAX_HOURS_AFTER_PUBLISH: f64 = 720.0;

const FIRST_NAMES: [&str; 16] = [
    "Amara", "Ben", "Chloe", "Diego", "Elena", "Farid", "Grace", "Hiro", "Isla", "Jonas", "Kavya",
    "Liam", "Maya", "Noah", "Olga", "Priya",
];
const LAST_NAMES: [&str; 12] = [
    "Adeyemi", "Berg", "Castillo", "Dubois", "Evans", "Fischer", "Gupta", "Haddad", "Ito",
    "Jensen", "Kowalski", "Larsen",
];
const TITLE_WORDS: [&str; 24] = [
    "guide", "habits", "future", "lessons", "simple", "practical", "growth", "data", "quiet",
    "teams", "morning", "budget", "design", "small", "wins", "notes", "weekly", "mistakes",
    "focus", "better", "tools", "stories", "ideas", "patterns",
];

/// First ids after the sample rows
const FIRST_AUTHOR_ID: i64 = 4;
const FIRST_POST_ID: i64 = 104;
const FIRST_ENGAGEMENT_ID: i64 = 2006;
const SAMPLE_USER_IDS: std::ops::RangeInclusive<i64> = 501..=505;
const FIRST_USER_ID: i64 = 506;

#[derive(Parser)]
#[command(
    name = "datagen",
    about = "Generate a synthetic engagement dataset for the Reach server",
    long_about = r#"
Generate a synthetic engagement dataset for the Reach server

The three sample authors, posts and engagements are always included.

Examples:
  cargo run -p datagen                          # 50 authors, 10k posts, 100k engagements
  cargo run -p datagen -- --sample              # sample rows only
  cargo run -p datagen -- --seed 7 --posts 500  # reproducible, smaller dataset
  cargo run -p datagen -- --data-dir ~/my-reach
"#
)]
struct Args {
    /// Store directory to write the tables into
    #[arg(long, default_value_os_t = default_data_dir())]
    data_dir: PathBuf,

    /// Number of generated authors
    #[arg(long, default_value_t = 50)]
    authors: usize,

    /// Number of generated posts
    #[arg(long, default_value_t = 10_000)]
    posts: usize,

    /// Number of generated engagements
    #[arg(long, default_value_t = 100_000)]
    engagements: usize,

    /// Size of the generated user pool
    #[arg(long, default_value_t = 5_000)]
    users: usize,

    /// Posts are spread over this many trailing days
    #[arg(long, default_value_t = 180)]
    days: i64,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Write only the sample rows
    #[arg(long)]
    sample: bool,
}

fn default_data_dir() -> PathBuf {
    home::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".reach")
}

/// Generation sizes
struct Sizes {
    authors: usize,
    posts: usize,
    engagements: usize,
    users: usize,
    days: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter("reach=info,datagen=info")
        .init();

    let now = Utc::now();
    let dataset = if args.sample {
        sample_dataset(now)
    } else {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let sizes = Sizes {
            authors: args.authors,
            posts: args.posts,
            engagements: args.engagements,
            users: args.users,
            days: args.days,
        };
        generate(&mut rng, &sizes, now)?
    };

    FileStore::write_dataset(&args.data_dir, &dataset)
        .await
        .with_context(|| format!("Failed to write dataset to {}", args.data_dir.display()))?;

    println!(
        "✅ Wrote {} authors, {} posts, {} engagements to {}",
        dataset.authors.len(),
        dataset.posts.len(),
        dataset.engagements.len(),
        args.data_dir.display()
    );
    Ok(())
}

/// Build the sample rows plus the requested synthetic rows
fn generate(rng: &mut StdRng, sizes: &Sizes, now: DateTime<Utc>) -> Result<Dataset> {
    if sizes.days <= 0 {
        bail!("--days must be positive, got {}", sizes.days);
    }
    if sizes.days > MAX_LOOKBACK_DAYS {
        bail!("--days must be at most {MAX_LOOKBACK_DAYS}, got {}", sizes.days);
    }

    let mut dataset = sample_dataset(now);
    generate_authors(rng, &mut dataset, sizes.authors, now);
    generate_posts(rng, &mut dataset, sizes.posts, sizes.days, now)?;
    generate_engagements(rng, &mut dataset, sizes.engagements, sizes.users)?;
    Ok(dataset)
}

fn generate_authors(rng: &mut StdRng, dataset: &mut Dataset, count: usize, now: DateTime<Utc>) {
    let today = now.date_naive();
    for offset in 0..count {
        let joined_days_ago = rng.random_range(0..=5 * 365);
        dataset.authors.push(Author {
            author_id: FIRST_AUTHOR_ID + offset as i64,
            name: random_name(rng),
            category: pick(rng, &AUTHOR_CATEGORIES).to_string(),
            joined_date: Some(today - Duration::days(joined_days_ago)),
        });
    }
    tracing::info!("Generated {} authors", count);
}

fn generate_posts(
    rng: &mut StdRng,
    dataset: &mut Dataset,
    count: usize,
    days: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    let hours = WeightedIndex::new(PUBLISH_HOUR_WEIGHTS).context("Invalid publish hour weights")?;
    let authors: Vec<(i64, String)> = dataset
        .authors
        .iter()
        .map(|author| (author.author_id, author.category.clone()))
        .collect();
    let start = now - Duration::days(days);

    for offset in 0..count {
        let Some((author_id, author_category)) = authors.choose(rng) else {
            bail!("Cannot generate posts without authors");
        };

        // Mostly the author's own category, sometimes any category
        let category = if rng.random_bool(0.8) {
            author_category.clone()
        } else {
            pick(rng, &CATEGORIES).to_string()
        };

        let publish_timestamp = start
            + Duration::days(rng.random_range(0..days))
            + Duration::hours(hours.sample(rng) as i64)
            + Duration::minutes(rng.random_range(0..60));

        dataset.posts.push(Post {
            post_id: FIRST_POST_ID + offset as i64,
            author_id: *author_id,
            category,
            publish_timestamp,
            title: random_title(rng),
            content_length: rng.random_range(500..=3000),
            has_media: rng.random_bool(0.6),
        });
    }
    tracing::info!("Generated {} posts", count);
    Ok(())
}

fn generate_engagements(
    rng: &mut StdRng,
    dataset: &mut Dataset,
    count: usize,
    users: usize,
) -> Result<()> {
    let kinds =
        WeightedIndex::new(ENGAGEMENT_KIND_WEIGHTS).context("Invalid engagement kind weights")?;
    let jitter = WeightedIndex::new(HOUR_JITTER_WEIGHTS).context("Invalid hour jitter weights")?;
    let posts: Vec<(i64, DateTime<Utc>)> = dataset
        .posts
        .iter()
        .map(|post| (post.post_id, post.publish_timestamp))
        .collect();
    let user_ids: Vec<i64> = SAMPLE_USER_IDS
        .chain(FIRST_USER_ID..FIRST_USER_ID + users as i64)
        .collect();

    for offset in 0..count {
        let Some((post_id, published)) = posts.choose(rng) else {
            bail!("Cannot generate engagements without posts");
        };

        // 10% anonymous
        let user_id = if rng.random_bool(0.9) {
            user_ids.choose(rng).copied()
        } else {
            None
        };

        let hours_after = exponential(rng, ENGAGEMENT_DECAY_RATE).min(MAX_HOURS_AFTER_PUBLISH);
        let hour_shift = jitter.sample(rng) as i64 - 3;
        let engaged_timestamp = *published
            + Duration::milliseconds((hours_after * 3_600_000.0) as i64)
            + Duration::hours(hour_shift);

        dataset.engagements.push(Engagement {
            engagement_id: FIRST_ENGAGEMENT_ID + offset as i64,
            post_id: *post_id,
            kind: ENGAGEMENT_KINDS[kinds.sample(rng)],
            user_id,
            engaged_timestamp,
        });

        if (offset + 1) % 10_000 == 0 {
            tracing::info!("Generated {} engagements...", offset + 1);
        }
    }
    tracing::info!("Generated {} engagements", count);
    Ok(())
}

/// Exponentially distributed sample with the given rate, by inverse transform
fn exponential(rng: &mut StdRng, rate: f64) -> f64 {
    let u: f64 = rng.random();
    -(1.0 - u).ln() / rate
}

fn pick<'a>(rng: &mut StdRng, values: &[&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

fn random_name(rng: &mut StdRng) -> String {
    format!("{} {}", pick(rng, &FIRST_NAMES), pick(rng, &LAST_NAMES))
}

fn random_title(rng: &mut StdRng) -> String {
    let words: Vec<&str> = (0..6).map(|_| pick(rng, &TITLE_WORDS)).collect();
    let title = words.join(" ");
    let mut chars = title.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn small() -> Sizes {
        Sizes {
            authors: 10,
            posts: 200,
            engagements: 2_000,
            users: 50,
            days: 30,
        }
    }

    #[test]
    fn test_generation_is_reproducible_with_seed() {
        let a = generate(&mut StdRng::seed_from_u64(7), &small(), fixed_now()).unwrap();
        let b = generate(&mut StdRng::seed_from_u64(7), &small(), fixed_now()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_rows_are_kept() {
        let dataset = generate(&mut StdRng::seed_from_u64(1), &small(), fixed_now()).unwrap();
        let sample = sample_dataset(fixed_now());

        assert_eq!(dataset.authors.len(), 13);
        assert_eq!(dataset.posts.len(), 203);
        assert_eq!(dataset.engagements.len(), 2_005);
        assert_eq!(&dataset.authors[..3], &sample.authors[..]);
        assert_eq!(&dataset.posts[..3], &sample.posts[..]);
        assert_eq!(&dataset.engagements[..5], &sample.engagements[..]);
        assert_eq!(dataset.posts[3].post_id, FIRST_POST_ID);
        assert_eq!(dataset.engagements[5].engagement_id, FIRST_ENGAGEMENT_ID);
    }

    #[test]
    fn test_generated_rows_are_consistent() {
        let now = fixed_now();
        let dataset = generate(&mut StdRng::seed_from_u64(3), &small(), now).unwrap();
        let window_start = now - Duration::days(30);

        for author in &dataset.authors[3..] {
            assert!(AUTHOR_CATEGORIES.contains(&author.category.as_str()));
            assert!(author.joined_date.is_some_and(|joined| joined <= now.date_naive()));
        }
        for post in &dataset.posts[3..] {
            assert!(CATEGORIES.contains(&post.category.as_str()));
            assert!(post.publish_timestamp >= window_start);
            assert!(post.publish_timestamp < now);
            assert!((500..=3000).contains(&post.content_length));
            assert!(dataset.author(post.author_id).is_some());
        }
        for engagement in &dataset.engagements[5..] {
            let post = dataset.post(engagement.post_id).unwrap();
            // three hours of jitter at most before publication
            assert!(engagement.engaged_timestamp >= post.publish_timestamp - Duration::hours(3));
            assert!(
                engagement.engaged_timestamp
                    <= post.publish_timestamp + Duration::hours(720 + 3)
            );
        }
    }

    #[test]
    fn test_views_dominate() {
        let dataset = generate(&mut StdRng::seed_from_u64(11), &small(), fixed_now()).unwrap();
        let views = dataset
            .engagements
            .iter()
            .filter(|e| e.kind == EngagementKind::View)
            .count();
        assert!(views * 2 > dataset.engagements.len());
    }

    #[test]
    fn test_days_must_be_positive() {
        let sizes = Sizes { days: 0, ..small() };
        assert!(generate(&mut StdRng::seed_from_u64(1), &sizes, fixed_now()).is_err());
    }

    #[test]
    fn test_days_are_capped() {
        let sizes = Sizes {
            days: i64::MAX,
            ..small()
        };
        let err = generate(&mut StdRng::seed_from_u64(1), &sizes, fixed_now()).unwrap_err();
        assert!(err.to_string().contains("at most"));

        let sizes = Sizes {
            days: MAX_LOOKBACK_DAYS,
            ..small()
        };
        let dataset = generate(&mut StdRng::seed_from_u64(1), &sizes, fixed_now()).unwrap();
        assert!(!dataset.posts.is_empty());
    }

    #[test]
    fn test_titles_are_capitalized() {
        let mut rng = StdRng::seed_from_u64(5);
        let title = random_title(&mut rng);
        assert!(title.chars().next().unwrap().is_uppercase());
        assert_eq!(title.split(' ').count(), 6);
    }
}
