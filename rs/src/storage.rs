//! Engagement store implementations
//!
//! `FileStore` reads a directory of JSON tables (`authors.json`, `posts.json`,
//! `engagements.json`) exported from the relational schema. `MemoryStore` serves a
//! dataset held in memory, for tests and embedders.

use crate::models::{Author, AuthorId, Engagement, EngagementStore, Post, PostId};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;

const AUTHORS_TABLE: &str = "authors";
const POSTS_TABLE: &str = "posts";
const ENGAGEMENTS_TABLE: &str = "engagements";

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store directory error: {message}")]
    Directory { message: String },

    #[error("Missing table file: {}", path.display())]
    MissingTable { path: PathBuf },

    #[error("Store call timed out after {after:?}")]
    Timeout { after: Duration },
}

/// The three tables the analytics read
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub authors: Vec<Author>,
    pub posts: Vec<Post>,
    pub engagements: Vec<Engagement>,
}

impl Dataset {
    pub fn author(&self, id: AuthorId) -> Option<&Author> {
        self.authors.iter().find(|author| author.author_id == id)
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|post| post.post_id == id)
    }

    pub fn posts_published_since(&self, since: DateTime<Utc>) -> Vec<Post> {
        self.posts
            .iter()
            .filter(|post| post.publish_timestamp >= since)
            .cloned()
            .collect()
    }

    pub fn engagements_on_posts(&self, post_ids: &HashSet<PostId>) -> Vec<Engagement> {
        self.engagements
            .iter()
            .filter(|engagement| post_ids.contains(&engagement.post_id))
            .cloned()
            .collect()
    }

    pub fn engagements_since(&self, since: DateTime<Utc>) -> Vec<Engagement> {
        self.engagements
            .iter()
            .filter(|engagement| engagement.engaged_timestamp >= since)
            .cloned()
            .collect()
    }
}

/// In-memory store over a fixed dataset
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    dataset: Dataset,
}

impl MemoryStore {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

#[async_trait::async_trait]
impl EngagementStore for MemoryStore {
    async fn authors(&self) -> Result<Vec<Author>, StoreError> {
        Ok(self.dataset.authors.clone())
    }

    async fn author(&self, id: AuthorId) -> Result<Option<Author>, StoreError> {
        Ok(self.dataset.author(id).cloned())
    }

    async fn post(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        Ok(self.dataset.post(id).cloned())
    }

    async fn posts(&self) -> Result<Vec<Post>, StoreError> {
        Ok(self.dataset.posts.clone())
    }

    async fn posts_published_since(&self, since: DateTime<Utc>) -> Result<Vec<Post>, StoreError> {
        Ok(self.dataset.posts_published_since(since))
    }

    async fn engagements_on_posts(
        &self,
        post_ids: &HashSet<PostId>,
    ) -> Result<Vec<Engagement>, StoreError> {
        Ok(self.dataset.engagements_on_posts(post_ids))
    }

    async fn engagements_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Engagement>, StoreError> {
        Ok(self.dataset.engagements_since(since))
    }
}

/// File-based store
///
/// Tables are read once, on first use, and served from an in-memory cache afterwards.
pub struct FileStore {
    /// Directory holding the table files
    store_dir: PathBuf,

    /// In-memory copy of the tables
    cache: RwLock<Dataset>,

    /// Whether the cache has been loaded
    cache_loaded: RwLock<bool>,
}

impl FileStore {
    /// Open an existing store directory
    ///
    /// Table files are not read until the first query.
    pub async fn open<P: AsRef<Path>>(store_dir: P) -> Result<Self, StoreError> {
        let store_dir = store_dir.as_ref().to_path_buf();

        let metadata = fs::metadata(&store_dir)
            .await
            .map_err(|e| StoreError::Directory {
                message: format!("{}: {}", store_dir.display(), e),
            })?;
        if !metadata.is_dir() {
            return Err(StoreError::Directory {
                message: format!("{} is not a directory", store_dir.display()),
            });
        }

        Ok(Self {
            store_dir,
            cache: RwLock::new(Dataset::default()),
            cache_loaded: RwLock::new(false),
        })
    }

    /// Write a dataset as table files, creating the directory if needed
    pub async fn write_dataset<P: AsRef<Path>>(
        store_dir: P,
        dataset: &Dataset,
    ) -> Result<(), StoreError> {
        let store_dir = store_dir.as_ref();
        if !store_dir.exists() {
            fs::create_dir_all(store_dir).await?;
        }

        write_table(&table_path(store_dir, AUTHORS_TABLE), &dataset.authors).await?;
        write_table(&table_path(store_dir, POSTS_TABLE), &dataset.posts).await?;
        write_table(&table_path(store_dir, ENGAGEMENTS_TABLE), &dataset.engagements).await?;

        tracing::info!(
            "Wrote {} authors, {} posts, {} engagements to {}",
            dataset.authors.len(),
            dataset.posts.len(),
            dataset.engagements.len(),
            store_dir.display()
        );
        Ok(())
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    /// Load all tables into cache if not already loaded
    async fn ensure_cache_loaded(&self) -> Result<(), StoreError> {
        let cache_loaded = *self.cache_loaded.read().await;
        if cache_loaded {
            return Ok(());
        }

        let mut cache = self.cache.write().await;
        let mut cache_loaded_guard = self.cache_loaded.write().await;

        // Double-check in case another task loaded while we were waiting
        if *cache_loaded_guard {
            return Ok(());
        }

        tracing::info!("Loading engagement tables from {}", self.store_dir.display());
        let start = std::time::Instant::now();

        let dataset = Dataset {
            authors: load_table(&table_path(&self.store_dir, AUTHORS_TABLE)).await?,
            posts: load_table(&table_path(&self.store_dir, POSTS_TABLE)).await?,
            engagements: load_table(&table_path(&self.store_dir, ENGAGEMENTS_TABLE)).await?,
        };

        tracing::info!(
            "Loaded {} authors, {} posts, {} engagements in {:?}",
            dataset.authors.len(),
            dataset.posts.len(),
            dataset.engagements.len(),
            start.elapsed()
        );

        *cache = dataset;
        *cache_loaded_guard = true;
        Ok(())
    }

    async fn with_dataset<R>(&self, query: impl FnOnce(&Dataset) -> R) -> Result<R, StoreError> {
        self.ensure_cache_loaded().await?;
        let cache = self.cache.read().await;
        Ok(query(&*cache))
    }
}

fn table_path(store_dir: &Path, table: &str) -> PathBuf {
    store_dir.join(format!("{table}.json"))
}

async fn load_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StoreError::MissingTable {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_str(&content)?)
}

async fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(rows)?;
    fs::write(path, content).await?;
    Ok(())
}

#[async_trait::async_trait]
impl EngagementStore for FileStore {
    async fn authors(&self) -> Result<Vec<Author>, StoreError> {
        self.with_dataset(|dataset| dataset.authors.clone()).await
    }

    async fn author(&self, id: AuthorId) -> Result<Option<Author>, StoreError> {
        self.with_dataset(|dataset| dataset.author(id).cloned()).await
    }

    async fn post(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        self.with_dataset(|dataset| dataset.post(id).cloned()).await
    }

    async fn posts(&self) -> Result<Vec<Post>, StoreError> {
        self.with_dataset(|dataset| dataset.posts.clone()).await
    }

    async fn posts_published_since(&self, since: DateTime<Utc>) -> Result<Vec<Post>, StoreError> {
        self.with_dataset(|dataset| dataset.posts_published_since(since))
            .await
    }

    async fn engagements_on_posts(
        &self,
        post_ids: &HashSet<PostId>,
    ) -> Result<Vec<Engagement>, StoreError> {
        self.with_dataset(|dataset| dataset.engagements_on_posts(post_ids))
            .await
    }

    async fn engagements_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Engagement>, StoreError> {
        self.with_dataset(|dataset| dataset.engagements_since(since))
            .await
    }
}
