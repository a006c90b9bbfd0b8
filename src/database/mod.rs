//! Persistence
//!
//! [`Store`] is the handle the HTTP layer and the ingestion scheduler share.
//! [`DatabasePool`] backs it with PostgreSQL; [`MemoryStore`] keeps
//! everything in process for development and tests.

pub mod feeds;
pub mod market;
pub mod memory;
pub mod pool;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    CommunityPost, LearningCertification, MarketQuote, MarketSeries, NewsItem, SeriesInterval,
    TalentJob, User,
};

pub use feeds::FeedRepository;
pub use market::MarketRepository;
pub use memory::MemoryStore;
pub use pool::DatabasePool;
pub use users::UserRepository;

/// Storage operations. Content is upserted on its natural key and never
/// deleted; `latest_*` reads return the newest records first.
#[async_trait]
pub trait Store: Send + Sync {
    async fn upsert_quote(&self, quote: &MarketQuote) -> Result<(), StoreError>;
    async fn upsert_series(&self, series: &MarketSeries) -> Result<(), StoreError>;
    async fn upsert_news(&self, item: &NewsItem) -> Result<(), StoreError>;
    async fn upsert_job(&self, job: &TalentJob) -> Result<(), StoreError>;
    async fn upsert_post(&self, post: &CommunityPost) -> Result<(), StoreError>;
    async fn upsert_certification(&self, cert: &LearningCertification)
    -> Result<(), StoreError>;

    /// By `updatedAt`
    async fn latest_quotes(&self, limit: usize) -> Result<Vec<MarketQuote>, StoreError>;
    async fn find_series(
        &self,
        symbol: &str,
        interval: SeriesInterval,
    ) -> Result<Option<MarketSeries>, StoreError>;
    /// By `publishedAt`
    async fn latest_news(&self, limit: usize) -> Result<Vec<NewsItem>, StoreError>;
    /// By `postedAt`
    async fn latest_jobs(&self, limit: usize) -> Result<Vec<TalentJob>, StoreError>;
    /// By `updatedAt`
    async fn latest_certifications(
        &self,
        limit: usize,
    ) -> Result<Vec<LearningCertification>, StoreError>;
    /// Posts in any of `forums`, by `createdAt`
    async fn posts_for_forums(
        &self,
        forums: &[String],
        limit: usize,
    ) -> Result<Vec<CommunityPost>, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the email or username is taken.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Release connections. The handle must not be used afterwards.
    async fn close(&self);
}
