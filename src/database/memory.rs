//! In-process [`Store`] used when no database URL is configured, and by tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::Store;
use crate::error::StoreError;
use crate::models::{
    CommunityPost, LearningCertification, MarketQuote, MarketSeries, NewsItem, SeriesInterval,
    TalentJob, User,
};

#[derive(Default)]
struct UserTable {
    by_id: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>,
    by_username: HashMap<String, Uuid>,
}

#[derive(Default)]
pub struct MemoryStore {
    quotes: DashMap<String, MarketQuote>,
    series: DashMap<(String, SeriesInterval), MarketSeries>,
    news: DashMap<String, NewsItem>,
    jobs: DashMap<String, TalentJob>,
    posts: DashMap<String, CommunityPost>,
    certifications: DashMap<String, LearningCertification>,
    users: RwLock<UserTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.by_id.len()
    }
}

/// Newest first by `key`, then truncate to `limit`.
fn newest<T, K, F>(map: &DashMap<String, T>, limit: usize, key: F) -> Vec<T>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut items: Vec<(String, T)> = map
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().clone()))
        .collect();
    items.sort_by(|(a_key, a), (b_key, b)| key(b).cmp(&key(a)).then_with(|| a_key.cmp(b_key)));
    items.into_iter().take(limit).map(|(_, item)| item).collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_quote(&self, quote: &MarketQuote) -> Result<(), StoreError> {
        let mut quote = quote.clone();
        quote.symbol = quote.symbol.to_uppercase();
        self.quotes.insert(quote.symbol.clone(), quote);
        Ok(())
    }

    async fn upsert_series(&self, series: &MarketSeries) -> Result<(), StoreError> {
        let mut series = series.clone();
        series.symbol = series.symbol.to_uppercase();
        self.series
            .insert((series.symbol.clone(), series.interval), series);
        Ok(())
    }

    async fn upsert_news(&self, item: &NewsItem) -> Result<(), StoreError> {
        self.news
            .entry(item.url.clone())
            .and_modify(|existing| {
                let created_at = existing.created_at;
                *existing = item.clone();
                existing.created_at = created_at;
            })
            .or_insert_with(|| item.clone());
        Ok(())
    }

    async fn upsert_job(&self, job: &TalentJob) -> Result<(), StoreError> {
        self.jobs.insert(job.url.clone(), job.clone());
        Ok(())
    }

    async fn upsert_post(&self, post: &CommunityPost) -> Result<(), StoreError> {
        self.posts
            .entry(post.url.clone())
            .and_modify(|existing| {
                let created_at = existing.created_at;
                *existing = post.clone();
                existing.created_at = created_at;
            })
            .or_insert_with(|| post.clone());
        Ok(())
    }

    async fn upsert_certification(
        &self,
        cert: &LearningCertification,
    ) -> Result<(), StoreError> {
        self.certifications.insert(cert.url.clone(), cert.clone());
        Ok(())
    }

    async fn latest_quotes(&self, limit: usize) -> Result<Vec<MarketQuote>, StoreError> {
        Ok(newest(&self.quotes, limit, |q| q.updated_at))
    }

    async fn find_series(
        &self,
        symbol: &str,
        interval: SeriesInterval,
    ) -> Result<Option<MarketSeries>, StoreError> {
        Ok(self
            .series
            .get(&(symbol.to_uppercase(), interval))
            .map(|entry| entry.value().clone()))
    }

    async fn latest_news(&self, limit: usize) -> Result<Vec<NewsItem>, StoreError> {
        Ok(newest(&self.news, limit, |n| n.published_at))
    }

    async fn latest_jobs(&self, limit: usize) -> Result<Vec<TalentJob>, StoreError> {
        Ok(newest(&self.jobs, limit, |j| j.posted_at))
    }

    async fn latest_certifications(
        &self,
        limit: usize,
    ) -> Result<Vec<LearningCertification>, StoreError> {
        Ok(newest(&self.certifications, limit, |c| c.updated_at))
    }

    async fn posts_for_forums(
        &self,
        forums: &[String],
        limit: usize,
    ) -> Result<Vec<CommunityPost>, StoreError> {
        let mut posts: Vec<CommunityPost> = self
            .posts
            .iter()
            .filter(|entry| forums.contains(&entry.value().forum))
            .map(|entry| entry.value().clone())
            .collect();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.url.cmp(&b.url))
        });
        posts.truncate(limit);
        Ok(posts)
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut table = self.users.write().await;

        if table.by_email.contains_key(&user.email) {
            return Err(StoreError::Conflict(format!(
                "email already registered: {}",
                user.email
            )));
        }
        if table.by_username.contains_key(&user.username) {
            return Err(StoreError::Conflict(format!(
                "username already taken: {}",
                user.username
            )));
        }

        table.by_email.insert(user.email.clone(), user.id);
        table.by_username.insert(user.username.clone(), user.id);
        table.by_id.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let table = self.users.read().await;
        Ok(table
            .by_email
            .get(email)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.by_id.get(&id).cloned())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(user) = self.users.write().await.by_id.get_mut(&id) {
            user.last_login_at = Some(at);
            user.updated_at = at;
        }
        Ok(())
    }

    async fn close(&self) {}
}
