//! Database Connection Pool using sqlx

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;
use uuid::Uuid;

use crate::database::Store;
use crate::database::feeds::FeedRepository;
use crate::database::market::MarketRepository;
use crate::database::users::UserRepository;
use crate::error::StoreError;
use crate::models::{
    CommunityPost, LearningCertification, MarketQuote, MarketSeries, NewsItem, SeriesInterval,
    TalentJob, User,
};

const SCHEMA: &[(&str, &str)] = &[
    ("market schema", "CREATE SCHEMA IF NOT EXISTS market"),
    ("feeds schema", "CREATE SCHEMA IF NOT EXISTS feeds"),
    ("accounts schema", "CREATE SCHEMA IF NOT EXISTS accounts"),
    (
        "market.quotes",
        r#"
        CREATE TABLE IF NOT EXISTS market.quotes (
            symbol          TEXT PRIMARY KEY,
            label           TEXT NOT NULL,
            price           DOUBLE PRECISION NOT NULL CHECK (price >= 0),
            change          DOUBLE PRECISION NOT NULL,
            change_percent  DOUBLE PRECISION NOT NULL,
            previous_close  DOUBLE PRECISION NOT NULL,
            currency        TEXT NOT NULL DEFAULT 'USD',
            market_cap      DOUBLE PRECISION,
            volume          BIGINT,
            provider        TEXT NOT NULL DEFAULT 'simulated',
            updated_at      TIMESTAMPTZ NOT NULL
        )
        "#,
    ),
    (
        "market.series",
        r#"
        CREATE TABLE IF NOT EXISTS market.series (
            symbol          TEXT NOT NULL,
            bar_interval    TEXT NOT NULL CHECK (bar_interval IN ('15m', '1h', '1d', '1w')),
            data            JSONB NOT NULL DEFAULT '[]'::jsonb,
            provider        TEXT NOT NULL DEFAULT 'simulated',
            last_refreshed  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (symbol, bar_interval)
        )
        "#,
    ),
    (
        "feeds.news",
        r#"
        CREATE TABLE IF NOT EXISTS feeds.news (
            url             TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            summary         TEXT NOT NULL,
            source          TEXT NOT NULL,
            tickers         TEXT[] NOT NULL DEFAULT '{}',
            published_at    TIMESTAMPTZ NOT NULL,
            sentiment       TEXT NOT NULL DEFAULT 'neutral'
                            CHECK (sentiment IN ('positive', 'neutral', 'negative')),
            thumbnail_url   TEXT,
            provider        TEXT NOT NULL DEFAULT 'simulated',
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "feeds.news index",
        "CREATE INDEX IF NOT EXISTS news_published_at_idx ON feeds.news (published_at DESC)",
    ),
    (
        "feeds.jobs",
        r#"
        CREATE TABLE IF NOT EXISTS feeds.jobs (
            url             TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            company         TEXT NOT NULL,
            location        TEXT NOT NULL,
            remote          BOOLEAN NOT NULL,
            tags            TEXT[] NOT NULL DEFAULT '{}',
            posted_at       TIMESTAMPTZ NOT NULL,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "feeds.jobs index",
        "CREATE INDEX IF NOT EXISTS jobs_posted_at_idx ON feeds.jobs (posted_at DESC)",
    ),
    (
        "feeds.community_posts",
        r#"
        CREATE TABLE IF NOT EXISTS feeds.community_posts (
            url             TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            forum           TEXT NOT NULL,
            forum_label     TEXT NOT NULL,
            author          TEXT NOT NULL,
            score           BIGINT NOT NULL,
            comments        BIGINT NOT NULL,
            thumbnail       TEXT,
            created_at      TIMESTAMPTZ NOT NULL,
            updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "feeds.community_posts index",
        "CREATE INDEX IF NOT EXISTS community_posts_forum_idx \
         ON feeds.community_posts (forum, created_at DESC)",
    ),
    (
        "feeds.certifications",
        r#"
        CREATE TABLE IF NOT EXISTS feeds.certifications (
            url             TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            provider        TEXT NOT NULL,
            duration        TEXT NOT NULL,
            format          TEXT NOT NULL,
            cost_range      TEXT NOT NULL,
            description     TEXT NOT NULL,
            image_url       TEXT,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at      TIMESTAMPTZ NOT NULL
        )
        "#,
    ),
    (
        "accounts.users",
        r#"
        CREATE TABLE IF NOT EXISTS accounts.users (
            id              UUID PRIMARY KEY,
            email           TEXT NOT NULL UNIQUE,
            username        TEXT NOT NULL UNIQUE,
            password_hash   TEXT NOT NULL,
            roles           TEXT[] NOT NULL DEFAULT '{member}',
            communities     TEXT[] NOT NULL DEFAULT '{global}',
            name            TEXT,
            bio             TEXT CHECK (char_length(bio) <= 500),
            avatar_url      TEXT,
            headline        TEXT CHECK (char_length(headline) <= 120),
            last_login_at   TIMESTAMPTZ,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
];

/// PostgreSQL-backed [`Store`]. Opened by the process entry point and
/// closed explicitly on shutdown.
pub struct DatabasePool {
    pool: PgPool,
    market: MarketRepository,
    feeds: FeedRepository,
    users: UserRepository,
}

impl DatabasePool {
    pub async fn connect(connection_string: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(connection_string)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to connect to PostgreSQL: {}", e)))?;

        info!("Connected to PostgreSQL");

        Ok(Self {
            market: MarketRepository::new(pool.clone()),
            feeds: FeedRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
        })
    }

    /// Create schemas, tables and indexes if missing.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        info!("Initializing database schema...");

        for (name, statement) in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Database(format!("Failed to create {}: {}", name, e)))?;
        }

        info!("Database schema initialized");
        Ok(())
    }

}

#[async_trait]
impl Store for DatabasePool {
    async fn upsert_quote(&self, quote: &MarketQuote) -> Result<(), StoreError> {
        self.market.upsert_quote(quote).await
    }

    async fn upsert_series(&self, series: &MarketSeries) -> Result<(), StoreError> {
        self.market.upsert_series(series).await
    }

    async fn upsert_news(&self, item: &NewsItem) -> Result<(), StoreError> {
        self.feeds.upsert_news(item).await
    }

    async fn upsert_job(&self, job: &TalentJob) -> Result<(), StoreError> {
        self.feeds.upsert_job(job).await
    }

    async fn upsert_post(&self, post: &CommunityPost) -> Result<(), StoreError> {
        self.feeds.upsert_post(post).await
    }

    async fn upsert_certification(
        &self,
        cert: &LearningCertification,
    ) -> Result<(), StoreError> {
        self.feeds.upsert_certification(cert).await
    }

    async fn latest_quotes(&self, limit: usize) -> Result<Vec<MarketQuote>, StoreError> {
        self.market.latest_quotes(limit).await
    }

    async fn find_series(
        &self,
        symbol: &str,
        interval: SeriesInterval,
    ) -> Result<Option<MarketSeries>, StoreError> {
        self.market.find_series(symbol, interval).await
    }

    async fn latest_news(&self, limit: usize) -> Result<Vec<NewsItem>, StoreError> {
        self.feeds.latest_news(limit).await
    }

    async fn latest_jobs(&self, limit: usize) -> Result<Vec<TalentJob>, StoreError> {
        self.feeds.latest_jobs(limit).await
    }

    async fn latest_certifications(
        &self,
        limit: usize,
    ) -> Result<Vec<LearningCertification>, StoreError> {
        self.feeds.latest_certifications(limit).await
    }

    async fn posts_for_forums(
        &self,
        forums: &[String],
        limit: usize,
    ) -> Result<Vec<CommunityPost>, StoreError> {
        self.feeds.posts_for_forums(forums, limit).await
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        self.users.insert_user(user).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.users.find_by_email(email).await
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.users.find_by_id(id).await
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.users.record_login(id, at).await
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL pool closed");
    }
}
