//! Feed Repository - news, jobs, community posts and certifications using sqlx
//!
//! Every table is keyed by `url`; upserts keep `created_at` from the first insert.

use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::debug;

use crate::error::StoreError;
use crate::models::{CommunityPost, LearningCertification, NewsItem, TalentJob};

pub struct FeedRepository {
    pool: PgPool,
}

impl FeedRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert_news(&self, item: &NewsItem) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO feeds.news
            (url, title, summary, source, tickers, published_at, sentiment,
             thumbnail_url, provider, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (url) DO UPDATE SET
                title = EXCLUDED.title,
                summary = EXCLUDED.summary,
                source = EXCLUDED.source,
                tickers = EXCLUDED.tickers,
                published_at = EXCLUDED.published_at,
                sentiment = EXCLUDED.sentiment,
                thumbnail_url = EXCLUDED.thumbnail_url,
                provider = EXCLUDED.provider,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&item.url)
        .bind(&item.title)
        .bind(&item.summary)
        .bind(&item.source)
        .bind(&item.tickers)
        .bind(item.published_at)
        .bind(item.sentiment.as_str())
        .bind(&item.thumbnail_url)
        .bind(&item.provider)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(url = %item.url, "News item upserted");
        Ok(())
    }

    pub async fn latest_news(&self, limit: usize) -> Result<Vec<NewsItem>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT url, title, summary, source, tickers, published_at, sentiment,
                   thumbnail_url, provider, created_at, updated_at
            FROM feeds.news
            ORDER BY published_at DESC, url ASC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(news_from_row).collect()
    }

    pub async fn upsert_job(&self, job: &TalentJob) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO feeds.jobs
            (url, title, company, location, remote, tags, posted_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (url) DO UPDATE SET
                title = EXCLUDED.title,
                company = EXCLUDED.company,
                location = EXCLUDED.location,
                remote = EXCLUDED.remote,
                tags = EXCLUDED.tags,
                posted_at = EXCLUDED.posted_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&job.url)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location)
        .bind(job.remote)
        .bind(&job.tags)
        .bind(job.posted_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(url = %job.url, "Job upserted");
        Ok(())
    }

    pub async fn latest_jobs(&self, limit: usize) -> Result<Vec<TalentJob>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT url, title, company, location, remote, tags, posted_at, updated_at
            FROM feeds.jobs
            ORDER BY posted_at DESC, url ASC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TalentJob {
                url: row.get("url"),
                title: row.get("title"),
                company: row.get("company"),
                location: row.get("location"),
                remote: row.get("remote"),
                tags: row.get("tags"),
                posted_at: row.get("posted_at"),
                updated_at: row.get("updated_at"),
            })
            .collect())
    }

    pub async fn upsert_post(&self, post: &CommunityPost) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO feeds.community_posts
            (url, title, forum, forum_label, author, score, comments, thumbnail,
             created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (url) DO UPDATE SET
                title = EXCLUDED.title,
                forum = EXCLUDED.forum,
                forum_label = EXCLUDED.forum_label,
                author = EXCLUDED.author,
                score = EXCLUDED.score,
                comments = EXCLUDED.comments,
                thumbnail = EXCLUDED.thumbnail,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&post.url)
        .bind(&post.title)
        .bind(&post.forum)
        .bind(&post.forum_label)
        .bind(&post.author)
        .bind(post.score)
        .bind(post.comments)
        .bind(&post.thumbnail)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(url = %post.url, forum = %post.forum, "Community post upserted");
        Ok(())
    }

    pub async fn posts_for_forums(
        &self,
        forums: &[String],
        limit: usize,
    ) -> Result<Vec<CommunityPost>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT url, title, forum, forum_label, author, score, comments, thumbnail,
                   created_at, updated_at
            FROM feeds.community_posts
            WHERE forum = ANY($1)
            ORDER BY created_at DESC, url ASC
            LIMIT $2
            "#,
        )
        .bind(forums)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CommunityPost {
                url: row.get("url"),
                title: row.get("title"),
                forum: row.get("forum"),
                forum_label: row.get("forum_label"),
                author: row.get("author"),
                score: row.get("score"),
                comments: row.get("comments"),
                thumbnail: row.get("thumbnail"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            })
            .collect())
    }

    pub async fn upsert_certification(
        &self,
        cert: &LearningCertification,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO feeds.certifications
            (url, title, provider, duration, format, cost_range, description,
             image_url, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (url) DO UPDATE SET
                title = EXCLUDED.title,
                provider = EXCLUDED.provider,
                duration = EXCLUDED.duration,
                format = EXCLUDED.format,
                cost_range = EXCLUDED.cost_range,
                description = EXCLUDED.description,
                image_url = EXCLUDED.image_url,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&cert.url)
        .bind(&cert.title)
        .bind(&cert.provider)
        .bind(&cert.duration)
        .bind(&cert.format)
        .bind(&cert.cost_range)
        .bind(&cert.description)
        .bind(&cert.image_url)
        .bind(cert.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(url = %cert.url, "Certification upserted");
        Ok(())
    }

    pub async fn latest_certifications(
        &self,
        limit: usize,
    ) -> Result<Vec<LearningCertification>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT url, title, provider, duration, format, cost_range, description,
                   image_url, updated_at
            FROM feeds.certifications
            ORDER BY updated_at DESC, url ASC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| LearningCertification {
                url: row.get("url"),
                title: row.get("title"),
                provider: row.get("provider"),
                duration: row.get("duration"),
                format: row.get("format"),
                cost_range: row.get("cost_range"),
                description: row.get("description"),
                image_url: row.get("image_url"),
                updated_at: row.get("updated_at"),
            })
            .collect())
    }
}

fn news_from_row(row: &PgRow) -> Result<NewsItem, StoreError> {
    let sentiment: String = row.get("sentiment");
    Ok(NewsItem {
        url: row.get("url"),
        title: row.get("title"),
        summary: row.get("summary"),
        source: row.get("source"),
        tickers: row.get("tickers"),
        published_at: row.get("published_at"),
        sentiment: sentiment.parse().map_err(StoreError::Serialization)?,
        thumbnail_url: row.get("thumbnail_url"),
        provider: row.get("provider"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
