//! Refresh routines, one per domain
//!
//! Each routine upserts its records concurrently in a [`JoinSet`] and waits
//! for all of them. One record failing never stops the others; every
//! failure is collected in the [`RefreshReport`].

use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::database::Store;
use crate::error::StoreError;
use crate::ingestion::catalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionDomain {
    Market,
    News,
    Jobs,
    Communities,
    Certifications,
}

impl IngestionDomain {
    pub const ALL: [IngestionDomain; 5] = [
        IngestionDomain::Market,
        IngestionDomain::News,
        IngestionDomain::Jobs,
        IngestionDomain::Communities,
        IngestionDomain::Certifications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IngestionDomain::Market => "market",
            IngestionDomain::News => "news",
            IngestionDomain::Jobs => "jobs",
            IngestionDomain::Communities => "communities",
            IngestionDomain::Certifications => "certifications",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            IngestionDomain::Market => "Market quotes",
            IngestionDomain::News => "News items",
            IngestionDomain::Jobs => "Talent jobs",
            IngestionDomain::Communities => "Community posts",
            IngestionDomain::Certifications => "Learning certifications",
        }
    }
}

impl fmt::Display for IngestionDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFailure {
    /// Natural key of the record
    pub key: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshReport {
    pub domain: IngestionDomain,
    pub attempted: usize,
    pub upserted: usize,
    pub failures: Vec<RecordFailure>,
}

impl RefreshReport {
    pub fn new(domain: IngestionDomain) -> Self {
        Self {
            domain,
            attempted: 0,
            upserted: 0,
            failures: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn absorb(&mut self, other: RefreshReport) {
        self.attempted += other.attempted;
        self.upserted += other.upserted;
        self.failures.extend(other.failures);
    }

    fn log(&self) {
        if self.is_success() {
            info!(
                domain = %self.domain,
                upserted = self.upserted,
                "{} refreshed",
                self.domain.description()
            );
        } else {
            error!(
                domain = %self.domain,
                upserted = self.upserted,
                failed = self.failures.len(),
                "Failed refreshing {}",
                self.domain.description().to_lowercase()
            );
        }
    }
}

/// Spawn one upsert per record and collect the outcome of all of them.
async fn upsert_all<T, F, Fut>(
    store: &Arc<dyn Store>,
    domain: IngestionDomain,
    records: Vec<T>,
    key_of: fn(&T) -> String,
    upsert: F,
) -> RefreshReport
where
    T: Send + 'static,
    F: Fn(Arc<dyn Store>, T) -> Fut,
    Fut: Future<Output = Result<(), StoreError>> + Send + 'static,
{
    let mut report = RefreshReport::new(domain);
    report.attempted = records.len();

    let mut tasks = JoinSet::new();
    for record in records {
        let key = key_of(&record);
        let pending = upsert(Arc::clone(store), record);
        tasks.spawn(async move { (key, pending.await) });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(()))) => report.upserted += 1,
            Ok((key, Err(e))) => {
                warn!(domain = %domain, key = %key, error = %e, "Upsert failed");
                report.failures.push(RecordFailure {
                    key,
                    error: e.to_string(),
                });
            }
            Err(e) => {
                warn!(domain = %domain, error = %e, "Upsert task aborted");
                report.failures.push(RecordFailure {
                    key: String::from("<unknown>"),
                    error: e.to_string(),
                });
            }
        }
    }

    report
}

/// Quotes and their daily series.
pub async fn refresh_market(store: &Arc<dyn Store>) -> RefreshReport {
    let now = Utc::now();
    let domain = IngestionDomain::Market;

    let mut report = upsert_all(
        store,
        domain,
        catalog::quotes(now),
        |quote| quote.symbol.clone(),
        |store, quote| async move { store.upsert_quote(&quote).await },
    )
    .await;

    let series = upsert_all(
        store,
        domain,
        catalog::series(now),
        |series| format!("{}/{}", series.symbol, series.interval),
        |store, series| async move { store.upsert_series(&series).await },
    )
    .await;
    report.absorb(series);

    report.log();
    report
}

pub async fn refresh_news(store: &Arc<dyn Store>) -> RefreshReport {
    let report = upsert_all(
        store,
        IngestionDomain::News,
        catalog::news(Utc::now()),
        |item| item.url.clone(),
        |store, item| async move { store.upsert_news(&item).await },
    )
    .await;
    report.log();
    report
}

pub async fn refresh_jobs(store: &Arc<dyn Store>) -> RefreshReport {
    let report = upsert_all(
        store,
        IngestionDomain::Jobs,
        catalog::jobs(Utc::now()),
        |job| job.url.clone(),
        |store, job| async move { store.upsert_job(&job).await },
    )
    .await;
    report.log();
    report
}

pub async fn refresh_communities(store: &Arc<dyn Store>) -> RefreshReport {
    let report = upsert_all(
        store,
        IngestionDomain::Communities,
        catalog::community_posts(Utc::now()),
        |post| post.url.clone(),
        |store, post| async move { store.upsert_post(&post).await },
    )
    .await;
    report.log();
    report
}

pub async fn refresh_certifications(store: &Arc<dyn Store>) -> RefreshReport {
    let report = upsert_all(
        store,
        IngestionDomain::Certifications,
        catalog::certifications(Utc::now()),
        |cert| cert.url.clone(),
        |store, cert| async move { store.upsert_certification(&cert).await },
    )
    .await;
    report.log();
    report
}

/// Run the routine for `domain`.
pub async fn refresh(store: &Arc<dyn Store>, domain: IngestionDomain) -> RefreshReport {
    match domain {
        IngestionDomain::Market => refresh_market(store).await,
        IngestionDomain::News => refresh_news(store).await,
        IngestionDomain::Jobs => refresh_jobs(store).await,
        IngestionDomain::Communities => refresh_communities(store).await,
        IngestionDomain::Certifications => refresh_certifications(store).await,
    }
}
