//! Periodic ingestion cycles

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::database::Store;
use crate::ingestion::refresh::{IngestionDomain, RefreshReport, refresh};

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub domains: Vec<RefreshReport>,
}

impl CycleReport {
    pub fn is_clean(&self) -> bool {
        self.domains.iter().all(RefreshReport::is_success)
    }

    pub fn failed_domains(&self) -> Vec<IngestionDomain> {
        self.domains
            .iter()
            .filter(|report| !report.is_success())
            .map(|report| report.domain)
            .collect()
    }

    pub fn total_failures(&self) -> usize {
        self.domains.iter().map(|report| report.failures.len()).sum()
    }

    pub fn total_upserted(&self) -> usize {
        self.domains.iter().map(|report| report.upserted).sum()
    }
}

pub struct IngestionScheduler {
    store: Arc<dyn Store>,
    period: Duration,
}

impl IngestionScheduler {
    pub fn new(store: Arc<dyn Store>, period: Duration) -> Self {
        Self { store, period }
    }

    /// Refresh every domain in order. A failing domain does not stop the
    /// ones after it.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut domains = Vec::with_capacity(IngestionDomain::ALL.len());
        for domain in IngestionDomain::ALL {
            domains.push(refresh(&self.store, domain).await);
        }

        let report = CycleReport { domains };
        if report.is_clean() {
            info!(upserted = report.total_upserted(), "Ingestion cycle complete");
        } else {
            warn!(
                upserted = report.total_upserted(),
                failures = report.total_failures(),
                "Ingestion cycle completed with failures"
            );
        }
        report
    }

    /// Run a cycle every `period`, starting one period from now, until a
    /// shutdown message arrives. A cycle in progress is finished first.
    pub fn spawn(self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.period, self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period_secs = self.period.as_secs(), "Ingestion scheduler started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        debug!("Starting scheduled ingestion cycle");
                        self.run_cycle().await;
                    }
                    _ = shutdown.recv() => {
                        info!("Ingestion scheduler stopping");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    #[tokio::test]
    async fn test_run_cycle_fills_every_domain() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let scheduler = IngestionScheduler::new(Arc::clone(&store), Duration::from_secs(300));

        let report = scheduler.run_cycle().await;
        assert!(report.is_clean());
        assert!(report.failed_domains().is_empty());
        assert_eq!(report.total_failures(), 0);
        assert_eq!(report.domains.len(), 5);

        assert_eq!(store.latest_quotes(50).await.unwrap().len(), 2);
        assert_eq!(store.latest_news(20).await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_ticks_and_stops() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let (tx, rx) = broadcast::channel(1);
        let handle =
            IngestionScheduler::new(Arc::clone(&store), Duration::from_secs(60)).spawn(rx);

        // No cycle before the first period elapses
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(store.latest_quotes(50).await.unwrap().is_empty());

        tokio::time::sleep(Duration::from_secs(31)).await;
        tokio::task::yield_now().await;
        assert_eq!(store.latest_quotes(50).await.unwrap().len(), 2);

        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
