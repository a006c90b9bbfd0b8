//! Content ingestion
//!
//! Every cycle refreshes five domains in a fixed order: market, news, jobs,
//! communities, certifications. Records are upserted on their natural key,
//! so repeated cycles never duplicate content.

pub mod catalog;
pub mod refresh;
pub mod scheduler;

pub use refresh::{
    IngestionDomain, RecordFailure, RefreshReport, refresh, refresh_certifications,
    refresh_communities, refresh_jobs, refresh_market, refresh_news,
};
pub use scheduler::{CycleReport, IngestionScheduler};
