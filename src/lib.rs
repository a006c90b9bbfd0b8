//! Financegram backend
//!
//! Ingests market, news, jobs, community and learning content on a fixed
//! schedule and serves it over a REST API alongside account registration,
//! login and community membership.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs         - Crate root with re-exports
//! ├── main.rs        - Server entrypoint
//! ├── config.rs      - Environment configuration
//! ├── error.rs       - Store and API error types
//! ├── models/        - Content and account records
//! ├── community/     - Membership resolver, session normalizer, enrollment
//! ├── auth/          - Password hashing and bearer tokens
//! ├── database/      - Store trait, PostgreSQL and in-memory backends
//! ├── ingestion/     - Refresh routines and the cycle scheduler
//! └── api/           - HTTP routes, extractors and middleware
//! ```

pub mod api;
pub mod auth;
pub mod community;
pub mod config;
pub mod database;
pub mod error;
pub mod ingestion;
pub mod models;

pub use api::{AppState, MiddlewareConfig, create_app};
pub use auth::{AuthError, Claims, TokenIssuer};
pub use community::{
    CommunityMembership, ProviderId, RawSession, Session, build_community_memberships,
    normalize_session, starting_communities,
};
pub use config::AppConfig;
pub use database::{DatabasePool, MemoryStore, Store};
pub use error::{ApiError, StoreError};
pub use ingestion::{CycleReport, IngestionDomain, IngestionScheduler, RefreshReport};
pub use models::{
    CommunityPost, LearningCertification, MarketQuote, MarketSeries, NewsItem, SeriesInterval,
    SeriesPoint, TalentJob, User, UserProfile,
};
