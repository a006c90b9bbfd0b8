//! Data models for ingested content and user accounts

pub mod feed;
pub mod market;
pub mod user;

pub use feed::{CommunityPost, LearningCertification, NewsItem, Sentiment, TalentJob};
pub use market::{MarketQuote, MarketSeries, SeriesInterval, SeriesPoint};
pub use user::{DEFAULT_COMMUNITY, Role, User, UserProfile};
