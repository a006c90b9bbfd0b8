//! Feed records keyed by their `url`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            other => Err(format!("unknown sentiment: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    pub tickers: Vec<String>,
    pub published_at: DateTime<Utc>,
    pub sentiment: Sentiment,
    pub thumbnail_url: Option<String>,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TalentJob {
    pub url: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub remote: bool,
    pub tags: Vec<String>,
    pub posted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A post in a community forum; `forum` is the forum id users are matched on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityPost {
    pub url: String,
    pub title: String,
    pub forum: String,
    pub forum_label: String,
    pub author: String,
    pub score: i64,
    pub comments: i64,
    pub thumbnail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningCertification {
    pub url: String,
    pub title: String,
    pub provider: String,
    pub duration: String,
    pub format: String,
    pub cost_range: String,
    pub description: String,
    pub image_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}
