//! Simulated source data
//!
//! Fixed records refreshed every cycle. Timestamps are supplied by the
//! caller so a cycle stamps all of its records with the same instant.

use chrono::{DateTime, Utc};

use crate::models::{
    CommunityPost, LearningCertification, MarketQuote, MarketSeries, NewsItem, SeriesInterval,
    SeriesPoint, Sentiment, TalentJob,
};

pub const PROVIDER: &str = "simulated";

/// Bars in each simulated series.
const SERIES_LENGTH: usize = 5;

pub fn quotes(now: DateTime<Utc>) -> Vec<MarketQuote> {
    vec![
        MarketQuote {
            symbol: "AAPL".to_string(),
            label: "Apple Inc.".to_string(),
            price: 197.22,
            change: 1.05,
            change_percent: 0.54,
            previous_close: 196.17,
            currency: "USD".to_string(),
            market_cap: None,
            volume: Some(74_200_000),
            provider: PROVIDER.to_string(),
            updated_at: now,
        },
        MarketQuote {
            symbol: "MSFT".to_string(),
            label: "Microsoft Corporation".to_string(),
            price: 428.15,
            change: -0.82,
            change_percent: -0.19,
            previous_close: 428.97,
            currency: "USD".to_string(),
            market_cap: None,
            volume: Some(32_400_000),
            provider: PROVIDER.to_string(),
            updated_at: now,
        },
    ]
}

/// Daily bars per quoted symbol, walking linearly from the previous close
/// to the current price.
pub fn series(now: DateTime<Utc>) -> Vec<MarketSeries> {
    quotes(now)
        .into_iter()
        .map(|quote| {
            let interval = SeriesInterval::OneDay;
            let step = (quote.price - quote.previous_close) / (SERIES_LENGTH - 1) as f64;
            let daily_volume = quote.volume.unwrap_or(0);

            let data = (0..SERIES_LENGTH)
                .map(|i| {
                    let open = quote.previous_close + step * i.saturating_sub(1) as f64;
                    let close = quote.previous_close + step * i as f64;
                    let spread = (close - open).abs().max(0.01);
                    SeriesPoint {
                        timestamp: now
                            - interval.duration() * (SERIES_LENGTH - 1 - i) as i32,
                        open,
                        high: open.max(close) + spread,
                        low: open.min(close) - spread,
                        close,
                        volume: daily_volume,
                    }
                })
                .collect();

            MarketSeries {
                symbol: quote.symbol,
                interval,
                data,
                provider: PROVIDER.to_string(),
                last_refreshed: now,
            }
        })
        .collect()
}

pub fn news(now: DateTime<Utc>) -> Vec<NewsItem> {
    vec![NewsItem {
        url: "https://financegram.com/news/launch".to_string(),
        title: "Financegram launches new terminal app".to_string(),
        summary: "Financegram introduces a new community terminal for market collaboration."
            .to_string(),
        source: "Financegram News".to_string(),
        tickers: vec!["FGCM".to_string()],
        published_at: now,
        sentiment: Sentiment::Positive,
        thumbnail_url: None,
        provider: PROVIDER.to_string(),
        created_at: now,
        updated_at: now,
    }]
}

pub fn jobs(now: DateTime<Utc>) -> Vec<TalentJob> {
    vec![TalentJob {
        url: "https://financegram.com/jobs/senior-financial-analyst".to_string(),
        title: "Senior Financial Analyst".to_string(),
        company: "Financegram".to_string(),
        location: "Remote".to_string(),
        remote: true,
        tags: vec!["analytics".to_string(), "finance".to_string()],
        posted_at: now,
        updated_at: now,
    }]
}

pub fn community_posts(now: DateTime<Utc>) -> Vec<CommunityPost> {
    vec![CommunityPost {
        url: "https://community.financegram.com/posts/hedging-earnings".to_string(),
        title: "How are you hedging ahead of earnings?".to_string(),
        forum: "global".to_string(),
        forum_label: "Global Community".to_string(),
        author: "analyst_jane".to_string(),
        score: 128,
        comments: 34,
        thumbnail: None,
        created_at: now,
        updated_at: now,
    }]
}

pub fn certifications(now: DateTime<Utc>) -> Vec<LearningCertification> {
    vec![LearningCertification {
        url: "https://financegram.com/certifications/advanced-options".to_string(),
        title: "Advanced Options Strategies".to_string(),
        provider: "Financegram Academy".to_string(),
        duration: "6 weeks".to_string(),
        format: "Self-paced".to_string(),
        cost_range: "$199".to_string(),
        description: "Deep dive into advanced options trading approaches.".to_string(),
        image_url: None,
        updated_at: now,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_series_ends_at_quote_price() {
        let now = Utc::now();
        let quotes = quotes(now);
        for (series, quote) in series(now).iter().zip(quotes.iter()) {
            assert_eq!(series.symbol, quote.symbol);
            assert_eq!(series.data.len(), SERIES_LENGTH);

            let first = series.data.first().unwrap();
            let last = series.data.last().unwrap();
            assert!((first.close - quote.previous_close).abs() < 1e-9);
            assert!((last.close - quote.price).abs() < 1e-9);
            assert_eq!(last.timestamp, now);
            assert!(series.data.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
            assert!(series.data.iter().all(|p| p.low <= p.open.min(p.close)));
            assert!(series.data.iter().all(|p| p.high >= p.open.max(p.close)));
        }
    }

    fn assert_unique(keys: Vec<String>) {
        let distinct: HashSet<&String> = keys.iter().collect();
        assert_eq!(distinct.len(), keys.len(), "duplicate keys in {keys:?}");
    }

    #[test]
    fn test_natural_keys_unique() {
        let now = Utc::now();
        assert_unique(quotes(now).into_iter().map(|q| q.symbol).collect());
        assert_unique(
            series(now)
                .into_iter()
                .map(|s| format!("{}/{}", s.symbol, s.interval))
                .collect(),
        );
        assert_unique(news(now).into_iter().map(|n| n.url).collect());
        assert_unique(jobs(now).into_iter().map(|j| j.url).collect());
        assert_unique(community_posts(now).into_iter().map(|p| p.url).collect());
        assert_unique(certifications(now).into_iter().map(|c| c.url).collect());
        assert!(community_posts(now).iter().all(|p| p.forum == "global"));
    }
}
