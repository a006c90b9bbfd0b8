use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Latest quote for a symbol. One row per symbol, no history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    pub symbol: String,
    pub label: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub previous_close: f64,
    pub currency: String,
    pub market_cap: Option<f64>,
    pub volume: Option<i64>,
    pub provider: String,
    pub updated_at: DateTime<Utc>,
}

/// Bar width of a [`MarketSeries`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SeriesInterval {
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    #[default]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
}

impl SeriesInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesInterval::FifteenMinutes => "15m",
            SeriesInterval::OneHour => "1h",
            SeriesInterval::OneDay => "1d",
            SeriesInterval::OneWeek => "1w",
        }
    }

    pub fn duration(&self) -> chrono::Duration {
        match self {
            SeriesInterval::FifteenMinutes => chrono::Duration::minutes(15),
            SeriesInterval::OneHour => chrono::Duration::hours(1),
            SeriesInterval::OneDay => chrono::Duration::days(1),
            SeriesInterval::OneWeek => chrono::Duration::weeks(1),
        }
    }
}

impl fmt::Display for SeriesInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeriesInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "15m" => Ok(SeriesInterval::FifteenMinutes),
            "1h" => Ok(SeriesInterval::OneHour),
            "1d" => Ok(SeriesInterval::OneDay),
            "1w" => Ok(SeriesInterval::OneWeek),
            other => Err(format!("unknown series interval: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// OHLCV series keyed by `(symbol, interval)`; points are oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSeries {
    pub symbol: String,
    pub interval: SeriesInterval,
    pub data: Vec<SeriesPoint>,
    pub provider: String,
    pub last_refreshed: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_wire_format() {
        assert_eq!(
            serde_json::to_string(&SeriesInterval::FifteenMinutes).unwrap(),
            "\"15m\""
        );
        let parsed: SeriesInterval = serde_json::from_str("\"1w\"").unwrap();
        assert_eq!(parsed, SeriesInterval::OneWeek);
        assert_eq!("1h".parse::<SeriesInterval>().unwrap(), SeriesInterval::OneHour);
        assert!("2d".parse::<SeriesInterval>().is_err());
    }

    #[test]
    fn test_quote_serializes_camel_case() {
        let quote = MarketQuote {
            symbol: "AAPL".into(),
            label: "Apple Inc.".into(),
            price: 197.22,
            change: 1.05,
            change_percent: 0.54,
            previous_close: 196.17,
            currency: "USD".into(),
            market_cap: None,
            volume: Some(74_200_000),
            provider: "simulated".into(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&quote).unwrap();
        assert_eq!(value["changePercent"], 0.54);
        assert_eq!(value["previousClose"], 196.17);
        assert!(value.get("updatedAt").is_some());
    }
}
