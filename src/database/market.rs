//! Market Repository - PostgreSQL operations for quotes and series using sqlx

use sqlx::types::Json;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::debug;

use crate::error::StoreError;
use crate::models::{MarketQuote, MarketSeries, SeriesInterval, SeriesPoint};

pub struct MarketRepository {
    pool: PgPool,
}

impl MarketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert_quote(&self, quote: &MarketQuote) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO market.quotes
            (symbol, label, price, change, change_percent, previous_close,
             currency, market_cap, volume, provider, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (symbol) DO UPDATE SET
                label = EXCLUDED.label,
                price = EXCLUDED.price,
                change = EXCLUDED.change,
                change_percent = EXCLUDED.change_percent,
                previous_close = EXCLUDED.previous_close,
                currency = EXCLUDED.currency,
                market_cap = EXCLUDED.market_cap,
                volume = EXCLUDED.volume,
                provider = EXCLUDED.provider,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(quote.symbol.to_uppercase())
        .bind(&quote.label)
        .bind(quote.price)
        .bind(quote.change)
        .bind(quote.change_percent)
        .bind(quote.previous_close)
        .bind(&quote.currency)
        .bind(quote.market_cap)
        .bind(quote.volume)
        .bind(&quote.provider)
        .bind(quote.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(symbol = %quote.symbol, "Quote upserted");
        Ok(())
    }

    pub async fn latest_quotes(&self, limit: usize) -> Result<Vec<MarketQuote>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT symbol, label, price, change, change_percent, previous_close,
                   currency, market_cap, volume, provider, updated_at
            FROM market.quotes
            ORDER BY updated_at DESC, symbol ASC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(quote_from_row).collect())
    }

    pub async fn upsert_series(&self, series: &MarketSeries) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO market.series
            (symbol, bar_interval, data, provider, last_refreshed)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (symbol, bar_interval) DO UPDATE SET
                data = EXCLUDED.data,
                provider = EXCLUDED.provider,
                last_refreshed = EXCLUDED.last_refreshed,
                updated_at = NOW()
            "#,
        )
        .bind(series.symbol.to_uppercase())
        .bind(series.interval.as_str())
        .bind(Json(&series.data))
        .bind(&series.provider)
        .bind(series.last_refreshed)
        .execute(&self.pool)
        .await?;

        debug!(symbol = %series.symbol, interval = %series.interval, "Series upserted");
        Ok(())
    }

    pub async fn find_series(
        &self,
        symbol: &str,
        interval: SeriesInterval,
    ) -> Result<Option<MarketSeries>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT symbol, bar_interval, data, provider, last_refreshed
            FROM market.series
            WHERE symbol = $1 AND bar_interval = $2
            "#,
        )
        .bind(symbol.to_uppercase())
        .bind(interval.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let interval: String = row.get("bar_interval");
                let Json(data): Json<Vec<SeriesPoint>> = row.try_get("data")?;
                Ok(Some(MarketSeries {
                    symbol: row.get("symbol"),
                    interval: interval.parse().map_err(StoreError::Serialization)?,
                    data,
                    provider: row.get("provider"),
                    last_refreshed: row.get("last_refreshed"),
                }))
            }
            None => Ok(None),
        }
    }
}

fn quote_from_row(row: &PgRow) -> MarketQuote {
    MarketQuote {
        symbol: row.get("symbol"),
        label: row.get("label"),
        price: row.get("price"),
        change: row.get("change"),
        change_percent: row.get("change_percent"),
        previous_close: row.get("previous_close"),
        currency: row.get("currency"),
        market_cap: row.get("market_cap"),
        volume: row.get("volume"),
        provider: row.get("provider"),
        updated_at: row.get("updated_at"),
    }
}
