//! Public content feeds
//!
//! Endpoints:
//!   GET /market                   -> latest quotes
//!   GET /market/series/{symbol}   -> one series, `?interval=` defaults to 1d
//!   GET /news                     -> latest news items
//!   GET /jobs                     -> latest talent jobs
//!   GET /certificates             -> latest learning certifications

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::error::ApiError;
use crate::models::{
    LearningCertification, MarketQuote, MarketSeries, NewsItem, SeriesInterval,
    TalentJob,
};

const MARKET_LIMIT: usize = 50;
const NEWS_LIMIT: usize = 20;
const JOBS_LIMIT: usize = 20;
const CERTIFICATIONS_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    pub interval: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CertificationsResponse {
    pub certifications: Vec<LearningCertification>,
}

pub async fn list_quotes(State(state): State<AppState>) -> Result<Json<Vec<MarketQuote>>, ApiError> {
    state
        .store
        .latest_quotes(MARKET_LIMIT)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Failed to fetch market quotes", e))
}

pub async fn get_series(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<SeriesQuery>,
) -> Result<Json<MarketSeries>, ApiError> {
    let interval = match query.interval.as_deref() {
        Some(raw) => raw.parse::<SeriesInterval>().map_err(ApiError::Validation)?,
        None => SeriesInterval::default(),
    };
    let symbol = symbol.to_uppercase();

    state
        .store
        .find_series(&symbol, interval)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch market series", e))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No {interval} series for {symbol}")))
}

pub async fn list_news(State(state): State<AppState>) -> Result<Json<Vec<NewsItem>>, ApiError> {
    state
        .store
        .latest_news(NEWS_LIMIT)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Failed to fetch news items", e))
}

pub async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<TalentJob>>, ApiError> {
    state
        .store
        .latest_jobs(JOBS_LIMIT)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Failed to fetch jobs", e))
}

pub async fn list_certifications(
    State(state): State<AppState>,
) -> Result<Json<CertificationsResponse>, ApiError> {
    let certifications = state
        .store
        .latest_certifications(CERTIFICATIONS_LIMIT)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch certificates", e))?;

    Ok(Json(CertificationsResponse { certifications }))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/market", get(list_quotes))
        .route("/market/series/{symbol}", get(get_series))
        .route("/news", get(list_news))
        .route("/jobs", get(list_jobs))
        .route("/certificates", get(list_certifications))
}
