use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::config::Settings;
use crate::filter::{DateRange, FilterSpec};
use crate::metrics::DASHBOARD_REQUESTS_TOTAL;
use crate::posts::SortCriterion;
use crate::service::DashboardService;
use crate::types::Sentiment;

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid date regex"));

pub struct AppState {
    pub settings: Arc<Settings>,
    pub service: DashboardService,
}

/// Raw query strings exactly as the frontend sends them; validation turns
/// them into a `FilterSpec` or a 400.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub platform: Option<String>,
    pub sentiment: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("malformed date `{0}`, expected YYYY-MM-DD")]
    MalformedDate(String),
    #[error("start and end must be provided together")]
    HalfOpenRange,
    #[error("start `{0}` is after end `{1}`")]
    InvertedRange(String, String),
    #[error("date span exceeds the {0}-day maximum")]
    SpanTooLarge(i64),
    #[error("unknown sort criterion `{0}`")]
    UnknownSort(String),
    #[error("unknown sentiment `{0}`")]
    UnknownSentiment(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Query(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Query(err) => err.to_string(),
            Self::Internal(err) => {
                error!(error = %err, "Request failed");
                "internal error".to_string()
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/posts", get(get_posts))
        .route("/api/activities", get(get_activities))
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "instanceId": state.settings.instance_id }))
}

async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Response {
    let result = async {
        let spec = parse_spec(&params, state.settings.max_range_days)?;
        let snapshot = state.service.snapshot(&spec).await?;
        Ok(snapshot)
    }
    .await;
    respond(&state, "dashboard", result)
}

async fn get_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Response {
    let result = async {
        let spec = parse_spec(&params, state.settings.max_range_days)?;
        let sentiment = parse_sentiment(params.sentiment.as_deref())?;
        let sort = parse_sort(params.sort.as_deref())?;
        let groups = state.service.posts(&spec, sentiment, sort).await?;
        Ok(groups)
    }
    .await;
    respond(&state, "posts", result)
}

async fn get_activities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Response {
    let result = async {
        let spec = parse_spec(&params, state.settings.max_range_days)?;
        let activities = state.service.activities(&spec).await?;
        Ok(activities)
    }
    .await;
    respond(&state, "activities", result)
}

fn respond<T: Serialize>(state: &AppState, endpoint: &str, result: Result<T, ApiError>) -> Response {
    match result {
        Ok(value) => {
            record(state, endpoint, StatusCode::OK);
            Json(value).into_response()
        }
        Err(err) => {
            record(state, endpoint, err.status());
            err.into_response()
        }
    }
}

fn record(state: &AppState, endpoint: &str, status: StatusCode) {
    DASHBOARD_REQUESTS_TOTAL
        .with_label_values(&[&state.settings.instance_id, endpoint, status.as_str()])
        .inc();
}

/// Validate the date window and platform selection. The span cap lives
/// here; the core filter engine accepts any window it is handed.
pub fn parse_spec(params: &DashboardParams, max_range_days: i64) -> Result<FilterSpec, QueryError> {
    let dates = match (params.start.as_deref(), params.end.as_deref()) {
        (None, None) => DateRange::All,
        (Some(start), Some(end)) => {
            let first = parse_day(start)?;
            let last = parse_day(end)?;
            if first > last {
                return Err(QueryError::InvertedRange(start.to_string(), end.to_string()));
            }
            if (last - first).num_days() + 1 > max_range_days {
                return Err(QueryError::SpanTooLarge(max_range_days));
            }
            DateRange::Between {
                start: start.to_string(),
                end: end.to_string(),
            }
        }
        _ => return Err(QueryError::HalfOpenRange),
    };

    let platform = params
        .platform
        .as_deref()
        .filter(|p| !p.is_empty() && *p != "all")
        .map(str::to_string);

    Ok(FilterSpec { dates, platform })
}

fn parse_day(value: &str) -> Result<NaiveDate, QueryError> {
    if !DATE_RE.is_match(value) {
        return Err(QueryError::MalformedDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| QueryError::MalformedDate(value.to_string()))
}

pub fn parse_sentiment(value: Option<&str>) -> Result<Option<Sentiment>, QueryError> {
    match value {
        None | Some("all") | Some("") => Ok(None),
        Some("positive") => Ok(Some(Sentiment::Positive)),
        Some("negative") => Ok(Some(Sentiment::Negative)),
        Some("neutral") => Ok(Some(Sentiment::Neutral)),
        Some(other) => Err(QueryError::UnknownSentiment(other.to_string())),
    }
}

pub fn parse_sort(value: Option<&str>) -> Result<SortCriterion, QueryError> {
    match value {
        None | Some("") => Ok(SortCriterion::default()),
        Some(raw) => {
            SortCriterion::parse(raw).ok_or_else(|| QueryError::UnknownSort(raw.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(start: Option<&str>, end: Option<&str>, platform: Option<&str>) -> DashboardParams {
        DashboardParams {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
            platform: platform.map(str::to_string),
            sentiment: None,
            sort: None,
        }
    }

    #[test]
    fn no_dates_means_the_full_window() {
        let spec = parse_spec(&params(None, None, None), 90).unwrap();
        assert_eq!(spec.dates, DateRange::All);
        assert_eq!(spec.platform, None);
    }

    #[test]
    fn platform_all_is_no_platform() {
        let spec = parse_spec(&params(None, None, Some("all")), 90).unwrap();
        assert_eq!(spec.platform, None);
        let spec = parse_spec(&params(None, None, Some("Reddit")), 90).unwrap();
        assert_eq!(spec.platform, Some("Reddit".to_string()));
    }

    #[test]
    fn valid_window_passes_through_verbatim() {
        let spec = parse_spec(&params(Some("2024-01-02"), Some("2024-01-04"), None), 90).unwrap();
        assert_eq!(
            spec.dates,
            DateRange::Between {
                start: "2024-01-02".to_string(),
                end: "2024-01-04".to_string(),
            }
        );
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let err = parse_spec(&params(Some("01-02-2024"), Some("2024-01-04"), None), 90)
            .unwrap_err();
        assert_eq!(err, QueryError::MalformedDate("01-02-2024".to_string()));
        let err = parse_spec(&params(Some("2024-02-30"), Some("2024-03-01"), None), 90)
            .unwrap_err();
        assert_eq!(err, QueryError::MalformedDate("2024-02-30".to_string()));
    }

    #[test]
    fn half_open_and_inverted_ranges_are_rejected() {
        let err = parse_spec(&params(Some("2024-01-02"), None, None), 90).unwrap_err();
        assert_eq!(err, QueryError::HalfOpenRange);
        let err = parse_spec(&params(Some("2024-01-05"), Some("2024-01-02"), None), 90)
            .unwrap_err();
        assert!(matches!(err, QueryError::InvertedRange(_, _)));
    }

    #[test]
    fn span_cap_counts_inclusive_days() {
        // 90 inclusive days is allowed, 91 is not.
        assert!(parse_spec(&params(Some("2024-01-01"), Some("2024-03-30"), None), 90).is_ok());
        let err = parse_spec(&params(Some("2024-01-01"), Some("2024-03-31"), None), 90)
            .unwrap_err();
        assert_eq!(err, QueryError::SpanTooLarge(90));
    }

    #[test]
    fn sentiment_and_sort_parsing() {
        assert_eq!(parse_sentiment(Some("positive")).unwrap(), Some(Sentiment::Positive));
        assert_eq!(parse_sentiment(Some("all")).unwrap(), None);
        assert_eq!(parse_sentiment(None).unwrap(), None);
        assert!(parse_sentiment(Some("angry")).is_err());

        assert_eq!(parse_sort(None).unwrap(), SortCriterion::Importance);
        assert_eq!(parse_sort(Some("recent")).unwrap(), SortCriterion::Recent);
        assert!(parse_sort(Some("upvotes")).is_err());
    }
}
