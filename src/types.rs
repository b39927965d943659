use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One calendar day's aggregate social metrics, as stored by the backend.
///
/// Numeric fields that are absent in the stored JSON deserialize to zero.
/// Records are never mutated once loaded; derived views are fresh copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    pub date: String,
    #[serde(default)]
    pub daily_mentions: f64,
    #[serde(default)]
    pub likes: f64,
    #[serde(default)]
    pub total_comments: f64,
    #[serde(default)]
    pub reach: f64,
    #[serde(default)]
    pub negative_comments: f64,
    #[serde(default)]
    pub engagement_score: f64,
    #[serde(default)]
    pub sentiment_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive_comments: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_platform: Option<BTreeMap<String, PlatformMetrics>>,
}

/// Per-platform slice of a day's metrics inside `MetricRecord::by_platform`.
/// The backend stores `comments` here where the top level says `totalComments`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformMetrics {
    #[serde(default)]
    pub daily_mentions: f64,
    #[serde(default)]
    pub likes: f64,
    #[serde(default)]
    pub comments: f64,
    #[serde(default)]
    pub reach: f64,
    #[serde(default)]
    pub negative_comments: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityStatus {
    Upcoming,
    InProgress,
    Completed,
}

/// A discrete production or marketing event shown as a chart marker.
///
/// Either `date` (single day) or `start_date`/`end_date` (span) is set.
/// An empty `platforms` list means the event applies to every platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub description: String,
    pub status: ActivityStatus,
    #[serde(default)]
    pub platforms: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    Player,
    Viewer,
}

/// Optional engagement bag attached to a comment. `is_post` plus `post_id`
/// mark a thread root; replies carry the root's `post_id` without `is_post`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentMetadata {
    #[serde(default)]
    pub is_post: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<f64>,
}

/// A single community post or reply pulled from one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub id: u64,
    #[serde(default)]
    pub activity_id: u64,
    pub text: String,
    pub author: String,
    pub sentiment: Sentiment,
    pub user_type: UserType,
    pub source: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CommentMetadata>,
}

impl CommentRecord {
    /// Calendar-day portion of the timestamp, `YYYY-MM-DD`.
    pub fn day(&self) -> String {
        self.timestamp.format("%Y-%m-%d").to_string()
    }
}

/// Aggregated view of a filtered metric window. Absence of a `Summary`
/// (the aggregator returning `None`) means "no data", which callers must
/// keep distinct from an all-zero summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub days: usize,
    pub total_mentions: f64,
    pub total_engagement: f64,
    pub total_likes: f64,
    pub total_comments: f64,
    pub total_reach: f64,
    pub positive_comments: f64,
    pub negative_comments: f64,
    pub avg_sentiment_percent: f64,
    pub avg_mentions_per_day: f64,
    pub engagement_rate: f64,
    pub top_platform: String,
    pub top_platform_mentions: f64,
}

/// A reconstructed thread: one root post plus its replies in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostGroup {
    pub post: CommentRecord,
    pub replies: Vec<CommentRecord>,
    pub reply_count: usize,
}

/// Overall community mood for a comment window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentPulse {
    pub score: u32,
    pub verdict: Sentiment,
}

/// Day-over-day percentage deltas for the headline cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    pub mentions: f64,
    pub engagement: f64,
    pub sentiment: f64,
    pub likes: f64,
}

/// Everything the dashboard view needs for one filter selection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub summary: Option<Summary>,
    pub pulse: SentimentPulse,
    pub changes: ChangeSet,
    pub series: Vec<MetricRecord>,
    pub activities: Vec<ActivityRecord>,
}
