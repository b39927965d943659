use crate::types::{ChangeSet, MetricRecord};

/// Percentage delta between a value and its baseline.
///
/// A missing or zero baseline reports `0.0` rather than an infinite or
/// undefined growth figure. Rounding is left to the presentation layer.
pub fn percent_change(current: f64, previous: Option<f64>) -> f64 {
    match previous {
        Some(prev) if prev != 0.0 => (current - prev) / prev * 100.0,
        _ => 0.0,
    }
}

/// Day-over-day deltas from the last two points of a filtered series.
/// A series shorter than two days reports all-zero changes.
pub fn latest_changes(metrics: &[MetricRecord]) -> ChangeSet {
    let mut points = metrics.iter().rev();
    let Some(current) = points.next() else {
        return ChangeSet::default();
    };
    let previous = points.next();

    ChangeSet {
        mentions: percent_change(current.daily_mentions, previous.map(|p| p.daily_mentions)),
        engagement: percent_change(current.engagement_score, previous.map(|p| p.engagement_score)),
        sentiment: percent_change(current.sentiment_percent, previous.map(|p| p.sentiment_percent)),
        likes: percent_change(current.likes, previous.map(|p| p.likes)),
    }
}
