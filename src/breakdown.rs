use std::collections::BTreeMap;

use crate::types::{MetricRecord, PlatformMetrics};

/// Engagement weights. These mirror the product formula the dashboard has
/// always shipped with; changing them changes every historical chart.
const LIKE_WEIGHT: f64 = 1.5;
const COMMENT_WEIGHT: f64 = 2.0;
const REACH_WEIGHT: f64 = 0.1;

/// Sentiment percent reported when a day has no comment signal at all.
pub const NEUTRAL_SENTIMENT_PERCENT: f64 = 50.0;

/// Single source of truth for deriving an engagement score from raw counts.
pub fn engagement_score(likes: f64, comments: f64, reach: f64) -> f64 {
    (likes * LIKE_WEIGHT + comments * COMMENT_WEIGHT + reach * REACH_WEIGHT).round()
}

/// Re-derive a day's top-level metrics as if only `platform`'s data existed.
///
/// A platform missing from the day's breakdown yields a zeroed record with
/// the neutral sentiment default rather than an error, so a platform filter
/// never removes days from the series.
pub fn resolve_for_platform(metric: &MetricRecord, platform: &str) -> MetricRecord {
    let sub = metric
        .by_platform
        .as_ref()
        .and_then(|map| map.get(platform));

    let Some(sub) = sub else {
        return zeroed(metric, platform);
    };

    let positive = (sub.comments - sub.negative_comments).max(0.0);
    let sentiment_percent = if sub.comments > 0.0 {
        (positive / sub.comments * 100.0).round()
    } else {
        NEUTRAL_SENTIMENT_PERCENT
    };

    MetricRecord {
        date: metric.date.clone(),
        daily_mentions: sub.daily_mentions,
        likes: sub.likes,
        total_comments: sub.comments,
        reach: sub.reach,
        negative_comments: sub.negative_comments,
        engagement_score: engagement_score(sub.likes, sub.comments, sub.reach),
        sentiment_percent,
        positive_comments: Some(positive),
        by_platform: Some(BTreeMap::from([(platform.to_string(), sub.clone())])),
    }
}

fn zeroed(metric: &MetricRecord, platform: &str) -> MetricRecord {
    MetricRecord {
        date: metric.date.clone(),
        daily_mentions: 0.0,
        likes: 0.0,
        total_comments: 0.0,
        reach: 0.0,
        negative_comments: 0.0,
        engagement_score: 0.0,
        sentiment_percent: NEUTRAL_SENTIMENT_PERCENT,
        positive_comments: Some(0.0),
        by_platform: Some(BTreeMap::from([(
            platform.to_string(),
            PlatformMetrics::default(),
        )])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day_with_reddit() -> MetricRecord {
        MetricRecord {
            date: "2024-06-01".to_string(),
            daily_mentions: 40.0,
            likes: 100.0,
            total_comments: 30.0,
            reach: 2000.0,
            negative_comments: 6.0,
            engagement_score: 0.0,
            sentiment_percent: 0.0,
            positive_comments: None,
            by_platform: Some(BTreeMap::from([(
                "Reddit".to_string(),
                PlatformMetrics {
                    daily_mentions: 5.0,
                    likes: 10.0,
                    comments: 2.0,
                    reach: 100.0,
                    negative_comments: 1.0,
                },
            )])),
        }
    }

    #[test]
    fn unknown_platform_yields_zeroed_record_with_neutral_sentiment() {
        let resolved = resolve_for_platform(&day_with_reddit(), "Unknown");
        assert_eq!(resolved.date, "2024-06-01");
        assert_eq!(resolved.daily_mentions, 0.0);
        assert_eq!(resolved.likes, 0.0);
        assert_eq!(resolved.total_comments, 0.0);
        assert_eq!(resolved.reach, 0.0);
        assert_eq!(resolved.negative_comments, 0.0);
        assert_eq!(resolved.engagement_score, 0.0);
        assert_eq!(resolved.sentiment_percent, 50.0);
    }

    #[test]
    fn known_platform_recomputes_engagement_and_sentiment() {
        let resolved = resolve_for_platform(&day_with_reddit(), "Reddit");
        // 10 * 1.5 + 2 * 2 + 100 * 0.1 = 29
        assert_eq!(resolved.engagement_score, 29.0);
        assert_eq!(resolved.positive_comments, Some(1.0));
        assert_eq!(resolved.sentiment_percent, 50.0);
        assert_eq!(resolved.daily_mentions, 5.0);
        assert_eq!(resolved.likes, 10.0);
        assert_eq!(resolved.total_comments, 2.0);
        assert_eq!(resolved.reach, 100.0);
    }

    #[test]
    fn zero_comments_fall_back_to_neutral_sentiment() {
        let mut metric = day_with_reddit();
        if let Some(map) = metric.by_platform.as_mut() {
            let sub = map.get_mut("Reddit").unwrap();
            sub.comments = 0.0;
            sub.negative_comments = 0.0;
        }
        let resolved = resolve_for_platform(&metric, "Reddit");
        assert_eq!(resolved.sentiment_percent, 50.0);
        assert_eq!(resolved.positive_comments, Some(0.0));
    }

    #[test]
    fn negative_heavy_comments_never_go_below_zero_positive() {
        let mut metric = day_with_reddit();
        if let Some(map) = metric.by_platform.as_mut() {
            let sub = map.get_mut("Reddit").unwrap();
            sub.comments = 2.0;
            sub.negative_comments = 5.0;
        }
        let resolved = resolve_for_platform(&metric, "Reddit");
        assert_eq!(resolved.positive_comments, Some(0.0));
        assert_eq!(resolved.sentiment_percent, 0.0);
    }

    #[test]
    fn resolver_leaves_input_untouched() {
        let metric = day_with_reddit();
        let before = metric.clone();
        let _ = resolve_for_platform(&metric, "Reddit");
        let _ = resolve_for_platform(&metric, "Unknown");
        assert_eq!(metric, before);
    }
}
