use crate::types::{MetricRecord, Summary};

/// Reduce a filtered metric window to the headline summary.
///
/// Returns `None` for an empty window so callers can tell "no data" apart
/// from a window of all-zero days. Never fails on any input shape.
pub fn aggregate(metrics: &[MetricRecord]) -> Option<Summary> {
    if metrics.is_empty() {
        return None;
    }

    let days = metrics.len();
    let mut mentions = 0.0;
    let mut engagement = 0.0;
    let mut sentiment = 0.0;
    let mut likes = 0.0;
    let mut comments = 0.0;
    let mut reach = 0.0;
    let mut negative = 0.0;
    let mut positive = 0.0;

    for m in metrics {
        mentions += m.daily_mentions;
        engagement += m.engagement_score;
        sentiment += m.sentiment_percent;
        likes += m.likes;
        comments += m.total_comments;
        reach += m.reach;
        negative += m.negative_comments;
        // Per-record fallback: derive before summing, never from the totals.
        positive += m
            .positive_comments
            .unwrap_or_else(|| (m.total_comments - m.negative_comments).max(0.0));
    }

    let engagement_rate = if reach > 0.0 {
        round2(engagement / reach * 100.0)
    } else {
        0.0
    };

    let (top_platform, top_platform_mentions) = top_platform(metrics);

    Some(Summary {
        days,
        total_mentions: mentions,
        total_engagement: engagement,
        total_likes: likes,
        total_comments: comments,
        total_reach: reach,
        positive_comments: positive,
        negative_comments: negative,
        avg_sentiment_percent: (sentiment / days as f64).round(),
        avg_mentions_per_day: (mentions / days as f64).round(),
        engagement_rate,
        top_platform,
        top_platform_mentions,
    })
}

/// Rank platforms by summed daily mentions across every record's breakdown.
/// Ties go to the platform seen first while scanning records in input order
/// (within a record, breakdown entries iterate in name order).
fn top_platform(metrics: &[MetricRecord]) -> (String, f64) {
    let mut totals: Vec<(String, f64)> = Vec::new();

    for m in metrics {
        let Some(map) = m.by_platform.as_ref() else {
            continue;
        };
        for (platform, sub) in map {
            match totals.iter_mut().find(|(name, _)| name == platform) {
                Some((_, sum)) => *sum += sub.daily_mentions,
                None => totals.push((platform.clone(), sub.daily_mentions)),
            }
        }
    }

    let mut best: Option<(&str, f64)> = None;
    for (platform, sum) in &totals {
        let beats = match best {
            Some((_, best_sum)) => *sum > best_sum,
            None => true,
        };
        if beats {
            best = Some((platform, *sum));
        }
    }

    match best {
        Some((platform, sum)) => (platform.to_string(), sum),
        None => ("N/A".to_string(), 0.0),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
