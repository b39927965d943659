//! Deterministic synthetic dataset used when the backend store is
//! unreachable or empty. Every value derives from the configured seed and
//! the calendar day, so repeated loads are byte-for-byte identical.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Utc};
use sha2::{Digest, Sha256};

use crate::breakdown::engagement_score;
use crate::config::Settings;
use crate::datasource::Dataset;
use crate::types::{
    ActivityRecord, ActivityStatus, CommentMetadata, CommentRecord, MetricRecord,
    PlatformMetrics, Sentiment, UserType,
};

pub const PLATFORMS: [&str; 5] = ["Reddit", "Twitter", "YouTube", "Discord", "Twitch"];

const AUTHORS: [&str; 8] = [
    "pixel_prowler",
    "couchraider",
    "glasscannon",
    "stealthy_sam",
    "lootgoblin",
    "frameperfect",
    "casualcarla",
    "speedrun_ned",
];

const POST_TEXTS: [&str; 6] = [
    "The new patch completely changed how the late game feels",
    "Anyone else think the soundtrack deserves more attention?",
    "Matchmaking queue times have been rough this week",
    "That community stream was a blast, more of those please",
    "Performance on older hardware took a hit after the update",
    "The roadmap reveal has me genuinely excited for next season",
];

const REPLY_TEXTS: [&str; 5] = [
    "Agreed, been feeling the same",
    "Not my experience at all honestly",
    "Devs said a fix is coming in the next hotfix",
    "Source on that?",
    "This should be higher up",
];

/// Hash-backed value stream; the demo equivalent of a seeded RNG without
/// carrying a randomness dependency.
struct SeedStream {
    digest: [u8; 32],
    cursor: usize,
}

impl SeedStream {
    fn new(seed: &str, context: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed.as_bytes());
        hasher.update(b":");
        hasher.update(context.as_bytes());
        Self {
            digest: hasher.finalize().into(),
            cursor: 0,
        }
    }

    fn next_u64(&mut self) -> u64 {
        if self.cursor + 8 > self.digest.len() {
            let mut hasher = Sha256::new();
            hasher.update(self.digest);
            self.digest = hasher.finalize().into();
            self.cursor = 0;
        }
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.digest[self.cursor..self.cursor + 8]);
        self.cursor += 8;
        u64::from_le_bytes(bytes)
    }

    /// Inclusive on both ends.
    fn in_range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo + 1)
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[(self.next_u64() % options.len() as u64) as usize]
    }
}

pub fn generate(settings: &Settings) -> Dataset {
    let anchor = settings
        .demo_anchor_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Utc::now().date_naive());
    let days = settings.demo_days;

    let mut metrics = Vec::with_capacity(days as usize);
    let mut comments = Vec::new();
    let mut next_comment_id: u64 = 1;
    let mut next_post_id: u64 = 1;

    for offset in 0..days {
        let date = anchor - Duration::days(i64::from(days - 1 - offset));
        let day = date.format("%Y-%m-%d").to_string();

        metrics.push(metric_for_day(&settings.demo_seed, &day));
        comments_for_day(
            &settings.demo_seed,
            date,
            &day,
            &mut comments,
            &mut next_comment_id,
            &mut next_post_id,
        );
    }

    Dataset {
        metrics,
        activities: activities_around(anchor),
        comments,
    }
}

fn metric_for_day(seed: &str, day: &str) -> MetricRecord {
    let mut by_platform = BTreeMap::new();
    let mut mentions = 0.0;
    let mut likes = 0.0;
    let mut total_comments = 0.0;
    let mut reach = 0.0;
    let mut negative = 0.0;
    let mut positive = 0.0;

    for platform in PLATFORMS {
        let mut stream = SeedStream::new(seed, &format!("metrics:{day}:{platform}"));
        let day_mentions = stream.in_range(3, 45) as f64;
        let day_likes = stream.in_range(10, 140) as f64;
        let day_comments = stream.in_range(2, 28) as f64;
        let day_reach = stream.in_range(400, 4800) as f64;
        let sub = PlatformMetrics {
            daily_mentions: day_mentions,
            likes: day_likes,
            comments: day_comments,
            reach: day_reach,
            negative_comments: (day_comments * stream.in_range(0, 35) as f64 / 100.0).floor(),
        };

        mentions += sub.daily_mentions;
        likes += sub.likes;
        total_comments += sub.comments;
        reach += sub.reach;
        negative += sub.negative_comments;
        positive += (sub.comments - sub.negative_comments).max(0.0);
        by_platform.insert(platform.to_string(), sub);
    }

    let sentiment_percent = if total_comments > 0.0 {
        (positive / total_comments * 100.0).round()
    } else {
        50.0
    };

    MetricRecord {
        date: day.to_string(),
        daily_mentions: mentions,
        likes,
        total_comments,
        reach,
        negative_comments: negative,
        engagement_score: engagement_score(likes, total_comments, reach),
        sentiment_percent,
        positive_comments: Some(positive),
        by_platform: Some(by_platform),
    }
}

fn comments_for_day(
    seed: &str,
    date: NaiveDate,
    day: &str,
    out: &mut Vec<CommentRecord>,
    next_comment_id: &mut u64,
    next_post_id: &mut u64,
) {
    let mut stream = SeedStream::new(seed, &format!("comments:{day}"));
    let posts = stream.in_range(1, 2);

    for _ in 0..posts {
        let post_id = *next_post_id;
        *next_post_id += 1;

        let post = CommentRecord {
            id: *next_comment_id,
            activity_id: 0,
            text: stream.pick(&POST_TEXTS).to_string(),
            author: stream.pick(&AUTHORS).to_string(),
            sentiment: sentiment_from(&mut stream),
            user_type: user_type_from(&mut stream),
            source: stream.pick(&PLATFORMS).to_string(),
            timestamp: timestamp_for(date, &mut stream),
            metadata: Some(CommentMetadata {
                is_post: true,
                post_id: Some(post_id),
                score: Some(stream.in_range(0, 85) as f64),
                likes: Some(stream.in_range(0, 250) as f64),
                views: Some(stream.in_range(50, 9000) as f64),
            }),
        };
        *next_comment_id += 1;
        out.push(post);

        for _ in 0..stream.in_range(0, 4) {
            let reply = CommentRecord {
                id: *next_comment_id,
                activity_id: 0,
                text: stream.pick(&REPLY_TEXTS).to_string(),
                author: stream.pick(&AUTHORS).to_string(),
                sentiment: sentiment_from(&mut stream),
                user_type: user_type_from(&mut stream),
                source: stream.pick(&PLATFORMS).to_string(),
                timestamp: timestamp_for(date, &mut stream),
                metadata: Some(CommentMetadata {
                    is_post: false,
                    post_id: Some(post_id),
                    score: Some(stream.in_range(0, 30) as f64),
                    likes: Some(stream.in_range(0, 60) as f64),
                    views: None,
                }),
            };
            *next_comment_id += 1;
            out.push(reply);
        }
    }
}

fn sentiment_from(stream: &mut SeedStream) -> Sentiment {
    match stream.in_range(0, 99) {
        0..=44 => Sentiment::Positive,
        45..=74 => Sentiment::Neutral,
        _ => Sentiment::Negative,
    }
}

fn user_type_from(stream: &mut SeedStream) -> UserType {
    if stream.in_range(0, 99) < 70 {
        UserType::Player
    } else {
        UserType::Viewer
    }
}

fn timestamp_for(date: NaiveDate, stream: &mut SeedStream) -> chrono::DateTime<Utc> {
    let hour = stream.in_range(8, 22) as u32;
    let minute = stream.in_range(0, 59) as u32;
    date.and_hms_opt(hour, minute, 0)
        .unwrap_or_else(|| date.and_hms_opt(12, 0, 0).expect("valid noon timestamp"))
        .and_utc()
}

fn activities_around(anchor: NaiveDate) -> Vec<ActivityRecord> {
    let day = |offset: i64| (anchor + Duration::days(offset)).format("%Y-%m-%d").to_string();

    vec![
        ActivityRecord {
            id: 1,
            date: Some(day(-7)),
            start_date: None,
            end_date: None,
            description: "Patch 1.4 released".to_string(),
            status: ActivityStatus::Completed,
            platforms: Vec::new(),
        },
        ActivityRecord {
            id: 2,
            date: None,
            start_date: Some(day(-2)),
            end_date: Some(day(-1)),
            description: "Community dev stream weekend".to_string(),
            status: ActivityStatus::Completed,
            platforms: vec!["Twitch".to_string(), "YouTube".to_string()],
        },
        ActivityRecord {
            id: 3,
            date: None,
            start_date: Some(day(-5)),
            end_date: Some(day(5)),
            description: "Season beta signups open".to_string(),
            status: ActivityStatus::InProgress,
            platforms: Vec::new(),
        },
        ActivityRecord {
            id: 4,
            date: Some(day(3)),
            start_date: None,
            end_date: None,
            description: "Next season trailer premiere".to_string(),
            status: ActivityStatus::Upcoming,
            platforms: vec!["YouTube".to_string(), "Twitter".to_string()],
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn settings() -> Settings {
        Settings {
            redis_url: None,
            instance_id: "test".to_string(),
            http_port: 8000,
            prometheus_port: 8001,
            log_level: "info".to_string(),
            data_provider: "demo".to_string(),
            redis_data_prefix: "dashboard:data".to_string(),
            max_range_days: 90,
            demo_seed: "test-seed".to_string(),
            demo_days: 14,
            demo_anchor_date: Some("2024-06-15".to_string()),
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate(&settings());
        let b = generate(&settings());
        assert_eq!(a, b);
    }

    #[test]
    fn one_metric_record_per_day() {
        let dataset = generate(&settings());
        assert_eq!(dataset.metrics.len(), 14);
        let unique: HashSet<&str> = dataset.metrics.iter().map(|m| m.date.as_str()).collect();
        assert_eq!(unique.len(), 14);
        assert_eq!(dataset.metrics.last().unwrap().date, "2024-06-15");
    }

    #[test]
    fn metric_invariants_hold() {
        let dataset = generate(&settings());
        for m in &dataset.metrics {
            assert!((0.0..=100.0).contains(&m.sentiment_percent), "{}", m.date);
            assert_eq!(
                m.engagement_score,
                engagement_score(m.likes, m.total_comments, m.reach),
                "{}",
                m.date
            );
            let by_platform = m.by_platform.as_ref().unwrap();
            assert_eq!(by_platform.len(), PLATFORMS.len());
            let mention_sum: f64 = by_platform.values().map(|p| p.daily_mentions).sum();
            assert_eq!(mention_sum, m.daily_mentions, "{}", m.date);
        }
    }

    #[test]
    fn every_reply_references_an_existing_post() {
        let dataset = generate(&settings());
        let post_ids: HashSet<u64> = dataset
            .comments
            .iter()
            .filter_map(|c| c.metadata.as_ref())
            .filter(|m| m.is_post)
            .filter_map(|m| m.post_id)
            .collect();
        assert!(!post_ids.is_empty());
        for comment in &dataset.comments {
            let meta = comment.metadata.as_ref().unwrap();
            if !meta.is_post {
                assert!(post_ids.contains(&meta.post_id.unwrap()));
            }
        }
    }

    #[test]
    fn different_seeds_produce_different_data() {
        let mut other = settings();
        other.demo_seed = "another-seed".to_string();
        assert_ne!(generate(&settings()).metrics, generate(&other).metrics);
    }
}
