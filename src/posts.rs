use crate::types::{CommentRecord, PostGroup, Sentiment};

/// Replies are worth this many importance points each when ranking threads.
const REPLY_WEIGHT: f64 = 5.0;

/// Selectable thread orderings. All of them sort descending and are stable,
/// so exact ties keep their original relative order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortCriterion {
    /// Post score plus weighted reply count.
    #[default]
    Importance,
    /// Newest post first.
    Recent,
    /// Most replies first.
    MostComments,
    /// Highest raw post score first.
    HighestScore,
}

impl SortCriterion {
    /// Accepts both the short and the long spelling the frontend sends.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "importance" => Some(Self::Importance),
            "recent" => Some(Self::Recent),
            "mostComments" | "comments" => Some(Self::MostComments),
            "highestScore" | "score" => Some(Self::HighestScore),
            _ => None,
        }
    }
}

/// Rebuild post threads from a flat comment stream.
///
/// A record is a root post when its metadata says `is_post` and carries a
/// `post_id`; any non-post record with a `post_id` is a reply candidate.
/// Records without a `post_id`, and replies whose `post_id` matches no
/// post, are dropped silently. Reply order within a thread follows input
/// order.
pub fn group(comments: &[CommentRecord]) -> Vec<PostGroup> {
    let mut groups: Vec<PostGroup> = comments
        .iter()
        .filter(|c| {
            c.metadata
                .as_ref()
                .is_some_and(|m| m.is_post && m.post_id.is_some())
        })
        .map(|post| PostGroup {
            post: post.clone(),
            replies: Vec::new(),
            reply_count: 0,
        })
        .collect();

    for comment in comments {
        let Some(meta) = comment.metadata.as_ref() else {
            continue;
        };
        if meta.is_post {
            continue;
        }
        let Some(post_id) = meta.post_id else {
            continue;
        };
        if let Some(group) = groups
            .iter_mut()
            .find(|g| g.post.metadata.as_ref().and_then(|m| m.post_id) == Some(post_id))
        {
            group.replies.push(comment.clone());
        }
    }

    for group in &mut groups {
        group.reply_count = group.replies.len();
    }

    groups
}

/// Order threads under the chosen criterion, descending.
pub fn sort_posts(mut groups: Vec<PostGroup>, criterion: SortCriterion) -> Vec<PostGroup> {
    match criterion {
        SortCriterion::Importance => {
            groups.sort_by(|a, b| importance(b).total_cmp(&importance(a)));
        }
        SortCriterion::Recent => {
            groups.sort_by(|a, b| b.post.timestamp.cmp(&a.post.timestamp));
        }
        SortCriterion::MostComments => {
            groups.sort_by(|a, b| b.reply_count.cmp(&a.reply_count));
        }
        SortCriterion::HighestScore => {
            groups.sort_by(|a, b| post_score(b).total_cmp(&post_score(a)));
        }
    }
    groups
}

/// Narrow threads on the root post's own sentiment and platform. Replies
/// never affect whether a thread survives.
pub fn narrow(
    groups: Vec<PostGroup>,
    sentiment: Option<Sentiment>,
    platform: Option<&str>,
) -> Vec<PostGroup> {
    groups
        .into_iter()
        .filter(|g| sentiment.map_or(true, |s| g.post.sentiment == s))
        .filter(|g| platform.map_or(true, |p| g.post.source == p))
        .collect()
}

fn importance(group: &PostGroup) -> f64 {
    post_score(group) + group.reply_count as f64 * REPLY_WEIGHT
}

fn post_score(group: &PostGroup) -> f64 {
    group
        .post
        .metadata
        .as_ref()
        .and_then(|m| m.score)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::types::{CommentMetadata, UserType};

    fn record(id: u64, meta: Option<CommentMetadata>, day: &str) -> CommentRecord {
        let timestamp =
            NaiveDateTime::parse_from_str(&format!("{day} 09:00:00"), "%Y-%m-%d %H:%M:%S")
                .unwrap()
                .and_utc();
        CommentRecord {
            id,
            activity_id: 0,
            text: format!("comment {id}"),
            author: "kim".to_string(),
            sentiment: Sentiment::Neutral,
            user_type: UserType::Viewer,
            source: "Reddit".to_string(),
            timestamp,
            metadata: meta,
        }
    }

    fn post(id: u64, post_id: u64, score: f64, day: &str) -> CommentRecord {
        record(
            id,
            Some(CommentMetadata {
                is_post: true,
                post_id: Some(post_id),
                score: Some(score),
                ..CommentMetadata::default()
            }),
            day,
        )
    }

    fn reply(id: u64, post_id: u64) -> CommentRecord {
        record(
            id,
            Some(CommentMetadata {
                is_post: false,
                post_id: Some(post_id),
                ..CommentMetadata::default()
            }),
            "2024-03-01",
        )
    }

    #[test]
    fn replies_attach_to_their_post_in_input_order() {
        let comments = vec![
            post(1, 100, 3.0, "2024-03-01"),
            reply(2, 100),
            post(3, 200, 1.0, "2024-03-02"),
            reply(4, 200),
            reply(5, 100),
        ];
        let groups = group(&comments);
        assert_eq!(groups.len(), 2);
        let first = groups.iter().find(|g| g.post.id == 1).unwrap();
        let reply_ids: Vec<u64> = first.replies.iter().map(|r| r.id).collect();
        assert_eq!(reply_ids, vec![2, 5]);
        assert_eq!(first.reply_count, 2);
    }

    #[test]
    fn orphan_replies_and_bagless_records_are_dropped() {
        let comments = vec![
            post(1, 100, 0.0, "2024-03-01"),
            reply(2, 999),
            record(3, None, "2024-03-01"),
            record(4, Some(CommentMetadata::default()), "2024-03-01"),
        ];
        let groups = group(&comments);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].replies.is_empty());

        let narrowed = narrow(groups, Some(Sentiment::Neutral), Some("Reddit"));
        assert_eq!(narrowed.len(), 1);
        assert!(narrowed[0].replies.iter().all(|r| r.id != 2));
    }

    #[test]
    fn default_order_weighs_replies_five_points_each() {
        let comments = vec![
            post(1, 100, 12.0, "2024-03-01"),
            post(2, 200, 0.0, "2024-03-02"),
            reply(3, 200),
            reply(4, 200),
            reply(5, 200),
        ];
        // post 1: 12 + 0*5 = 12; post 2: 0 + 3*5 = 15.
        let sorted = sort_posts(group(&comments), SortCriterion::Importance);
        let ids: Vec<u64> = sorted.iter().map(|g| g.post.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn recent_sorts_by_post_timestamp_descending() {
        let comments = vec![
            post(1, 100, 50.0, "2024-03-01"),
            post(2, 200, 1.0, "2024-03-05"),
            post(3, 300, 9.0, "2024-03-03"),
        ];
        let sorted = sort_posts(group(&comments), SortCriterion::Recent);
        let ids: Vec<u64> = sorted.iter().map(|g| g.post.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn ties_keep_original_relative_order() {
        let comments = vec![
            post(1, 100, 7.0, "2024-03-01"),
            post(2, 200, 7.0, "2024-03-01"),
            post(3, 300, 7.0, "2024-03-01"),
        ];
        for criterion in [
            SortCriterion::Importance,
            SortCriterion::MostComments,
            SortCriterion::HighestScore,
        ] {
            let sorted = sort_posts(group(&comments), criterion);
            let ids: Vec<u64> = sorted.iter().map(|g| g.post.id).collect();
            assert_eq!(ids, vec![1, 2, 3], "criterion {criterion:?}");
        }
    }

    #[test]
    fn missing_score_counts_as_zero() {
        let mut scoreless = post(1, 100, 0.0, "2024-03-01");
        if let Some(meta) = scoreless.metadata.as_mut() {
            meta.score = None;
        }
        let comments = vec![scoreless, post(2, 200, 1.0, "2024-03-01")];
        let sorted = sort_posts(group(&comments), SortCriterion::HighestScore);
        let ids: Vec<u64> = sorted.iter().map(|g| g.post.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn narrowing_looks_only_at_the_post() {
        let mut negative_post = post(1, 100, 0.0, "2024-03-01");
        negative_post.sentiment = Sentiment::Negative;
        let mut positive_reply = reply(2, 100);
        positive_reply.sentiment = Sentiment::Positive;

        let groups = group(&[negative_post, positive_reply]);
        let positive_only = narrow(groups.clone(), Some(Sentiment::Positive), None);
        assert!(positive_only.is_empty());

        let negative_only = narrow(groups, Some(Sentiment::Negative), None);
        assert_eq!(negative_only.len(), 1);
        assert_eq!(negative_only[0].reply_count, 1);
    }

    #[test]
    fn parse_accepts_frontend_spellings() {
        assert_eq!(SortCriterion::parse("recent"), Some(SortCriterion::Recent));
        assert_eq!(SortCriterion::parse("comments"), Some(SortCriterion::MostComments));
        assert_eq!(SortCriterion::parse("mostComments"), Some(SortCriterion::MostComments));
        assert_eq!(SortCriterion::parse("score"), Some(SortCriterion::HighestScore));
        assert_eq!(SortCriterion::parse("highestScore"), Some(SortCriterion::HighestScore));
        assert_eq!(SortCriterion::parse("importance"), Some(SortCriterion::Importance));
        assert_eq!(SortCriterion::parse("views"), None);
    }
}
