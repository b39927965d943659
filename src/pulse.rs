use crate::types::{CommentRecord, Sentiment, SentimentPulse};

/// Verdict bands. Scores inside `[40, 60]` are deliberately neutral; the
/// dead zone keeps the headline from flapping on small swings.
const NEGATIVE_BELOW: u32 = 40;
const POSITIVE_ABOVE: u32 = 60;

/// Score used when there is no positive or negative signal at all.
const NO_SIGNAL_SCORE: u32 = 50;

/// Overall community verdict for a comment window.
///
/// Neutral comments express no opinion and stay out of the denominator;
/// the score is the positive share of opinionated comments, 0 to 100.
pub fn pulse(comments: &[CommentRecord]) -> SentimentPulse {
    let positive = comments
        .iter()
        .filter(|c| c.sentiment == Sentiment::Positive)
        .count();
    let negative = comments
        .iter()
        .filter(|c| c.sentiment == Sentiment::Negative)
        .count();

    let opinionated = positive + negative;
    if opinionated == 0 {
        return SentimentPulse {
            score: NO_SIGNAL_SCORE,
            verdict: Sentiment::Neutral,
        };
    }

    let score = (positive as f64 / opinionated as f64 * 100.0).round() as u32;
    let verdict = if score > POSITIVE_ABOVE {
        Sentiment::Positive
    } else if score < NEGATIVE_BELOW {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };

    SentimentPulse { score, verdict }
}
