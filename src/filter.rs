use crate::breakdown::resolve_for_platform;
use crate::types::{ActivityRecord, CommentRecord, MetricRecord};

/// Inclusive date window. Days are `YYYY-MM-DD` strings, so plain string
/// comparison matches calendar order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateRange {
    All,
    Between { start: String, end: String },
}

impl DateRange {
    pub fn single_day(day: impl Into<String>) -> Self {
        let day = day.into();
        Self::Between {
            start: day.clone(),
            end: day,
        }
    }

    pub fn contains(&self, day: &str) -> bool {
        match self {
            Self::All => true,
            Self::Between { start, end } => start.as_str() <= day && day <= end.as_str(),
        }
    }
}

/// User-selected narrowing of the dashboard. `platform: None` means all
/// platforms. Transient; rebuilt from the request on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub dates: DateRange,
    pub platform: Option<String>,
}

impl FilterSpec {
    pub fn all() -> Self {
        Self {
            dates: DateRange::All,
            platform: None,
        }
    }
}

/// The three collections narrowed to one `FilterSpec`.
#[derive(Debug, Clone, Default)]
pub struct FilteredData {
    pub metrics: Vec<MetricRecord>,
    pub activities: Vec<ActivityRecord>,
    pub comments: Vec<CommentRecord>,
}

/// Narrow the raw collections to a date window and optional platform.
///
/// Platform narrowing keeps every surviving metric day and re-resolves it
/// against the platform breakdown, so a chart series never loses days when
/// a platform is selected. Input order is preserved throughout.
pub fn filter(
    metrics: &[MetricRecord],
    activities: &[ActivityRecord],
    comments: &[CommentRecord],
    spec: &FilterSpec,
) -> FilteredData {
    let platform = spec.platform.as_deref();

    let metrics = metrics
        .iter()
        .filter(|m| spec.dates.contains(&m.date))
        .map(|m| match platform {
            Some(p) => resolve_for_platform(m, p),
            None => m.clone(),
        })
        .collect();

    let activities = activities
        .iter()
        .filter(|a| activity_in_range(a, &spec.dates))
        .filter(|a| match platform {
            Some(p) => a.platforms.is_empty() || a.platforms.iter().any(|entry| entry == p),
            None => true,
        })
        .cloned()
        .collect();

    let comments = comments
        .iter()
        .filter(|c| spec.dates.contains(&c.day()))
        .filter(|c| platform.map_or(true, |p| c.source == p))
        .cloned()
        .collect();

    FilteredData {
        metrics,
        activities,
        comments,
    }
}

/// A single-day activity matches when its day is inside the window; a span
/// matches when it overlaps the window at all.
fn activity_in_range(activity: &ActivityRecord, range: &DateRange) -> bool {
    let DateRange::Between { start, end } = range else {
        return true;
    };

    let span_start = activity
        .start_date
        .as_deref()
        .or(activity.date.as_deref());
    let span_end = activity.end_date.as_deref().or(span_start);

    match (span_start, span_end) {
        (Some(first), Some(last)) => first <= end.as_str() && last >= start.as_str(),
        _ => false,
    }
}
