use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use crate::aggregate::aggregate;
use crate::change::latest_changes;
use crate::config::Settings;
use crate::datasource::DataSource;
use crate::filter::{filter, FilterSpec};
use crate::metrics::DASHBOARD_SNAPSHOT_BUILD_SECONDS;
use crate::posts::{group, narrow, sort_posts, SortCriterion};
use crate::pulse::pulse;
use crate::types::{ActivityRecord, DashboardSnapshot, PostGroup, Sentiment};

/// Runs the analytics pipeline over whatever the data source serves.
/// Stateless apart from its collaborators; every call recomputes from the
/// freshly loaded collections.
pub struct DashboardService {
    settings: Arc<Settings>,
    source: Arc<dyn DataSource>,
}

impl DashboardService {
    pub fn new(settings: Arc<Settings>, source: Arc<dyn DataSource>) -> Self {
        Self { settings, source }
    }

    /// Filter, aggregate, pulse, and day-over-day changes in one pass.
    pub async fn snapshot(&self, spec: &FilterSpec) -> Result<DashboardSnapshot> {
        let data = self.source.load().await.context("load dataset")?;

        let start = Instant::now();
        let filtered = filter(&data.metrics, &data.activities, &data.comments, spec);
        let snapshot = DashboardSnapshot {
            summary: aggregate(&filtered.metrics),
            pulse: pulse(&filtered.comments),
            changes: latest_changes(&filtered.metrics),
            series: filtered.metrics,
            activities: filtered.activities,
        };
        let elapsed = start.elapsed();

        DASHBOARD_SNAPSHOT_BUILD_SECONDS
            .with_label_values(&[&self.settings.instance_id])
            .observe(elapsed.as_secs_f64());
        info!(
            instance_id = %self.settings.instance_id,
            days = snapshot.series.len(),
            has_summary = snapshot.summary.is_some(),
            build_ms = elapsed.as_secs_f64() * 1000.0,
            "Snapshot built"
        );

        Ok(snapshot)
    }

    /// Threads for the community feed, narrowed and ordered per request.
    pub async fn posts(
        &self,
        spec: &FilterSpec,
        sentiment: Option<Sentiment>,
        sort: SortCriterion,
    ) -> Result<Vec<PostGroup>> {
        let data = self.source.load().await.context("load dataset")?;
        let filtered = filter(&data.metrics, &data.activities, &data.comments, spec);
        // The filter engine already narrowed comments to the platform, so
        // only sentiment narrowing remains at the post level.
        let groups = narrow(group(&filtered.comments), sentiment, None);
        Ok(sort_posts(groups, sort))
    }

    /// Production/marketing markers for the selected window.
    pub async fn activities(&self, spec: &FilterSpec) -> Result<Vec<ActivityRecord>> {
        let data = self.source.load().await.context("load dataset")?;
        let filtered = filter(&data.metrics, &data.activities, &data.comments, spec);
        Ok(filtered.activities)
    }
}
