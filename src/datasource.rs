use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::config::Settings;
use crate::demo;
use crate::metrics::{DATASOURCE_FALLBACK_TOTAL, DATASOURCE_FETCH_SECONDS};
use crate::redis_client::RedisClient;
use crate::types::{ActivityRecord, CommentRecord, MetricRecord};

/// The three raw collections the analytics pipeline consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub metrics: Vec<MetricRecord>,
    pub activities: Vec<ActivityRecord>,
    pub comments: Vec<CommentRecord>,
}

impl Dataset {
    /// A backend answering with no metrics and no comments has nothing to
    /// render; activity markers alone do not make a dashboard.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.comments.is_empty()
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn load(&self) -> Result<Dataset>;
}

/// Reads the three collections from the hosted backend store, stored as
/// JSON array documents under `{prefix}:metrics|activities|comments`.
pub struct RedisDataSource {
    redis: RedisClient,
    settings: Arc<Settings>,
}

impl RedisDataSource {
    pub fn new(redis: RedisClient, settings: Arc<Settings>) -> Self {
        Self { redis, settings }
    }

    async fn fetch<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let key = format!("{}:{collection}", self.settings.redis_data_prefix);
        let Some(payload) = self.redis.get(&key).await? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&payload).with_context(|| format!("decode {key}"))
    }
}

#[async_trait]
impl DataSource for RedisDataSource {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn load(&self) -> Result<Dataset> {
        let start = Instant::now();
        let (metrics, activities, comments) = futures::try_join!(
            self.fetch::<MetricRecord>("metrics"),
            self.fetch::<ActivityRecord>("activities"),
            self.fetch::<CommentRecord>("comments"),
        )?;
        DATASOURCE_FETCH_SECONDS
            .with_label_values(&[&self.settings.instance_id, self.name()])
            .observe(start.elapsed().as_secs_f64());
        Ok(Dataset {
            metrics,
            activities,
            comments,
        })
    }
}

/// Deterministic synthetic dataset; see the `demo` module.
pub struct DemoDataSource {
    settings: Arc<Settings>,
}

impl DemoDataSource {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl DataSource for DemoDataSource {
    fn name(&self) -> &'static str {
        "demo"
    }

    async fn load(&self) -> Result<Dataset> {
        let start = Instant::now();
        let dataset = demo::generate(&self.settings);
        DATASOURCE_FETCH_SECONDS
            .with_label_values(&[&self.settings.instance_id, self.name()])
            .observe(start.elapsed().as_secs_f64());
        Ok(dataset)
    }
}

/// Serves the primary source, falling back to the secondary when the
/// primary errors or answers with an empty dataset. The dashboard always
/// has something to show.
pub struct FallbackDataSource {
    primary: Arc<dyn DataSource>,
    fallback: Arc<dyn DataSource>,
    instance_id: String,
}

impl FallbackDataSource {
    pub fn new(
        primary: Arc<dyn DataSource>,
        fallback: Arc<dyn DataSource>,
        instance_id: String,
    ) -> Self {
        Self {
            primary,
            fallback,
            instance_id,
        }
    }
}

#[async_trait]
impl DataSource for FallbackDataSource {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn load(&self) -> Result<Dataset> {
        match self.primary.load().await {
            Ok(dataset) if !dataset.is_empty() => return Ok(dataset),
            Ok(_) => {
                warn!(
                    instance_id = %self.instance_id,
                    primary = self.primary.name(),
                    "Primary data source returned an empty dataset; using fallback"
                );
                DATASOURCE_FALLBACK_TOTAL
                    .with_label_values(&[&self.instance_id, "empty"])
                    .inc();
            }
            Err(err) => {
                warn!(
                    instance_id = %self.instance_id,
                    primary = self.primary.name(),
                    error = %err,
                    "Primary data source failed; using fallback"
                );
                DATASOURCE_FALLBACK_TOTAL
                    .with_label_values(&[&self.instance_id, "error"])
                    .inc();
            }
        }
        self.fallback.load().await
    }
}

/// Wire up the configured source. A missing or unreachable backend never
/// prevents startup; the demo generator takes over instead.
pub async fn build_data_source(settings: &Arc<Settings>) -> Arc<dyn DataSource> {
    let demo: Arc<dyn DataSource> = Arc::new(DemoDataSource::new(settings.clone()));

    if settings.data_provider != "redis" {
        info!(provider = %settings.data_provider, "Using demo data source");
        return demo;
    }

    let Some(url) = settings.redis_url.as_deref() else {
        warn!("DATA_PROVIDER is redis but REDIS_URL is unset; using demo data source");
        return demo;
    };

    match RedisClient::new(url).await {
        Ok(redis) => {
            if let Err(err) = redis.ensure_connection().await {
                warn!(error = %err, "Redis backend unreachable at startup; requests will fall back until it recovers");
            }
            let primary: Arc<dyn DataSource> =
                Arc::new(RedisDataSource::new(redis, settings.clone()));
            Arc::new(FallbackDataSource::new(
                primary,
                demo,
                settings.instance_id.clone(),
            ))
        }
        Err(err) => {
            warn!(error = %err, "Failed to initialise Redis client; using demo data source");
            demo
        }
    }
}
