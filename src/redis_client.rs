use anyhow::Context;
use redis::{aio::ConnectionManager, Client};
use tokio::sync::Mutex;

/// Thin wrapper over the backend store. The dashboard only ever reads
/// whole JSON documents, so GET and PING are the entire surface.
#[derive(Clone)]
pub struct RedisClient {
    inner: std::sync::Arc<Mutex<ConnectionManager>>,
}

impl RedisClient {
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let client = Client::open(url.to_string()).context("Failed to create Redis client")?;
        let manager = client
            .get_tokio_connection_manager()
            .await
            .context("Failed to create Redis connection manager")?;
        Ok(Self {
            inner: std::sync::Arc::new(Mutex::new(manager)),
        })
    }

    pub async fn ensure_connection(&self) -> anyhow::Result<()> {
        let mut conn = self.inner.lock().await;
        redis::cmd("PING")
            .query_async::<_, ()>(&mut *conn)
            .await
            .context("Redis PING failed")
    }

    pub async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let mut conn = self.inner.lock().await;
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut *conn)
            .await
            .with_context(|| format!("Redis GET failed for {key}"))
    }
}
