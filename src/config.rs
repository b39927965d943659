use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
struct RawSettings {
    #[serde(rename = "REDIS_URL")]
    redis_url: Option<String>,
    #[serde(rename = "INSTANCE_ID")]
    instance_id: Option<String>,
    #[serde(rename = "HTTP_PORT", default = "default_http_port")]
    http_port: u16,
    #[serde(rename = "PROMETHEUS_PORT", default = "default_prometheus_port")]
    prometheus_port: u16,
    #[serde(rename = "LOG_LEVEL", default = "default_log_level")]
    log_level: String,
    #[serde(rename = "DATA_PROVIDER", default = "default_data_provider")]
    data_provider: String,
    #[serde(rename = "REDIS_DATA_PREFIX", default = "default_data_prefix")]
    redis_data_prefix: String,
    #[serde(rename = "MAX_RANGE_DAYS", default = "default_max_range_days")]
    max_range_days: i64,
    #[serde(rename = "DEMO_SEED", default = "default_demo_seed")]
    demo_seed: String,
    #[serde(rename = "DEMO_DAYS", default = "default_demo_days")]
    demo_days: u32,
    #[serde(rename = "DEMO_ANCHOR_DATE")]
    demo_anchor_date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub redis_url: Option<String>,
    pub instance_id: String,
    pub http_port: u16,
    pub prometheus_port: u16,
    pub log_level: String,
    pub data_provider: String,
    pub redis_data_prefix: String,
    pub max_range_days: i64,
    pub demo_seed: String,
    pub demo_days: u32,
    pub demo_anchor_date: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, envy::Error> {
        let raw: RawSettings = envy::from_env()?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawSettings) -> Self {
        let instance_id = raw
            .instance_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("dashboard-{}", Uuid::new_v4()))
            .to_lowercase();

        Self {
            redis_url: raw.redis_url.filter(|url| !url.trim().is_empty()),
            instance_id,
            http_port: raw.http_port,
            prometheus_port: raw.prometheus_port,
            log_level: raw.log_level.to_ascii_lowercase(),
            data_provider: raw.data_provider.to_ascii_lowercase(),
            redis_data_prefix: raw.redis_data_prefix,
            max_range_days: raw.max_range_days.clamp(1, 366),
            demo_seed: raw.demo_seed,
            demo_days: raw.demo_days.clamp(1, 366),
            demo_anchor_date: raw.demo_anchor_date.filter(|d| !d.trim().is_empty()),
        }
    }
}

fn default_http_port() -> u16 {
    8000
}

fn default_prometheus_port() -> u16 {
    8001
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_provider() -> String {
    "redis".to_string()
}

fn default_data_prefix() -> String {
    "dashboard:data".to_string()
}

fn default_max_range_days() -> i64 {
    90
}

fn default_demo_seed() -> String {
    "studio-pulse".to_string()
}

fn default_demo_days() -> u32 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawSettings {
        RawSettings {
            redis_url: None,
            instance_id: None,
            http_port: default_http_port(),
            prometheus_port: default_prometheus_port(),
            log_level: default_log_level(),
            data_provider: default_data_provider(),
            redis_data_prefix: default_data_prefix(),
            max_range_days: default_max_range_days(),
            demo_seed: default_demo_seed(),
            demo_days: default_demo_days(),
            demo_anchor_date: None,
        }
    }

    #[test]
    fn missing_instance_id_gets_a_generated_one() {
        let settings = Settings::from_raw(raw());
        assert!(settings.instance_id.starts_with("dashboard-"));
    }

    #[test]
    fn blank_redis_url_is_treated_as_absent() {
        let mut input = raw();
        input.redis_url = Some("   ".to_string());
        let settings = Settings::from_raw(input);
        assert!(settings.redis_url.is_none());
    }

    #[test]
    fn range_and_demo_days_are_clamped() {
        let mut input = raw();
        input.max_range_days = 0;
        input.demo_days = 10_000;
        let settings = Settings::from_raw(input);
        assert_eq!(settings.max_range_days, 1);
        assert_eq!(settings.demo_days, 366);
    }
}
