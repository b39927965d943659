use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = dashboard_rs::config::Settings::from_env()?;
    dashboard_rs::logging::init(&settings.log_level);

    dashboard_rs::app::run(settings).await
}
