use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

use crate::api::{self, AppState};
use crate::config::Settings;
use crate::datasource::build_data_source;
use crate::metrics::gather_metrics;
use crate::service::DashboardService;

pub async fn run(settings: Settings) -> Result<()> {
    let settings = Arc::new(settings);
    let source = build_data_source(&settings).await;
    let service = DashboardService::new(settings.clone(), source);
    let state = Arc::new(AppState {
        settings: settings.clone(),
        service,
    });

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let http_server = serve_http(state, settings.http_port, shutdown_tx.subscribe());
    let metrics_server = serve_metrics(settings.clone(), shutdown_tx.subscribe());

    info!(
        instance_id = %settings.instance_id,
        http_port = settings.http_port,
        metrics_port = settings.prometheus_port,
        "Dashboard service started"
    );

    signal::ctrl_c().await?;
    info!("Shutdown signal received");

    let _ = shutdown_tx.send(());
    http_server.await.ok();
    metrics_server.await.ok();

    info!("Dashboard service shutdown complete");
    Ok(())
}

fn serve_http(
    state: Arc<AppState>,
    port: u16,
    shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    spawn_server(api::router(state), port, shutdown)
}

fn serve_metrics(settings: Arc<Settings>, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
    let router = Router::new().route(
        "/metrics",
        get(move || async move {
            let body = gather_metrics();
            axum::response::Response::builder()
                .header("Content-Type", prometheus::TEXT_FORMAT)
                .body(body)
                .unwrap()
        }),
    );
    spawn_server(router, settings.prometheus_port, shutdown)
}

fn spawn_server(app: Router, port: u16, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("bind listener");
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await
            .ok();
    })
}
