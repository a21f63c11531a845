use crate::cli::ServeArgs;
use crate::infra::{seed_postings, AppState, InMemoryAttachmentStore, InMemoryJobBoardRemote};
use crate::routes::with_board_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use job_board::board::JobBoard;
use job_board::config::AppConfig;
use job_board::error::AppError;
use job_board::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let postings = seed_postings(config.board.seed_csv.as_deref())?;
    let remote = Arc::new(InMemoryJobBoardRemote::with_postings(postings));
    let attachments = Arc::new(InMemoryAttachmentStore::default());
    let board = Arc::new(JobBoard::new(remote, attachments));
    let summary = board.refresh()?;
    info!(
        jobs = summary.jobs_loaded,
        skipped = summary.jobs_skipped,
        seed = ?config.board.seed_csv,
        "job catalog seeded"
    );

    let app = with_board_routes(board, config.board.dashboard_window())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job board api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
