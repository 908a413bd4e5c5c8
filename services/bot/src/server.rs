use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::poller::{poll_updates, sweep_sessions};
use crate::routes::ops_routes;
use applicant_intake::config::AppConfig;
use applicant_intake::error::AppError;
use applicant_intake::telegram::TelegramClient;
use applicant_intake::telemetry;
use applicant_intake::workflows::intake::{InMemorySessionStore, IntakeService};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{error, info};

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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let client = Arc::new(TelegramClient::new(&config.transport)?);
    let store = Arc::new(InMemorySessionStore::default());
    let service = Arc::new(IntakeService::new(
        store,
        client.clone(),
        config.intake.clone(),
    ));

    let app = ops_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let ops_server = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            error!(error = %err, "ops server stopped");
        }
    });
    let sweeper = tokio::spawn(sweep_sessions(service.clone()));

    info!(
        ?config.environment,
        %addr,
        reviewer = %config.intake.reviewer_chat_id,
        routing = ?config.intake.document_routing,
        "applicant intake bot started"
    );

    tokio::select! {
        _ = poll_updates(client, service, readiness_flag) => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("shutdown requested");
        }
    }

    sweeper.abort();
    ops_server.abort();
    Ok(())
}
