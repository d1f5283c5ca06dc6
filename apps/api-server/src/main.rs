//! # Postmate API Server
//!
//! Serves the WhatsApp webhook and the management API, and runs the
//! publishing schedule in the background.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

#[cfg(feature = "scheduler")]
mod background;
mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;
#[cfg(test)]
mod testing;

use config::AppConfig;
use observability::RequestIdMiddleware;
use postmate_core::ports::TokenService;
use postmate_infra::JwtTokenService;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Needs the runtime: the alert layer spawns its sender task.
    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();
    tracing::info!(
        "Starting Postmate API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await?;
    let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());

    #[cfg(feature = "scheduler")]
    let scheduler = start_scheduler(&state).await?;

    let app_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::Data::new(token_service.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    #[cfg(feature = "scheduler")]
    if let Some(mut scheduler) = scheduler {
        scheduler.shutdown().await?;
    }

    tracing::info!("Server stopped");
    Ok(())
}

#[cfg(feature = "scheduler")]
async fn start_scheduler(
    state: &AppState,
) -> anyhow::Result<Option<background::scheduler::Scheduler>> {
    use background::scheduler::{Scheduler, SchedulerConfig};

    let scheduler_config = SchedulerConfig::from_env();
    if !scheduler_config.enabled {
        tracing::warn!("Scheduler disabled; approved posts will not be published");
        return Ok(None);
    }

    let scheduler = Scheduler::new(scheduler_config).await?;
    scheduler
        .register_publisher(state.orchestrator.clone())
        .await?;
    scheduler.start().await?;
    Ok(Some(scheduler))
}
