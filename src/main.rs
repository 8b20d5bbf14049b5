//! SoundFlow - audio track library with playlists and track insights
//!
//! Serves the library over JSON routes, backed either by a hosted
//! Supabase-compatible service or by a local emulation kept in SQLite.

#![allow(dead_code)]

mod api;
mod auth;
mod backend;
mod config;
mod core;
mod db;
mod insights;
mod models;
mod utils;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::auth::AuthEvent;

/// SoundFlow - audio track library service
#[derive(Parser, Debug)]
#[command(name = "soundflow")]
#[command(version)]
#[command(about = "Audio track library with playlists and track insights")]
struct Args {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 1970)]
    port: u16,

    /// Enable debug mode
    #[arg(long)]
    debug: bool,

    /// Path to data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Skip the simulated latencies of the local backend
    #[arg(long)]
    no_latency: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // SOUNDFLOW_LOG overrides the level picked by --debug
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("SOUNDFLOW_LOG").unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("{},sqlx=warn", log_level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("SoundFlow v{} starting...", env!("CARGO_PKG_VERSION"));

    let paths = config::Paths::new(args.data_dir)?;
    info!("Data directory: {:?}", paths.data_dir());

    let mut settings = config::Settings::load(&paths)?;
    if args.no_latency {
        settings.disable_latency();
    }

    start_soundflow(args.host, args.port, &paths, &settings).await
}

async fn start_soundflow(
    host: String,
    port: u16,
    paths: &config::Paths,
    settings: &config::Settings,
) -> Result<()> {
    use actix_cors::Cors;
    use actix_web::{middleware, web, App, HttpServer};

    let remote = config::RemoteConfig::from_env();
    let backends = backend::create_backends(&remote, settings, paths).await?;
    info!("Library backend: {:?}", backends.library.mode());

    let generator = Arc::new(insights::MockInsightGenerator::new(settings.insight_delay()));
    let state = web::Data::new(api::AppState::new(backends, generator));
    tokio::spawn(log_auth_events(state.sessions.subscribe()));

    let addr = format!("{}:{}", host, port);
    info!("Starting server on http://{}", addr);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(api::configure)
            .default_service(web::to(api::redirect_to_dashboard))
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}

async fn log_auth_events(mut events: broadcast::Receiver<AuthEvent>) {
    loop {
        match events.recv().await {
            Ok(AuthEvent::SignedIn(user)) => debug!("Auth state: signed in as {}", user.email),
            Ok(AuthEvent::SignedOut) => debug!("Auth state: signed out"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Missed {} auth events", skipped)
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
