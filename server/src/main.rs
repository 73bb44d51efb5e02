//! Realtime multiplayer games hub: a websocket server over
//! `tablehub_engine`. Loads `.env` via `dotenvy`, parses CLI overrides with
//! `pico-args`, installs a `ctrlc` handler, and serves via
//! `axum::serve` with graceful shutdown on `ctrl_c`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Error;
use ctrlc::set_handler;
use pico_args::Arguments;
use tracing::info;

use tablehub_server::config::HubConfig;
use tablehub_server::hub::Hub;
use tablehub_server::{build_router, logging};

const HELP: &str = "\
Run the realtime multiplayer games hub

USAGE:
  tablehub_server [OPTIONS]

OPTIONS:
  --bind                IP:PORT   Listen address              [default: env HUB_BIND or 127.0.0.1:6969]
  --challenge-ttl-secs  N         Challenge expiry, seconds    [default: env CHALLENGE_TTL_SECS or 30]
  --ai-min-delay-ms     N         AI turn delay floor, ms      [default: env AI_MIN_DELAY_MS or 800]
  --ai-max-delay-ms     N         AI turn delay ceiling, ms    [default: env AI_MAX_DELAY_MS or 2000]

FLAGS:
  -h, --help                      Print help information

ENVIRONMENT:
  HUB_BIND, CHALLENGE_TTL_SECS, AI_MIN_DELAY_MS, AI_MAX_DELAY_MS, DEFAULT_BOT_DIFFICULTY
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.value_from_str("--bind").ok();
    let challenge_ttl_secs: Option<u64> = pargs.value_from_str("--challenge-ttl-secs").ok();
    let ai_min_delay_ms: Option<u64> = pargs.value_from_str("--ai-min-delay-ms").ok();
    let ai_max_delay_ms: Option<u64> = pargs.value_from_str("--ai-max-delay-ms").ok();
    if let Some(secs) = challenge_ttl_secs {
        std::env::set_var("CHALLENGE_TTL_SECS", secs.to_string());
    }
    if let Some(ms) = ai_min_delay_ms {
        std::env::set_var("AI_MIN_DELAY_MS", ms.to_string());
    }
    if let Some(ms) = ai_max_delay_ms {
        std::env::set_var("AI_MAX_DELAY_MS", ms.to_string());
    }

    logging::init();

    let config = HubConfig::from_env(bind_override)
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    info!(bind = %config.bind, "starting hub");

    set_handler(|| std::process::exit(0))?;

    let hub = Hub::new(config.clone());

    let sweep_hub = Arc::clone(&hub);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        loop {
            interval.tick().await;
            sweep_hub.sweep_challenges();
        }
    });

    let app = build_router(hub);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind to {}: {e}", config.bind))?;

    info!(bind = %config.bind, "listening, press ctrl+c to stop");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))?;

    info!("shutting down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl+c signal handler");
}
