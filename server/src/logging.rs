//! Structured logging setup.
//!
//! The engine crate depends only on `log`; this crate depends on both `log`
//! and `tracing`. `tracing_log::LogTracer::init()` bridges the two: it
//! installs a `log::Log` implementation that re-emits every `log` record as
//! a `tracing` event, so one `RUST_LOG` filter governs both crates.
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init() {
    tracing_log::LogTracer::init().expect("LogTracer can only be installed once");

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
}
