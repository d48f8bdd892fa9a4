use std::env::var;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init() {
    initialize_tracing(LevelFilter::INFO);
}

/// Initialize the tracing subscriber shared by the agent and the API server.
///
/// `RUST_LOG` narrows the filter, `RUST_LOG_FORMAT=json` switches to JSON
/// output for log shippers; the default is a compact human format.
fn initialize_tracing(level: LevelFilter) {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let log_format = var("RUST_LOG_FORMAT").unwrap_or_default();

    let log_layer = match log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        _ => tracing_subscriber::fmt::layer().compact().with_filter(env_filter).boxed(),
    };

    tracing_subscriber::registry().with(log_layer).init();
}
