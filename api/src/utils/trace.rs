//! Sets up tracing to stdout for the Azure ML provisioner

use tracing::{event, Level};
use tracing_subscriber::prelude::*;

use crate::conf::LogLevel;

/// Setup our local tracer
///
/// # Arguments
///
/// * `name` - The name of the service to trace
/// * `level` - The log level to set
pub fn setup(name: &str, level: LogLevel) {
    // build our local tracer/subscriber
    let local = tracing_subscriber::fmt::layer().with_filter(level.to_filter());
    // init our tracing registry
    tracing_subscriber::registry()
        .with(local)
        .try_init()
        .expect("Failed to register stdout registry");
    // log that local tracing is enabled
    event!(Level::INFO, service = name, "Sending {} logs to stdout", level);
}
