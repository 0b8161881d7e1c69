#![cfg(not(tarpaulin_include))]

use checkin::app;
use checkin::config::Config;
use log::warn;
use std::env;

/// Main entry point for the check-in server
///
/// Reads the `CHECKIN_*` environment configuration and serves the dashboard.
///
/// # Arguments
/// * First command line argument, if present, overrides the port
///
/// # Logging
/// * `RUST_LOG` controls the filter, `info` by default
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = Config::load();

    let args: Vec<String> = env::args().collect();
    if let Some(port) = args.get(1) {
        match port.parse() {
            Ok(port) => config.port = port,
            Err(e) => warn!("Ignoring port argument '{}': {}", port, e),
        }
    }

    app::run(config).await
}
