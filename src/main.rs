use std::process::ExitCode;

use glassfall::{Landing, LandingConfig};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => match LandingConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!(%err, "could not load configuration");
                return ExitCode::FAILURE;
            }
        },
        None => LandingConfig::default(),
    };

    match Landing::new().with_config(config).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "landing scene failed");
            ExitCode::FAILURE
        }
    }
}
