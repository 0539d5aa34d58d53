mod app;
mod commands;
mod config;
mod effects;
mod render;

use std::process::ExitCode;

use studio_logging::studio_error;

fn main() -> ExitCode {
    let config = match config::AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("studio_app: {err}");
            return ExitCode::FAILURE;
        }
    };
    studio_logging::initialize(config.log_destination, config.log_level);

    match app::run_app(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            studio_error!("Engine failed to start: {}", err);
            eprintln!("studio_app: {err}");
            ExitCode::FAILURE
        }
    }
}
