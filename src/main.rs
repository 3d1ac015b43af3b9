use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use vaultgate::{
    cli::Cli,
    config::Settings,
    lifecycle::{shutdown_signal, Lifecycle},
    observability::{init_logging, log_config_info},
    APP_NAME, VERSION,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if it exists; must happen before configuration is read
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();

    let mut settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}: {}", APP_NAME, e);
            return ExitCode::FAILURE;
        }
    };
    if cli.verbose {
        settings.logging.level = "debug".to_string();
    }

    if let Err(e) = init_logging(&settings.logging) {
        eprintln!("{}: {}", APP_NAME, e);
        return ExitCode::FAILURE;
    }

    info!(app_name = APP_NAME, version = VERSION, "Starting vaultgate");
    log_config_info(&settings);

    let mut lifecycle = match Lifecycle::from_settings(settings) {
        Ok(lifecycle) => lifecycle,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match lifecycle.run(shutdown_signal()).await {
        Ok(()) => {
            info!("vaultgate stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, phase = %lifecycle.phase(), "vaultgate terminated with an error");
            ExitCode::FAILURE
        }
    }
}
