mod cli;

use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};
use machine_learning::Baseline;
use tokio::signal;

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let model = Box::new(Baseline::new(config.frame_len, config.seed));

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
        info!("received SIGINT");
    };

    match orchestrator::run(config, model, shutdown).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
