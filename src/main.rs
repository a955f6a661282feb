use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use gzserve::cli::Cli;
use gzserve::{logger, server, AppState, Config, StartupError};
use tokio::sync::Notify;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[FATAL] {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), StartupError> {
    let cfg = Config::load_from(&cli.config, &cli.overrides())?;
    logger::init(&cfg).map_err(StartupError::Logger)?;

    // Create Tokio runtime, thread count from `server.workers`
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(StartupError::Runtime)?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), StartupError> {
    let addr = cfg.socket_addr()?;

    // Signal handlers must exist before the port accepts connections
    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown)).map_err(StartupError::Signal)?;

    let listener =
        server::create_listener(addr).map_err(|source| StartupError::Bind { addr, source })?;

    logger::log_server_start(&addr, &cfg);
    let state = Arc::new(AppState::new(cfg));

    server::run(listener, state, shutdown).await;
    Ok(())
}
