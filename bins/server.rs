use std::process::ExitCode;

use common::utils::logging::{init_logging, LogFormat};
use configs::AppConfig;
use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

/// Config comes first: it picks the log format and the worker count.
fn load_config() -> Result<AppConfig, ExitCode> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            init_logging(LogFormat::Compact);
            error!(service = "emudock", event = "config_invalid", error = %e, "cannot load configuration");
            Err(ExitCode::FAILURE)
        }
    }
}

fn main() -> ExitCode {
    dotenv().ok();
    let cfg = match load_config() {
        Ok(cfg) => cfg,
        Err(code) => return code,
    };
    init_logging(LogFormat::from_name(&cfg.logging.format));

    let instance = Uuid::new_v4();
    let pid = std::process::id();

    std::panic::set_hook(Box::new(move |panic| {
        error!(service = "emudock", event = "panic", %instance, pid, message = %panic, "unhandled panic");
    }));

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(threads) = cfg.server.worker_threads {
        builder.worker_threads(threads);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "emudock", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "emudock",
        event = "start",
        %instance,
        pid,
        version = env!("CARGO_PKG_VERSION"),
        log_format = %cfg.logging.format,
        threads = cfg.server.worker_threads.unwrap_or_default(),
        "emudock starting"
    );

    rt.block_on(async move {
        let server = tokio::spawn(server::run(cfg));
        tokio::select! {
            res = server => match res {
                Ok(Ok(())) => {
                    info!(service = "emudock", event = "stop", %instance, "server stopped");
                    ExitCode::SUCCESS
                }
                Ok(Err(e)) => {
                    error!(service = "emudock", event = "run_failed", error = %e, "server failed");
                    ExitCode::FAILURE
                }
                Err(e) => {
                    error!(service = "emudock", event = "task_join_error", error = %e, "server task join error");
                    ExitCode::FAILURE
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!(service = "emudock", event = "shutdown_signal", %instance, "received Ctrl+C, shutting down");
                ExitCode::SUCCESS
            }
        }
    })
}
