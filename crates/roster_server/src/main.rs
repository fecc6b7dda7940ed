//! Server entry point.
//!
//! # Responsibility
//! - Load `.env`, read configuration, start logging and run the server.
//! - Report startup failures on stderr with a non-zero exit code.

use log::error;
use roster_server::config::ServerConfig;
use roster_server::{init_server_logging, serve};
use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("roster_server: configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_server_logging(&config) {
        eprintln!("roster_server: {err}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("event=runtime_start module=server status=error error={err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(serve(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=server status=error error={err}");
            ExitCode::FAILURE
        }
    }
}
