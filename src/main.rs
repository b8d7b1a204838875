use std::process::ExitCode;

use clinic_history_lib::config::ServiceConfig;

#[tokio::main]
async fn main() -> ExitCode {
    clinic_history_lib::init_tracing();

    let result = match ServiceConfig::from_env() {
        Ok(config) => clinic_history_lib::run(config).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
