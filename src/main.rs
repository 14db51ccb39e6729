use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    sso_launcher_lib::init_tracing();

    match sso_launcher_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("SSO launch failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
