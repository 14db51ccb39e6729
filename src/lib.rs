pub mod assets;
pub mod browser;
pub mod config;
pub mod error;
pub mod flow;
pub mod vault;

use assets::{AssetStore, ControlRoomAssets};
use browser::{discover_chrome, BrowserSession};
use config::{AppConfig, EnvLookup, FlowTimeouts, ProcessEnv, Resolver};
use error::Result;
use std::time::Duration;
use vault::{FileSecrets, OneTimeCode, SecretStore, SsoAccount, SSO_SECRET_NAME};

/// Initialize logging on stderr; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the task with configuration, secrets and assets taken from the environment.
pub async fn run() -> Result<()> {
    // A broken config file should not stop the run
    let config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load config: {}. Using in-memory defaults.", e);
            AppConfig::default()
        }
    };
    config::validate_config(&config)?;

    let secrets = FileSecrets::locate(config.vault.secrets_file.as_deref())?;
    let assets = ControlRoomAssets::from_env();
    if assets.is_none() {
        tracing::debug!("Asset storage not configured, using environment and defaults");
    }

    run_with(
        &config,
        &secrets,
        assets.as_ref().map(|a| a as &dyn AssetStore),
        &ProcessEnv,
    )
    .await
}

/// Run the task against explicit collaborators.
pub async fn run_with(
    config: &AppConfig,
    secrets: &dyn SecretStore,
    assets: Option<&dyn AssetStore>,
    env: &dyn EnvLookup,
) -> Result<()> {
    let secret = secrets.get_secret(SSO_SECRET_NAME).await?;
    let account = SsoAccount::try_from(&secret)?;
    let otp = OneTimeCode::new(&account.mfa_secret_key)?;

    let settings = Resolver::new(assets, env).resolve_settings().await?;

    let chrome_path = discover_chrome(config.browser.chrome_path.as_deref())?;
    let session = BrowserSession::launch(
        &chrome_path,
        &config.browser,
        Duration::from_secs(config.timeouts.action_secs),
    )
    .await?;

    let timeouts = FlowTimeouts::from(&config.timeouts);
    let result = flow::run_flow(session.page(), &settings, &account, &otp, &timeouts).await;

    session.close().await;
    result
}
