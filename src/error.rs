use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Every tier of a setting came up empty. The default tier always yields,
    /// so this only surfaces if a key is declared with an empty default.
    #[error("No value for {0} in asset storage, environment or defaults")]
    ConfigFallbackExhausted(&'static str),

    #[error("Secret error: {0}")]
    Secret(String),

    #[error("Asset storage error: {0}")]
    Asset(String),

    #[error("One-time code error: {0}")]
    Totp(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Timed out after {timeout:?} waiting for {what}")]
    WaitTimeout { what: String, timeout: Duration },

    #[error("Neither the SSO sign-in button nor the identity provider form appeared within {0:?}")]
    NavigationTimeout(Duration),

    #[error("Failed to start process '{process}': {reason}")]
    LaunchTimeout { process: String, reason: String },

    #[error("Cannot derive the process list address from {0}")]
    UnexpectedAddress(String),
}

pub type Result<T> = std::result::Result<T, LauncherError>;
