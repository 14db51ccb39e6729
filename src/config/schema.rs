use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Runner configuration. Everything here is about *how* the task runs; the
/// Control Room settings themselves go through [`crate::config::resolve`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Browser launch settings
    #[serde(default)]
    pub browser: BrowserSettings,

    /// Secret store settings
    #[serde(default)]
    pub vault: VaultSettings,

    /// Bounded waits used by the login and launch steps
    #[serde(default)]
    pub timeouts: TimeoutSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowserSettings {
    /// Chrome executable path; discovered when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,

    /// Run Chrome without a window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Remote debugging port (0 lets Chrome pick one)
    #[serde(default)]
    pub cdp_port: u16,

    /// Language
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Extra Chrome arguments
    #[serde(default)]
    pub custom_args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            cdp_port: 0,
            lang: default_lang(),
            custom_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VaultSettings {
    /// JSON secrets file; falls back to `RC_VAULT_SECRETS_FILE`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeoutSettings {
    /// Wait for the SSO button or the identity provider form
    #[serde(default = "default_login_form_secs")]
    pub login_form_secs: u64,

    /// Wait for the "Processes" heading after MFA
    #[serde(default = "default_landing_secs")]
    pub landing_secs: u64,

    /// Wait for the run confirmation message
    #[serde(default = "default_launch_confirmation_secs")]
    pub launch_confirmation_secs: u64,

    /// Per click/fill wait for the target element
    #[serde(default = "default_action_secs")]
    pub action_secs: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            login_form_secs: default_login_form_secs(),
            landing_secs: default_landing_secs(),
            launch_confirmation_secs: default_launch_confirmation_secs(),
            action_secs: default_action_secs(),
        }
    }
}

/// Timeouts as durations, handed to the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowTimeouts {
    pub login_form: Duration,
    pub landing: Duration,
    pub launch_confirmation: Duration,
}

impl From<&TimeoutSettings> for FlowTimeouts {
    fn from(settings: &TimeoutSettings) -> Self {
        Self {
            login_form: Duration::from_secs(settings.login_form_secs),
            landing: Duration::from_secs(settings.landing_secs),
            launch_confirmation: Duration::from_secs(settings.launch_confirmation_secs),
        }
    }
}

impl Default for FlowTimeouts {
    fn default() -> Self {
        Self::from(&TimeoutSettings::default())
    }
}

fn default_true() -> bool {
    true
}

fn default_lang() -> String {
    "en-US".to_string()
}

fn default_login_form_secs() -> u64 {
    60
}

fn default_landing_secs() -> u64 {
    30
}

fn default_launch_confirmation_secs() -> u64 {
    60
}

fn default_action_secs() -> u64 {
    30
}
