use crate::config::schema::{AppConfig, TimeoutSettings};
use crate::error::{LauncherError, Result};
use std::path::Path;

/// Validate Chrome executable path
pub fn validate_chrome_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(LauncherError::Validation(format!(
            "Chrome executable not found at {:?}",
            path
        )));
    }

    if !path.is_file() {
        return Err(LauncherError::Validation(format!(
            "Chrome path {:?} is not a file",
            path
        )));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = path.metadata().map_err(|e| {
            LauncherError::Validation(format!("Cannot read Chrome file metadata: {}", e))
        })?;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(LauncherError::Validation(format!(
                "Chrome executable {:?} is not executable",
                path
            )));
        }
    }

    Ok(())
}

/// All waits must be positive
pub fn validate_timeouts(timeouts: &TimeoutSettings) -> Result<()> {
    let checks = [
        ("login_form_secs", timeouts.login_form_secs),
        ("landing_secs", timeouts.landing_secs),
        ("launch_confirmation_secs", timeouts.launch_confirmation_secs),
        ("action_secs", timeouts.action_secs),
    ];

    for (name, value) in checks {
        if value == 0 {
            return Err(LauncherError::Validation(format!(
                "timeouts.{} must be greater than zero",
                name
            )));
        }
    }

    Ok(())
}

/// Validate the parts of the config that do not depend on the filesystem
pub fn validate_config(config: &AppConfig) -> Result<()> {
    validate_timeouts(&config.timeouts)?;

    for arg in &config.browser.custom_args {
        if arg.starts_with("--remote-debugging-port") || arg.starts_with("--user-data-dir") {
            return Err(LauncherError::Validation(format!(
                "browser.custom_args must not override {}",
                arg
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_chrome_path_missing() {
        let result = validate_chrome_path(&PathBuf::from("/nonexistent/chrome"));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_chrome_path_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = validate_chrome_path(dir.path());
        assert!(matches!(result, Err(LauncherError::Validation(msg)) if msg.contains("not a file")));
    }

    #[test]
    fn test_validate_chrome_path_current_exe() {
        let exe = std::env::current_exe().unwrap();
        assert!(validate_chrome_path(&exe).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.timeouts.landing_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("landing_secs"));
    }

    #[test]
    fn test_reserved_custom_args_rejected() {
        let mut config = AppConfig::default();
        config.browser.custom_args = vec!["--remote-debugging-port=9222".to_string()];
        assert!(validate_config(&config).is_err());

        config.browser.custom_args = vec!["--disable-gpu".to_string()];
        assert!(validate_config(&config).is_ok());
    }
}
