use crate::config::schema::BrowserSettings;
use crate::config::validation::validate_chrome_path;
use crate::error::{LauncherError, Result};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

/// Written by Chrome into the user data dir once the debugging port is bound
const ACTIVE_PORT_FILE: &str = "DevToolsActivePort";

const MAX_RETRIES: u32 = 30;
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Locate Chrome: configured path, then `CHROME_PATH`, then common locations.
pub fn discover_chrome(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        validate_chrome_path(path)?;
        return Ok(path.to_path_buf());
    }

    if let Some(path) = std::env::var_os("CHROME_PATH").filter(|p| !p.is_empty()) {
        let path = PathBuf::from(path);
        validate_chrome_path(&path)?;
        return Ok(path);
    }

    chrome_candidates()
        .iter()
        .map(PathBuf::from)
        .find(|p| validate_chrome_path(p).is_ok())
        .ok_or_else(|| {
            LauncherError::Validation(
                "Chrome not found; set browser.chrome_path or CHROME_PATH".to_string(),
            )
        })
}

fn chrome_candidates() -> &'static [&'static str] {
    #[cfg(target_os = "linux")]
    {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium-browser",
            "/usr/bin/chromium",
            "/usr/local/bin/google-chrome",
            "/snap/bin/chromium",
        ]
    }
    #[cfg(target_os = "macos")]
    {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ]
    }
    #[cfg(target_os = "windows")]
    {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ]
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        &[]
    }
}

/// Build Chrome launch command with all parameters
pub fn build_command(chrome_path: &Path, settings: &BrowserSettings, user_data_dir: &Path) -> Command {
    let mut cmd = Command::new(chrome_path);

    cmd.arg(format!("--user-data-dir={}", user_data_dir.display()));
    cmd.arg(format!("--remote-debugging-port={}", settings.cdp_port));

    if settings.headless {
        cmd.arg("--headless=new");
        cmd.arg("--disable-gpu");
    }

    cmd.arg("--no-first-run");
    cmd.arg("--no-default-browser-check");
    cmd.arg("--disable-background-networking");
    cmd.arg("--disable-sync");
    cmd.arg(format!("--lang={}", settings.lang));

    for arg in &settings.custom_args {
        cmd.arg(arg);
    }

    // Start on about:blank so there is exactly one page target
    cmd.arg("about:blank");

    cmd.stdout(Stdio::null()).stderr(Stdio::null());
    cmd
}

/// A Chrome process owned by this run. Killed, and its profile removed, on drop.
pub struct ChromeProcess {
    child: Option<Child>,
    user_data_dir: PathBuf,
    cdp_port: u16,
}

impl ChromeProcess {
    /// Spawn Chrome with a throwaway profile and wait for its debugging port.
    pub async fn spawn(chrome_path: &Path, settings: &BrowserSettings) -> Result<Self> {
        let user_data_dir = std::env::temp_dir().join(format!("sso-launcher-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&user_data_dir)?;

        let child = build_command(chrome_path, settings, &user_data_dir)
            .spawn()
            .map_err(|e| LauncherError::Browser(format!("Failed to launch Chrome: {}", e)))?;
        tracing::info!("Launched Chrome pid={} from {:?}", child.id(), chrome_path);

        let mut process = Self {
            child: Some(child),
            user_data_dir,
            cdp_port: settings.cdp_port,
        };

        if process.cdp_port == 0 {
            process.cdp_port = process.wait_for_active_port().await?;
        }
        Ok(process)
    }

    pub fn cdp_port(&self) -> u16 {
        self.cdp_port
    }

    async fn wait_for_active_port(&mut self) -> Result<u16> {
        let port_file = self.user_data_dir.join(ACTIVE_PORT_FILE);

        for _ in 0..MAX_RETRIES {
            tokio::time::sleep(RETRY_DELAY).await;

            if let Some(child) = self.child.as_mut() {
                if let Ok(Some(status)) = child.try_wait() {
                    return Err(LauncherError::Browser(format!(
                        "Chrome exited during startup with {}",
                        status
                    )));
                }
            }

            if let Ok(content) = tokio::fs::read_to_string(&port_file).await {
                if let Some(port) = parse_active_port(&content) {
                    tracing::debug!("Chrome debugging port {}", port);
                    return Ok(port);
                }
            }
        }

        Err(LauncherError::Browser(format!(
            "Chrome did not report a debugging port after {} retries",
            MAX_RETRIES
        )))
    }

    /// Poll the debugging endpoint until a page target is available
    pub async fn page_target(&self) -> Result<String> {
        let mut last_error = String::new();

        for retry in 1..=MAX_RETRIES {
            match crate::browser::cdp::find_page_target(self.cdp_port).await {
                Ok(ws_url) => return Ok(ws_url),
                Err(e) => last_error = e,
            }
            tracing::debug!("Retry {}/{}: {}", retry, MAX_RETRIES, last_error);
            tokio::time::sleep(RETRY_DELAY).await;
        }

        Err(LauncherError::Browser(format!(
            "Failed to connect to Chrome after {} retries: {}",
            MAX_RETRIES, last_error
        )))
    }

    pub fn kill(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            tracing::debug!("Chrome process stopped");
        }
        let _ = std::fs::remove_dir_all(&self.user_data_dir);
    }
}

impl Drop for ChromeProcess {
    fn drop(&mut self) {
        self.kill();
    }
}

/// First line of `DevToolsActivePort` is the port number
fn parse_active_port(content: &str) -> Option<u16> {
    content
        .lines()
        .next()
        .and_then(|line| line.trim().parse().ok())
        .filter(|port| *port != 0)
}
