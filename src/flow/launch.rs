//! Start a process from the Control Room process list.

use crate::browser::selector::xpath_literal;
use crate::browser::{Page, Selector};
use crate::config::schema::FlowTimeouts;
use crate::error::{LauncherError, Result};
use reqwest::Url;

/// Path of the process list view
pub const PROCESSES_PATH: &str = "/processes";

/// Confirmation text as the console renders it, spelling included
const RUN_STARTED_TEXT: &str = "Process Run started succesfully";

/// Derive `<scheme>://<host>/<org>/<workspace>/processes` from any address
/// inside a workspace.
///
/// Assumes the first two path segments are the organization and workspace.
/// Anything shorter is rejected instead of guessed.
pub fn processes_url(current: &str) -> Result<String> {
    let unexpected = || LauncherError::UnexpectedAddress(current.to_string());

    let mut url = Url::parse(current).map_err(|_| unexpected())?;
    let segments: Vec<String> = url
        .path_segments()
        .ok_or_else(unexpected)?
        .take(2)
        .map(str::to_string)
        .collect();

    let [organization, workspace] = segments.as_slice() else {
        return Err(unexpected());
    };
    if organization.is_empty() || workspace.is_empty() {
        return Err(unexpected());
    }

    url.set_path(&format!("/{}/{}{}", organization, workspace, PROCESSES_PATH));
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}

/// Open the named process from the list and trigger a run.
pub async fn start_process_by_name<P: Page + ?Sized>(
    page: &P,
    name: &str,
    timeouts: &FlowTimeouts,
) -> Result<()> {
    let current = page.url().await?;
    if !current.ends_with(PROCESSES_PATH) {
        let target = processes_url(&current)?;
        tracing::debug!("Switching from {} to process list {}", current, target);
        page.goto(&target).await?;
    }

    let row_link = Selector::xpath(format!("//table//a[contains(.,{})]", xpath_literal(name)));
    let run_options = Selector::id("process__run-options");
    let run_item = Selector::role("menuitem", "Run", true);
    let confirmation = Selector::xpath(format!(
        "//p[contains(.,{})]",
        xpath_literal(RUN_STARTED_TEXT)
    ));

    page.click(&row_link)
        .await
        .map_err(|e| launch_failure(name, "process not found in the list", e))?;
    page.click(&run_options)
        .await
        .map_err(|e| launch_failure(name, "run options control not found", e))?;
    page.click(&run_item)
        .await
        .map_err(|e| launch_failure(name, "Run menu item not found", e))?;
    page.wait_for_visible(&confirmation, timeouts.launch_confirmation)
        .await
        .map_err(|e| launch_failure(name, "run confirmation did not appear", e))?;

    tracing::info!("Process {} run started", name);
    Ok(())
}

/// Missing elements become `LaunchTimeout`; transport failures pass through.
fn launch_failure(process: &str, reason: &str, error: LauncherError) -> LauncherError {
    match error {
        LauncherError::WaitTimeout { timeout, .. } => LauncherError::LaunchTimeout {
            process: process.to_string(),
            reason: format!("{} within {:?}", reason, timeout),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processes_url_from_workspace_page() {
        assert_eq!(
            processes_url("https://host/org/workspace/anything").unwrap(),
            "https://host/org/workspace/processes"
        );
    }

    #[test]
    fn test_processes_url_drops_query_and_deeper_path() {
        assert_eq!(
            processes_url("https://cloud.robocorp.com/acme/prod/robots/123?tab=runs#top").unwrap(),
            "https://cloud.robocorp.com/acme/prod/processes"
        );
    }

    #[test]
    fn test_processes_url_keeps_port() {
        assert_eq!(
            processes_url("http://127.0.0.1:8080/org/ws/home").unwrap(),
            "http://127.0.0.1:8080/org/ws/processes"
        );
    }

    #[test]
    fn test_processes_url_rejects_short_paths() {
        for address in [
            "https://cloud.robocorp.com/",
            "https://cloud.robocorp.com/org",
            "https://cloud.robocorp.com/org/",
            "not a url",
        ] {
            assert!(
                matches!(processes_url(address), Err(LauncherError::UnexpectedAddress(_))),
                "{} should be rejected",
                address
            );
        }
    }

    #[test]
    fn test_launch_failure_mapping() {
        let timeout = LauncherError::WaitTimeout {
            what: "xpath=//table".to_string(),
            timeout: std::time::Duration::from_secs(30),
        };
        assert!(matches!(
            launch_failure("Demo", "process not found in the list", timeout),
            LauncherError::LaunchTimeout { process, .. } if process == "Demo"
        ));

        let browser = LauncherError::Browser("socket closed".to_string());
        assert!(matches!(
            launch_failure("Demo", "x", browser),
            LauncherError::Browser(_)
        ));
    }
}
