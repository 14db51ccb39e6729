//! The login-and-launch task.

pub mod launch;
pub mod login;

pub use launch::{processes_url, start_process_by_name};
pub use login::{logon_to_control_room, LoginEntry};

use crate::browser::Page;
use crate::config::resolve::ControlRoomSettings;
use crate::config::schema::FlowTimeouts;
use crate::error::Result;
use crate::vault::{CodeGenerator, SsoAccount};

/// Log in, then start the configured process. Stops at the first failure.
pub async fn run_flow<P, G>(
    page: &P,
    settings: &ControlRoomSettings,
    account: &SsoAccount,
    otp: &G,
    timeouts: &FlowTimeouts,
) -> Result<()>
where
    P: Page + ?Sized,
    G: CodeGenerator + ?Sized,
{
    tracing::info!(
        "Logging into Control Room at {} using {}.",
        settings.url,
        settings.subdomain
    );
    logon_to_control_room(page, &settings.url, &settings.subdomain, account, otp, timeouts).await?;

    tracing::info!("Starting the {} process.", settings.process_name);
    start_process_by_name(page, &settings.process_name, timeouts).await?;

    tracing::info!("SSO login demo finished.");
    Ok(())
}
