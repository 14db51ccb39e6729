//! SSO login through the Okta-hosted identity provider, including the TOTP step.

use crate::browser::{Page, Selector};
use crate::config::schema::FlowTimeouts;
use crate::error::{LauncherError, Result};
use crate::vault::{CodeGenerator, SsoAccount};

/// Element lookups used on the login pages
pub struct LoginSelectors {
    pub sso_button: Selector,
    pub realm: Selector,
    pub continue_button: Selector,
    pub username: Selector,
    pub password: Selector,
    pub sign_in: Selector,
    pub mfa_answer: Selector,
    pub verify: Selector,
    pub landing_heading: Selector,
}

impl Default for LoginSelectors {
    fn default() -> Self {
        Self {
            sso_button: Selector::xpath("//span[contains(.,'Sign in with SSO')]"),
            realm: Selector::xpath("//*[@name='realm']"),
            continue_button: Selector::xpath("//span[contains(.,'Continue')]"),
            username: Selector::id("okta-signin-username"),
            password: Selector::id("okta-signin-password"),
            sign_in: Selector::id("okta-signin-submit"),
            mfa_answer: Selector::xpath("//*[@name='answer']"),
            verify: Selector::xpath("//input[@value='Verify']"),
            landing_heading: Selector::xpath("//h1[contains(.,'Processes')]"),
        }
    }
}

/// Which login page the console showed first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginEntry {
    /// Console's own sign-in page with the SSO button
    SsoButton,
    /// Already redirected to the identity provider's form
    ProviderForm,
}

/// Log into the console at `url`. Returns once the process list heading shows.
pub async fn logon_to_control_room<P, G>(
    page: &P,
    url: &str,
    subdomain: &str,
    account: &SsoAccount,
    otp: &G,
    timeouts: &FlowTimeouts,
) -> Result<LoginEntry>
where
    P: Page + ?Sized,
    G: CodeGenerator + ?Sized,
{
    let sel = LoginSelectors::default();

    page.goto(url).await?;

    let entry = detect_login_entry(page, &sel, timeouts).await?;
    tracing::debug!("Login entry: {:?}", entry);

    if entry == LoginEntry::SsoButton {
        page.click(&sel.sso_button).await?;
        page.fill(&sel.realm, subdomain).await?;
        page.click(&sel.continue_button).await?;
    }

    page.fill(&sel.username, &account.email).await?;
    page.fill(&sel.password, &account.password).await?;
    page.click(&sel.sign_in).await?;

    // Generated after submit, right before it is entered
    let code = otp.current_code()?;
    page.fill(&sel.mfa_answer, &code).await?;
    page.click(&sel.verify).await?;

    page.wait_for_visible(&sel.landing_heading, timeouts.landing).await?;

    tracing::info!("Logged into Control Room");
    Ok(entry)
}

/// Wait for either login page, then decide by what is actually visible: the
/// SSO button when shown, otherwise the provider form.
async fn detect_login_entry<P: Page + ?Sized>(
    page: &P,
    sel: &LoginSelectors,
    timeouts: &FlowTimeouts,
) -> Result<LoginEntry> {
    page.wait_for_any_visible(&[&sel.sso_button, &sel.sign_in], timeouts.login_form)
        .await
        .map_err(|e| match e {
            LauncherError::WaitTimeout { timeout, .. } => LauncherError::NavigationTimeout(timeout),
            other => other,
        })?;

    if page.is_visible(&sel.sso_button).await? {
        Ok(LoginEntry::SsoButton)
    } else {
        Ok(LoginEntry::ProviderForm)
    }
}
