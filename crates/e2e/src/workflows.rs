//! Admin workflows exercised through the browser

use tracing::info;

use crate::config::Credentials;
use crate::driver::BrowserDriver;
use crate::error::{E2eError, E2eResult};
use crate::session::BrowserSession;

/// Text only shown to logged-in administrators
pub const DASHBOARD_MARKER: &str = "Uninvoice";

/// Label of the empty choice in a select widget
pub const EMPTY_CHOICE: &str = "---------";

pub async fn login<D: BrowserDriver>(
    session: &BrowserSession<D>,
    credentials: &Credentials,
) -> E2eResult<()> {
    info!("Logging in as {}", credentials.username);
    session.go("login").await?;
    session.fill("username", &credentials.username).await?;
    session.fill("password", &credentials.password).await?;
    session.click_button("Log in").await
}

/// Logging in lands on a page with the admin dashboard
pub async fn login_reaches_dashboard<D: BrowserDriver>(
    session: &BrowserSession<D>,
    credentials: &Credentials,
) -> E2eResult<()> {
    login(session, credentials).await?;

    let body = session.body_text().await?;
    if !body.contains(DASHBOARD_MARKER) {
        return Err(E2eError::AssertionFailed(format!(
            "{:?} not found in page body",
            DASHBOARD_MARKER
        )));
    }
    Ok(())
}

/// A new task form starts with no event selected
pub async fn task_form_defaults_to_no_event<D: BrowserDriver>(
    session: &BrowserSession<D>,
    credentials: &Credentials,
) -> E2eResult<()> {
    login(session, credentials).await?;

    session.go("admin-dashboard").await?;
    session.click_text("More").await?;
    session.click_text("Tasks").await?;

    let selected = session.selected_option("#id_event").await?;
    if selected != EMPTY_CHOICE {
        return Err(E2eError::AssertionFailed(format!(
            "expected {:?} selected in #id_event, got {:?}",
            EMPTY_CHOICE, selected
        )));
    }
    Ok(())
}
