//! Signup, login, logout and whoami.

use secrecy::SecretString;
use seller_dashboard::{Dashboard, DashboardError, SignupRequest, ViewScope, error::NoticeContext};
use seller_dashboard_core::{Email, HourField, SellerProfile};

use super::CliError;
use crate::ProfileArgs;

/// Build a signup request from command-line fields.
///
/// Missing text fields are sent empty; missing hours are sent unset.
///
/// # Errors
///
/// Returns `DashboardError::InvalidInput` for a missing or malformed email.
pub fn signup_request(
    args: ProfileArgs,
    password: SecretString,
) -> Result<SignupRequest, DashboardError> {
    let email = Email::parse(args.email.as_deref().unwrap_or_default())?;

    let profile = SellerProfile {
        full_name: args.full_name.unwrap_or_default(),
        email,
        phone: args.phone.unwrap_or_default(),
        street: args.street.unwrap_or_default(),
        number: args.number.unwrap_or_default(),
        complement: args.complement.filter(|c| !c.is_empty()),
        neighborhood: args.neighborhood.unwrap_or_default(),
        city: args.city.unwrap_or_default(),
        state: args.state.unwrap_or_default(),
        zip_code: args.zip_code.unwrap_or_default(),
        ..SellerProfile::default()
    };

    let mut request = SignupRequest::new(profile, password);
    if let Some(opens) = args.opens {
        request.set_opening_hour(HourField::Start, &opens);
    }
    if let Some(closes) = args.closes {
        request.set_opening_hour(HourField::End, &closes);
    }
    Ok(request)
}

/// Register a new seller.
///
/// # Errors
///
/// Returns the signup notice (the backend's validation message when it
/// sends one).
pub async fn signup(
    dashboard: &Dashboard,
    args: ProfileArgs,
    password: SecretString,
) -> Result<(), CliError> {
    let request = signup_request(args, password)
        .map_err(|e| CliError::action(NoticeContext::Signup, "signup", e))?;

    dashboard
        .auth()
        .signup(&request, &ViewScope::new())
        .await
        .map_err(|e| CliError::action(NoticeContext::Signup, "signup", e))?;

    tracing::info!("{}", NoticeContext::Signup.success());
    tracing::info!("Sign in with `seller login -e {}`", request.profile.email);
    Ok(())
}

/// Sign in and persist the session.
///
/// # Errors
///
/// Returns the login notice on any failure.
pub async fn login(
    dashboard: &Dashboard,
    email: &str,
    password: &SecretString,
) -> Result<(), CliError> {
    let mut shell = dashboard.shell();
    let navigation = dashboard
        .auth()
        .login(email, password, &shell.scope().clone())
        .await
        .map_err(|e| CliError::action(NoticeContext::Login, "login", e))?;
    shell.follow(navigation);

    tracing::info!("{}", NoticeContext::Login.success());
    if let Some(name) = shell.header_name() {
        tracing::info!("Signed in as {name}");
    }
    Ok(())
}

/// Sign out. Always succeeds locally.
pub async fn logout(dashboard: &Dashboard) {
    // Load the stored cookies so the backend can end the right session.
    let _ = dashboard.auth().restore().await;
    dashboard.auth().logout().await;
    tracing::info!("Signed out");
}

/// Show the signed-in seller.
///
/// # Errors
///
/// Returns `CliError::NotSignedIn` if no session can be restored.
pub async fn whoami(dashboard: &Dashboard) -> Result<(), CliError> {
    let (shell, _scope) = super::mount(dashboard, seller_dashboard::Route::Profile).await?;
    let seller = dashboard.session().current().ok_or(CliError::NotSignedIn)?;

    tracing::info!("{} <{}> (id {})", seller.full_name(), seller.email(), seller.id);
    let nav = shell
        .nav_items()
        .iter()
        .map(|item| item.label)
        .collect::<Vec<_>>()
        .join(" | ");
    tracing::info!("Sections: {nav}");
    Ok(())
}
