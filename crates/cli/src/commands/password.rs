//! Password change.

use secrecy::SecretString;
use seller_dashboard::{Dashboard, Route, error::NoticeContext};

use super::CliError;

/// Set a new password for the signed-in seller.
///
/// # Errors
///
/// Returns `CliError::NotSignedIn` without a session, or the password notice
/// when the password is empty or the backend rejects it.
pub async fn update(dashboard: &Dashboard, password: SecretString) -> Result<(), CliError> {
    let (_shell, scope) = super::mount(dashboard, Route::UpdatePassword).await?;
    let mut editor = dashboard.password_editor(scope)?;

    tracing::info!("Updating password for {}", editor.email());
    editor.set_new_password(password);
    let notice = editor
        .submit()
        .await
        .map_err(|e| CliError::action(NoticeContext::Password, "update password", e))?;
    tracing::info!("{notice}");
    Ok(())
}
