//! Password editor.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use seller_dashboard_core::Email;

use crate::api::SellerApi;
use crate::error::{DashboardError, Notice, NoticeContext};
use crate::scope::{BusyFlag, ViewScope};
use crate::session::SessionStore;

/// Single-field form that sets a new password for the signed-in seller.
///
/// Goes through the same seller-update endpoint as the profile, with a body
/// of just the id and the password. The session is never touched.
#[derive(Debug)]
pub struct PasswordEditor {
    api: SellerApi,
    session: Arc<SessionStore>,
    scope: ViewScope,
    email: Email,
    new_password: SecretString,
    busy: BusyFlag,
}

impl PasswordEditor {
    /// Mount the editor with the session email shown read-only.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Unauthenticated` if nobody is signed in.
    pub fn new(
        api: SellerApi,
        session: Arc<SessionStore>,
        scope: ViewScope,
    ) -> Result<Self, DashboardError> {
        let email = session
            .current()
            .map(|s| s.profile.email)
            .ok_or(DashboardError::Unauthenticated)?;
        Ok(Self {
            api,
            session,
            scope,
            email,
            new_password: SecretString::from(""),
            busy: BusyFlag::new(),
        })
    }

    /// The read-only email field.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Whether the password field holds anything.
    #[must_use]
    pub fn has_new_password(&self) -> bool {
        !self.new_password.expose_secret().is_empty()
    }

    /// Handle for observing whether a submit is in flight.
    #[must_use]
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    /// Fill the new-password field.
    pub fn set_new_password(&mut self, password: SecretString) {
        self.new_password = password;
    }

    /// Send the new password. On success the field is cleared and the email
    /// kept.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::InvalidInput` for an empty password (nothing
    /// is sent), `DashboardError::Busy` if a submit is in flight, or the API
    /// failure. The field keeps its value on failure.
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> Result<Notice, DashboardError> {
        if !self.has_new_password() {
            return Err(DashboardError::InvalidInput(
                "Informe a nova senha.".to_owned(),
            ));
        }

        let _busy = self.busy.enter().ok_or(DashboardError::Busy)?;
        let id = self
            .session
            .current()
            .map(|s| s.id)
            .ok_or(DashboardError::Unauthenticated)?;

        self.scope
            .run(self.api.update_password(&id, &self.new_password))
            .await?;

        self.new_password = SecretString::from("");
        tracing::info!(seller_id = %id, "password updated");
        Ok(NoticeContext::Password.success())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use seller_dashboard_core::{Seller, SellerId, SellerProfile};

    use super::*;
    use crate::config::DashboardConfig;
    use crate::storage::MemoryStore;

    fn editor() -> PasswordEditor {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStore::new())));
        session
            .update(Seller::new(
                SellerId::new("1"),
                SellerProfile {
                    email: Email::parse("joao@x.com").unwrap(),
                    ..SellerProfile::default()
                },
            ))
            .unwrap();
        let api =
            SellerApi::new(DashboardConfig::new("http://127.0.0.1:9", "/tmp/unused").unwrap())
                .unwrap();
        PasswordEditor::new(api, session, ViewScope::new()).unwrap()
    }

    #[test]
    fn test_email_prefilled() {
        assert_eq!(editor().email().as_str(), "joao@x.com");
    }

    #[tokio::test]
    async fn test_empty_password_is_rejected_locally() {
        let mut editor = editor();
        let err = editor.submit().await.unwrap_err();
        assert!(matches!(err, DashboardError::InvalidInput(_)));
        assert_eq!(
            err.notice(NoticeContext::Password).description,
            "Informe a nova senha."
        );
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_field() {
        let mut editor = editor();
        editor.set_new_password(SecretString::from("nova-senha"));

        let err = editor.submit().await.unwrap_err();
        assert_eq!(
            err.notice(NoticeContext::Password).title,
            "Erro ao atualizar senha"
        );
        assert!(editor.has_new_password());
        assert!(!editor.busy_flag().is_busy());
    }
}
