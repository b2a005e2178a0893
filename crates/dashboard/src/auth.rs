//! Auth gateway: login, signup, logout and session revalidation.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::instrument;

use seller_dashboard_core::{Email, HourField, SellerProfile};

use crate::api::{Credentials, SellerApi};
use crate::error::DashboardError;
use crate::scope::ViewScope;
use crate::session::SessionStore;
use crate::shell::{Navigation, Route};
use crate::storage::COOKIES_KEY;

/// Registration payload: every profile field plus the password.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub profile: SellerProfile,
    pub password: SecretString,
}

impl SignupRequest {
    /// Build a request from profile fields and a password.
    #[must_use]
    pub const fn new(profile: SellerProfile, password: SecretString) -> Self {
        Self { profile, password }
    }

    /// Coerce an opening-hours form field into the request.
    pub fn set_opening_hour(&mut self, field: HourField, input: &str) {
        self.profile.opening_hours.set(field, input);
    }
}

/// Thin wrapper over the auth/seller endpoints that keeps the session
/// store in step with the backend.
#[derive(Debug, Clone)]
pub struct AuthGateway {
    api: SellerApi,
    session: Arc<SessionStore>,
}

impl AuthGateway {
    /// Create a gateway over `api` and `session`.
    #[must_use]
    pub const fn new(api: SellerApi, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    /// The session this gateway maintains.
    #[must_use]
    pub const fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Whether a seller is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Hydrate the persisted session and revalidate it against the backend.
    ///
    /// The persisted seller is applied optimistically, then looked up by id.
    /// Any failure (unreadable slot, network error, error status, body with
    /// no identity) leaves the session anonymous.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Navigation {
        let seller = match self.session.hydrate() {
            Ok(Some(seller)) => seller,
            Ok(None) => return Navigation::Redirect(Route::Login),
            Err(e) => {
                DashboardError::from(e).report("restore");
                self.clear_local();
                return Navigation::Redirect(Route::Login);
            }
        };

        match self.session.storage().get(COOKIES_KEY) {
            Ok(Some(cookies)) => self.api.import_cookies(&cookies),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "could not read persisted cookies"),
        }

        match self.api.get_seller(&seller.id, Credentials::Include).await {
            Ok(_) => {
                tracing::info!(seller_id = %seller.id, "session revalidated");
                Navigation::Redirect(Route::Profile)
            }
            Err(e) => {
                tracing::info!(seller_id = %seller.id, error = %e, "session rejected, signing out");
                self.clear_local();
                Navigation::Redirect(Route::Login)
            }
        }
    }

    /// Submit credentials, load the full seller record and store it as the
    /// session.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed email, rejected credentials, transport
    /// failures, or if the session cannot be persisted. The session is left
    /// unchanged on error.
    #[instrument(skip(self, password, scope))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
        scope: &ViewScope,
    ) -> Result<Navigation, DashboardError> {
        let email = Email::parse(email)?;

        let id = scope.run(self.api.login(&email, password)).await?;
        let seller = scope
            .run(self.api.get_seller(&id, Credentials::Omit))
            .await?;

        self.session.update(seller)?;
        self.persist_cookies();

        tracing::info!(seller_id = %id, "seller logged in");
        Ok(Navigation::Redirect(Route::Profile))
    }

    /// Register a new seller and store the returned record as the session.
    ///
    /// On success the seller is sent to the login page.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` (wrapped) carrying the backend's first
    /// issue message when registration is rejected, or any transport/storage
    /// error.
    #[instrument(skip(self, request, scope), fields(email = %request.profile.email))]
    pub async fn signup(
        &self,
        request: &SignupRequest,
        scope: &ViewScope,
    ) -> Result<Navigation, DashboardError> {
        let seller = scope
            .run(self.api.create_seller(&request.profile, &request.password))
            .await?;

        tracing::info!(seller_id = %seller.id, "seller registered");
        self.session.update(seller)?;
        Ok(Navigation::Redirect(Route::Login))
    }

    /// Notify the backend, then clear the local session no matter what the
    /// backend said.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Navigation {
        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %e, "logout notification failed; clearing local session anyway");
        }
        self.clear_local();
        tracing::info!("seller logged out");
        Navigation::Redirect(Route::Login)
    }

    fn persist_cookies(&self) {
        let Some(cookies) = self.api.export_cookies() else {
            return;
        };
        if let Err(e) = self.session.storage().set(COOKIES_KEY, &cookies) {
            tracing::warn!(error = %e, "could not persist session cookies");
        }
    }

    fn clear_local(&self) {
        if let Err(e) = self.session.clear() {
            DashboardError::from(e).report("clear session");
        }
        if let Err(e) = self.session.storage().remove(COOKIES_KEY) {
            tracing::warn!(error = %e, "could not remove persisted cookies");
        }
    }
}
