//! The dashboard's shared context.

use std::sync::Arc;

use crate::api::SellerApi;
use crate::auth::AuthGateway;
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::scope::ViewScope;
use crate::session::SessionStore;
use crate::shell::Shell;
use crate::storage::{FileStore, KeyValueStore};
use crate::views::{PasswordEditor, ProductCatalog, ProfileEditor};

/// Everything a front end needs to drive the dashboard.
///
/// Cheaply cloneable via `Arc`. Views are built from it with the scope the
/// shell hands out on navigation.
#[derive(Debug, Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

#[derive(Debug)]
struct DashboardInner {
    config: DashboardConfig,
    api: SellerApi,
    session: Arc<SessionStore>,
    gateway: AuthGateway,
}

impl Dashboard {
    /// Build a dashboard whose session lives in files under
    /// `config.state_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP clients cannot be built.
    pub fn open(config: DashboardConfig) -> Result<Self, DashboardError> {
        let storage = Arc::new(FileStore::new(config.state_dir.clone()));
        Self::with_storage(config, storage)
    }

    /// Build a dashboard over an arbitrary slot store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP clients cannot be built.
    pub fn with_storage(
        config: DashboardConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, DashboardError> {
        let api = SellerApi::new(config.clone())?;
        let session = Arc::new(SessionStore::new(storage));
        let gateway = AuthGateway::new(api.clone(), Arc::clone(&session));

        tracing::debug!(base_url = %config.api_base_url, "dashboard context ready");

        Ok(Self {
            inner: Arc::new(DashboardInner {
                config,
                api,
                session,
                gateway,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &SellerApi {
        &self.inner.api
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.inner.session
    }

    #[must_use]
    pub fn auth(&self) -> &AuthGateway {
        &self.inner.gateway
    }

    /// A shell sitting on the login route.
    #[must_use]
    pub fn shell(&self) -> Shell {
        Shell::new(Arc::clone(&self.inner.session))
    }

    /// Mount the profile editor.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Unauthenticated` if nobody is signed in.
    pub fn profile_editor(&self, scope: ViewScope) -> Result<ProfileEditor, DashboardError> {
        ProfileEditor::new(self.inner.api.clone(), Arc::clone(&self.inner.session), scope)
    }

    /// Mount the password editor.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Unauthenticated` if nobody is signed in.
    pub fn password_editor(&self, scope: ViewScope) -> Result<PasswordEditor, DashboardError> {
        PasswordEditor::new(self.inner.api.clone(), Arc::clone(&self.inner.session), scope)
    }

    /// Mount the product catalog.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Unauthenticated` if nobody is signed in.
    pub fn catalog(&self, scope: ViewScope) -> Result<ProductCatalog, DashboardError> {
        if !self.inner.session.is_authenticated() {
            return Err(DashboardError::Unauthenticated);
        }
        Ok(ProductCatalog::new(self.inner.api.clone(), scope))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shell::Route;
    use crate::storage::MemoryStore;

    fn dashboard() -> Dashboard {
        let config = DashboardConfig::new("http://127.0.0.1:9", "/tmp/unused").unwrap();
        Dashboard::with_storage(config, Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn test_views_require_session() {
        let dashboard = dashboard();
        assert!(matches!(
            dashboard.catalog(ViewScope::new()),
            Err(DashboardError::Unauthenticated)
        ));
        assert!(matches!(
            dashboard.profile_editor(ViewScope::new()),
            Err(DashboardError::Unauthenticated)
        ));
        assert!(matches!(
            dashboard.password_editor(ViewScope::new()),
            Err(DashboardError::Unauthenticated)
        ));
    }

    #[test]
    fn test_shell_shares_session() {
        let dashboard = dashboard();
        let shell = dashboard.shell();
        assert_eq!(shell.active(), Route::Login);
        assert!(!dashboard.auth().is_authenticated());
    }
}
