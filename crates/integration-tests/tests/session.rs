//! Login, logout and session restore against the mock backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::http::Method;
use secrecy::SecretString;
use seller_dashboard::storage::{COOKIES_KEY, USER_KEY};
use seller_dashboard::{
    Dashboard, DashboardError, FileStore, KeyValueStore, Navigation, Route, ViewScope,
};
use seller_dashboard_integration_tests::{MockBackend, seller_fixture};

async fn backend_with_seller() -> (MockBackend, String) {
    let backend = MockBackend::start().await.expect("mock backend");
    let id = backend.seed_seller(seller_fixture("João Silva", "joao@x.com"), "secret");
    (backend, id)
}

async fn login(dashboard: &Dashboard) -> Navigation {
    dashboard
        .auth()
        .login("joao@x.com", &SecretString::from("secret"), &ViewScope::new())
        .await
        .expect("login")
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_stores_seller_and_cookies() {
    let (backend, id) = backend_with_seller().await;
    let dashboard = backend.dashboard().unwrap();

    let navigation = login(&dashboard).await;

    assert_eq!(navigation, Navigation::Redirect(Route::Profile));
    let seller = dashboard.session().current().unwrap();
    assert_eq!(seller.id.as_str(), id);
    assert_eq!(seller.full_name(), "João Silva");

    let storage = dashboard.session().storage();
    let persisted = storage.get(USER_KEY).unwrap().unwrap();
    assert!(persisted.contains("\"full_name\":\"João Silva\""));
    let cookies = storage.get(COOKIES_KEY).unwrap().unwrap();
    assert!(cookies.contains("sid="));
}

#[tokio::test]
async fn test_login_with_wrong_password_keeps_session_anonymous() {
    let (backend, _) = backend_with_seller().await;
    let dashboard = backend.dashboard().unwrap();

    let err = dashboard
        .auth()
        .login("joao@x.com", &SecretString::from("wrong"), &ViewScope::new())
        .await
        .unwrap_err();

    assert!(matches!(err, DashboardError::Api(_)));
    assert!(!dashboard.auth().is_authenticated());
    assert_eq!(dashboard.session().storage().get(USER_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_login_with_malformed_email_sends_nothing() {
    let (backend, _) = backend_with_seller().await;
    let dashboard = backend.dashboard().unwrap();

    let err = dashboard
        .auth()
        .login("joao", &SecretString::from("secret"), &ViewScope::new())
        .await
        .unwrap_err();

    assert!(matches!(err, DashboardError::InvalidInput(_)));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_login_lookup_without_identity_fails() {
    let (backend, _) = backend_with_seller().await;
    backend.configure(|b| b.omit_seller_id = true);
    let dashboard = backend.dashboard().unwrap();

    let err = dashboard
        .auth()
        .login("joao@x.com", &SecretString::from("secret"), &ViewScope::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DashboardError::Api(seller_dashboard::ApiError::MissingIdentity)
    ));
    assert!(!dashboard.auth().is_authenticated());
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_clears_everything() {
    let (backend, _) = backend_with_seller().await;
    let dashboard = backend.dashboard().unwrap();
    login(&dashboard).await;
    assert_eq!(backend.session_count(), 1);

    let navigation = dashboard.auth().logout().await;

    assert_eq!(navigation, Navigation::Redirect(Route::Login));
    assert!(!dashboard.auth().is_authenticated());
    let storage = dashboard.session().storage();
    assert_eq!(storage.get(USER_KEY).unwrap(), None);
    assert_eq!(storage.get(COOKIES_KEY).unwrap(), None);
    assert_eq!(backend.session_count(), 0);
}

#[tokio::test]
async fn test_logout_clears_locally_when_backend_fails() {
    let (backend, _) = backend_with_seller().await;
    let dashboard = backend.dashboard().unwrap();
    login(&dashboard).await;
    backend.configure(|b| b.fail_logout = true);

    let navigation = dashboard.auth().logout().await;

    assert_eq!(navigation, Navigation::Redirect(Route::Login));
    assert!(!dashboard.auth().is_authenticated());
    assert_eq!(dashboard.session().storage().get(USER_KEY).unwrap(), None);
    assert_eq!(backend.requests_to(&Method::POST, "/auth/logout").len(), 1);
}

// ============================================================================
// Restore
// ============================================================================

#[tokio::test]
async fn test_session_survives_restart() {
    let (backend, id) = backend_with_seller().await;
    let dir = tempfile::tempdir().unwrap();

    let first = Dashboard::open(backend.config(dir.path()).unwrap()).unwrap();
    login(&first).await;
    drop(first);

    let second = Dashboard::open(backend.config(dir.path()).unwrap()).unwrap();
    let navigation = second.auth().restore().await;

    assert_eq!(navigation, Navigation::Redirect(Route::Profile));
    assert_eq!(second.session().current().unwrap().id.as_str(), id);

    // The restored cookie still opens cookie-protected endpoints.
    let mut shell = second.shell();
    let scope = shell.navigate(Route::Products);
    assert_eq!(shell.active(), Route::Products);
    let mut catalog = second.catalog(scope).unwrap();
    assert_eq!(catalog.load().await.unwrap(), 0);
}

#[tokio::test]
async fn test_rejected_revalidation_signs_out() {
    let (backend, _) = backend_with_seller().await;
    let dir = tempfile::tempdir().unwrap();

    let first = Dashboard::open(backend.config(dir.path()).unwrap()).unwrap();
    login(&first).await;
    drop(first);
    backend.configure(|b| b.reject_seller_lookup = true);

    let second = Dashboard::open(backend.config(dir.path()).unwrap()).unwrap();
    let navigation = second.auth().restore().await;

    assert_eq!(navigation, Navigation::Redirect(Route::Login));
    assert!(!second.auth().is_authenticated());
    let store = FileStore::new(dir.path());
    assert_eq!(store.get(USER_KEY).unwrap(), None);
    assert_eq!(store.get(COOKIES_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_revalidation_without_identity_signs_out() {
    let (backend, _) = backend_with_seller().await;
    let dashboard = backend.dashboard().unwrap();
    login(&dashboard).await;
    backend.configure(|b| b.omit_seller_id = true);

    let navigation = dashboard.auth().restore().await;

    assert_eq!(navigation, Navigation::Redirect(Route::Login));
    assert!(!dashboard.auth().is_authenticated());
}

#[tokio::test]
async fn test_restore_without_session_stays_offline() {
    let (backend, _) = backend_with_seller().await;
    let dashboard = backend.dashboard().unwrap();

    let navigation = dashboard.auth().restore().await;

    assert_eq!(navigation, Navigation::Redirect(Route::Login));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_malformed_persisted_session_is_discarded() {
    let (backend, _) = backend_with_seller().await;
    let storage = Arc::new(seller_dashboard::MemoryStore::new());
    storage.set(USER_KEY, "{not json").unwrap();
    let dashboard =
        Dashboard::with_storage(backend.config(std::path::Path::new("unused")).unwrap(), storage)
            .unwrap();

    let navigation = dashboard.auth().restore().await;

    assert_eq!(navigation, Navigation::Redirect(Route::Login));
    assert_eq!(dashboard.session().storage().get(USER_KEY).unwrap(), None);
    assert!(backend.requests().is_empty());
}

// ============================================================================
// Shell guard
// ============================================================================

#[tokio::test]
async fn test_shell_guards_protected_routes() {
    let (backend, _) = backend_with_seller().await;
    let dashboard = backend.dashboard().unwrap();
    let mut shell = dashboard.shell();

    shell.navigate(Route::Products);
    assert_eq!(shell.active(), Route::Login);

    let navigation = login(&dashboard).await;
    shell.follow(navigation);
    assert_eq!(shell.active(), Route::Profile);
    assert_eq!(shell.header_name().as_deref(), Some("João Silva"));

    shell.navigate(Route::Products);
    assert_eq!(shell.active(), Route::Products);

    let navigation = dashboard.auth().logout().await;
    shell.follow(navigation);
    shell.navigate(Route::UpdatePassword);
    assert_eq!(shell.active(), Route::Login);
}
