//! Layout chrome: active route, sidebar navigation and view lifetimes.
//!
//! The shell decides which view is mounted. Every navigation tears down the
//! previous view's [`ViewScope`] and mounts the next view with a fresh one,
//! so late responses never reach a view the seller already left.

use std::sync::Arc;

use crate::scope::ViewScope;
use crate::session::SessionStore;

/// A dashboard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    Profile,
    Products,
    UpdatePassword,
}

impl Route {
    /// Sidebar entries, in display order.
    pub const SIDEBAR: [Self; 3] = [Self::Profile, Self::Products, Self::UpdatePassword];

    /// URL path of the route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::Profile => "/dashboard",
            Self::Products => "/dashboard/products",
            Self::UpdatePassword => "/dashboard/update-password",
        }
    }

    /// Look a route up by path. Unknown paths fall back to the login page.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/signup" => Self::Signup,
            "/dashboard" => Self::Profile,
            "/dashboard/products" => Self::Products,
            "/dashboard/update-password" => Self::UpdatePassword,
            _ => Self::Login,
        }
    }

    /// Whether the route needs a signed-in seller.
    #[must_use]
    pub const fn requires_auth(self) -> bool {
        !matches!(self, Self::Login | Self::Signup)
    }

    /// Sidebar label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Login => "Entrar",
            Self::Signup => "Cadastro",
            Self::Profile => "Perfil",
            Self::Products => "Produtos",
            Self::UpdatePassword => "Senha",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Where the seller should be taken after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Move to another route.
    Redirect(Route),
    /// Keep the current view.
    Stay,
}

/// A sidebar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub route: Route,
    pub active: bool,
}

/// Hosts the active view.
#[derive(Debug)]
pub struct Shell {
    session: Arc<SessionStore>,
    active: Route,
    scope: ViewScope,
    drawer_open: bool,
}

impl Shell {
    /// Start on the login page.
    #[must_use]
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            active: Route::Login,
            scope: ViewScope::new(),
            drawer_open: false,
        }
    }

    /// The mounted route.
    #[must_use]
    pub const fn active(&self) -> Route {
        self.active
    }

    /// Scope of the mounted view.
    #[must_use]
    pub const fn scope(&self) -> &ViewScope {
        &self.scope
    }

    /// Mount `route`, tearing down the current view.
    ///
    /// Protected routes redirect to the login page when nobody is signed in.
    /// Returns the scope the new view must run its requests in.
    pub fn navigate(&mut self, route: Route) -> ViewScope {
        let target = if route.requires_auth() && !self.session.is_authenticated() {
            tracing::debug!(requested = %route, "anonymous session, redirecting to login");
            Route::Login
        } else {
            route
        };

        self.scope.cancel();
        self.scope = ViewScope::new();
        self.active = target;
        self.drawer_open = false;

        tracing::debug!(route = %target, "view mounted");
        self.scope.clone()
    }

    /// Apply the navigation an action asked for.
    pub fn follow(&mut self, navigation: Navigation) -> ViewScope {
        match navigation {
            Navigation::Redirect(route) => self.navigate(route),
            Navigation::Stay => self.scope.clone(),
        }
    }

    /// Sidebar entries with the active one flagged.
    #[must_use]
    pub fn nav_items(&self) -> Vec<NavItem> {
        Route::SIDEBAR
            .iter()
            .map(|&route| NavItem {
                label: route.label(),
                route,
                active: route == self.active,
            })
            .collect()
    }

    /// Name shown in the sidebar header.
    #[must_use]
    pub fn header_name(&self) -> Option<String> {
        self.session.current().map(|s| s.full_name().to_owned())
    }

    /// Whether the mobile drawer is open.
    #[must_use]
    pub const fn is_drawer_open(&self) -> bool {
        self.drawer_open
    }

    /// Open or close the mobile drawer.
    pub const fn toggle_drawer(&mut self) {
        self.drawer_open = !self.drawer_open;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use seller_dashboard_core::{Seller, SellerId, SellerProfile};

    use super::*;
    use crate::storage::MemoryStore;

    fn session() -> Arc<SessionStore> {
        Arc::new(SessionStore::new(Arc::new(MemoryStore::new())))
    }

    fn signed_in() -> Arc<SessionStore> {
        let session = session();
        session
            .update(Seller::new(
                SellerId::new("1"),
                SellerProfile {
                    full_name: "João Silva".to_owned(),
                    ..SellerProfile::default()
                },
            ))
            .unwrap();
        session
    }

    #[test]
    fn test_route_paths_roundtrip() {
        for route in [
            Route::Login,
            Route::Signup,
            Route::Profile,
            Route::Products,
            Route::UpdatePassword,
        ] {
            assert_eq!(Route::from_path(route.path()), route);
        }
        assert_eq!(Route::from_path("/dashboard/products/"), Route::Products);
        assert_eq!(Route::UpdatePassword.path(), "/dashboard/update-password");
        assert_eq!(Route::from_path("/dashboard/password"), Route::Login);
        assert_eq!(Route::from_path("/nowhere"), Route::Login);
    }

    #[test]
    fn test_guard_redirects_anonymous_to_login() {
        let mut shell = Shell::new(session());
        shell.navigate(Route::Products);
        assert_eq!(shell.active(), Route::Login);

        shell.navigate(Route::Signup);
        assert_eq!(shell.active(), Route::Signup);
    }

    #[test]
    fn test_navigation_cancels_previous_scope() {
        let mut shell = Shell::new(signed_in());
        let products = shell.navigate(Route::Products);
        assert!(!products.is_cancelled());

        let profile = shell.navigate(Route::Profile);
        assert!(products.is_cancelled());
        assert!(!profile.is_cancelled());
    }

    #[test]
    fn test_stay_keeps_scope() {
        let mut shell = Shell::new(signed_in());
        let scope = shell.navigate(Route::Profile);
        shell.follow(Navigation::Stay);
        assert!(!scope.is_cancelled());
        assert_eq!(shell.active(), Route::Profile);
    }

    #[test]
    fn test_nav_items_flag_active() {
        let mut shell = Shell::new(signed_in());
        shell.navigate(Route::Products);
        let items = shell.nav_items();
        assert_eq!(items.len(), 3);
        let active: Vec<_> = items.iter().filter(|i| i.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].label, "Produtos");
    }

    #[test]
    fn test_header_and_drawer() {
        let mut shell = Shell::new(signed_in());
        assert_eq!(shell.header_name().as_deref(), Some("João Silva"));

        shell.toggle_drawer();
        assert!(shell.is_drawer_open());
        shell.navigate(Route::Profile);
        assert!(!shell.is_drawer_open());
    }
}
