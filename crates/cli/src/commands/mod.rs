//! Subcommand implementations.
//!
//! Every command rebuilds the dashboard from the persisted state directory,
//! restores the session and then mounts the view it needs through the
//! shell, the same way an interactive front end would.

use seller_dashboard::{
    ConfigError, Dashboard, DashboardError, Route, Shell, ViewScope, error::NoticeContext,
};
use thiserror::Error;

pub mod password;
pub mod products;
pub mod profile;
pub mod session;

/// Errors that end a CLI invocation.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A dashboard action failed; carries the notice shown to the seller.
    #[error("{notice}")]
    Action {
        notice: seller_dashboard::Notice,
        #[source]
        source: DashboardError,
    },

    /// The dashboard could not be opened.
    #[error("Dashboard error: {0}")]
    Dashboard(#[from] DashboardError),

    /// The command needs a session and none could be restored.
    #[error("Not signed in. Run `seller login` first.")]
    NotSignedIn,
}

impl CliError {
    /// Report a failed action and wrap it with its user-facing notice.
    #[must_use]
    pub fn action(context: NoticeContext, action: &str, source: DashboardError) -> Self {
        source.report(action);
        Self::Action {
            notice: source.notice(context),
            source,
        }
    }
}

/// Restore the persisted session and mount `route`.
///
/// Returns the shell (for header/nav details) and the scope the view runs in.
///
/// # Errors
///
/// Returns `CliError::NotSignedIn` if the guard sends the seller to login.
pub async fn mount(dashboard: &Dashboard, route: Route) -> Result<(Shell, ViewScope), CliError> {
    let mut shell = dashboard.shell();
    let restored = dashboard.auth().restore().await;
    shell.follow(restored);

    let scope = shell.navigate(route);
    if shell.active() == route {
        Ok((shell, scope))
    } else {
        Err(CliError::NotSignedIn)
    }
}
