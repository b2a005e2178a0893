//! Seller Dashboard - client library for the gas-cylinder seller dashboard.
//!
//! Everything a seller does in the dashboard maps onto one HTTP call against
//! the marketplace backend, with the signed-in seller mirrored into a
//! persisted key-value slot so a session survives restarts.
//!
//! # Architecture
//!
//! - [`session::SessionStore`] holds the signed-in seller in memory and in
//!   the persisted `user` slot; it is an explicit, shared context object
//! - [`auth::AuthGateway`] logs in, signs up, logs out and revalidates a
//!   restored session
//! - [`views`] holds the profile editor, password editor and product catalog
//! - [`shell::Shell`] tracks the active route and hands every view a
//!   [`scope::ViewScope`] that is cancelled when the view is left
//!
//! # Modules
//!
//! - [`api`] - `reqwest` client for the seller/product endpoints
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Error types and user-facing notices
//! - [`storage`] - Persisted key-value slots (file or memory)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod scope;
pub mod session;
pub mod shell;
pub mod storage;
pub mod views;

pub use api::{ApiError, SellerApi};
pub use auth::{AuthGateway, SignupRequest};
pub use config::{ConfigError, DashboardConfig};
pub use context::Dashboard;
pub use error::{DashboardError, Notice};
pub use scope::{BusyFlag, ViewScope};
pub use session::SessionStore;
pub use shell::{Navigation, Route, Shell};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
