//! Seller Dashboard Core - Shared types library.
//!
//! This crate provides the domain types used across the seller dashboard:
//! - `dashboard` - Session store, auth gateway and view models
//! - `cli` - Terminal front end for the dashboard
//! - `integration-tests` - Mock backend and end-to-end tests
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, opening hours,
//!   and the seller/product records exchanged with the backend

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
