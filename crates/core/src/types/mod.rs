//! Core types for the seller dashboard.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod hours;
pub mod id;
pub mod price;
pub mod product;
pub mod seller;
pub mod status;

pub use email::{Email, EmailError};
pub use hours::{HourField, OpeningHours, coerce_hour};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{Product, ProductDraft};
pub use seller::{Seller, SellerProfile};
pub use status::*;
