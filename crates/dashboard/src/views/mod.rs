//! Form-bound views hosted by the shell.
//!
//! Each view is constructed with the [`ViewScope`](crate::scope::ViewScope)
//! of its mount and exposes a [`BusyFlag`](crate::scope::BusyFlag) that is
//! held for the duration of every mutation.

pub mod catalog;
pub mod password;
pub mod profile;

pub use catalog::{CatalogEntry, CatalogLoad, FormMode, ProductCatalog, ProductForm, ProductRow};
pub use password::PasswordEditor;
pub use profile::{ProfileEditor, ProfileField};
