//! Session store: the signed-in seller, in memory and persisted.
//!
//! The in-memory copy and the persisted `user` slot change together. A
//! persisted value that cannot be read back as a seller is treated the same
//! as no value at all.

use std::sync::{Arc, PoisonError, RwLock};

use seller_dashboard_core::Seller;

use crate::storage::{KeyValueStore, StorageError, USER_KEY};

/// Holds the current seller (or none) and mirrors it into storage.
///
/// Share it with `Arc<SessionStore>`; there is exactly one per client.
pub struct SessionStore {
    current: RwLock<Option<Seller>>,
    storage: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create an anonymous session backed by `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            current: RwLock::new(None),
            storage,
        }
    }

    /// The storage backing this session.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// A copy of the current seller, if any.
    #[must_use]
    pub fn current(&self) -> Option<Seller> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a seller is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Replace the current seller and persist the replacement.
    ///
    /// The slot is written first; if that fails the in-memory seller is left
    /// untouched so both copies stay consistent.
    ///
    /// # Errors
    ///
    /// Returns an error if the seller cannot be serialized or persisted.
    pub fn update(&self, seller: Seller) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(&seller)?;
        self.storage.set(USER_KEY, &serialized)?;

        tracing::debug!(seller_id = %seller.id, "session updated");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(seller);
        Ok(())
    }

    /// Load the persisted seller into memory.
    ///
    /// Returns the hydrated seller, or `None` when the session is anonymous.
    /// A malformed slot is removed and the session stays anonymous.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read.
    pub fn hydrate(&self) -> Result<Option<Seller>, StorageError> {
        let Some(raw) = self.storage.get(USER_KEY)? else {
            tracing::debug!("no persisted session");
            return Ok(None);
        };

        match serde_json::from_str::<Seller>(&raw) {
            Ok(seller) => {
                tracing::debug!(seller_id = %seller.id, "session hydrated");
                *self.current.write().unwrap_or_else(PoisonError::into_inner) =
                    Some(seller.clone());
                Ok(Some(seller))
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed persisted session");
                self.clear()?;
                Ok(None)
            }
        }
    }

    /// Forget the current seller, in memory and in storage.
    ///
    /// Memory is cleared before storage is touched, so the session reads as
    /// anonymous even if removing the slot fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.storage.remove(USER_KEY)?;
        tracing::debug!("session cleared");
        Ok(())
    }
}
