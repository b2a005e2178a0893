//! Lifecycle states for catalog entries.

use serde::{Deserialize, Serialize};

/// Where a catalog entry's id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordOrigin {
    /// The id was assigned by the backend.
    #[default]
    Confirmed,
    /// The id was generated client-side and may differ from the backend's
    /// until the next full list refresh.
    Provisional,
}

impl RecordOrigin {
    /// Returns true for entries still carrying a client-generated id.
    #[must_use]
    pub const fn is_provisional(self) -> bool {
        matches!(self, Self::Provisional)
    }
}

/// Per-product state machine.
///
/// ```text
/// (none) -> Creating -> Listed
/// Listed -> Editing  -> Listed
/// Listed -> Deleting -> (absent)
/// ```
///
/// A failed mutation returns the product to the state it started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductPhase {
    Creating,
    Listed,
    Editing,
    Deleting,
}

impl ProductPhase {
    /// Whether moving from `self` to `next` is allowed.
    ///
    /// `None` as the target means the product leaves the catalog.
    #[must_use]
    pub const fn can_transition_to(self, next: Option<Self>) -> bool {
        matches!(
            (self, next),
            (Self::Creating | Self::Editing, Some(Self::Listed))
                | (Self::Listed, Some(Self::Editing | Self::Deleting))
                | (Self::Deleting, None)
        )
    }
}

impl std::fmt::Display for ProductPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Creating => write!(f, "creating"),
            Self::Listed => write!(f, "listed"),
            Self::Editing => write!(f, "editing"),
            Self::Deleting => write!(f, "deleting"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(ProductPhase::Creating.can_transition_to(Some(ProductPhase::Listed)));
        assert!(ProductPhase::Listed.can_transition_to(Some(ProductPhase::Editing)));
        assert!(ProductPhase::Editing.can_transition_to(Some(ProductPhase::Listed)));
        assert!(ProductPhase::Listed.can_transition_to(Some(ProductPhase::Deleting)));
        assert!(ProductPhase::Deleting.can_transition_to(None));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!ProductPhase::Creating.can_transition_to(Some(ProductPhase::Deleting)));
        assert!(!ProductPhase::Listed.can_transition_to(None));
        assert!(!ProductPhase::Deleting.can_transition_to(Some(ProductPhase::Listed)));
        assert!(!ProductPhase::Editing.can_transition_to(Some(ProductPhase::Deleting)));
    }

    #[test]
    fn test_record_origin_default_is_confirmed() {
        assert!(!RecordOrigin::default().is_provisional());
        assert!(RecordOrigin::Provisional.is_provisional());
    }
}
