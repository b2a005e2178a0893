//! Profile editor: contact, address and opening hours.

use std::sync::Arc;

use tracing::instrument;

use seller_dashboard_core::{Email, HourField, SellerProfile};

use crate::api::SellerApi;
use crate::error::{DashboardError, Notice, NoticeContext};
use crate::scope::{BusyFlag, ViewScope};
use crate::session::SessionStore;

/// A text field of the profile form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    FullName,
    Email,
    Phone,
    Street,
    Number,
    Complement,
    Neighborhood,
    City,
    State,
    ZipCode,
}

impl std::str::FromStr for ProfileField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "full_name" => Self::FullName,
            "email" => Self::Email,
            "phone" => Self::Phone,
            "street" => Self::Street,
            "number" => Self::Number,
            "complement" => Self::Complement,
            "neighborhood" => Self::Neighborhood,
            "city" => Self::City,
            "state" => Self::State,
            "zip_code" => Self::ZipCode,
            other => return Err(format!("unknown profile field: {other}")),
        })
    }
}

/// Form bound to the signed-in seller's profile.
///
/// Edits stay in the form until submitted. A failed submit keeps them so
/// the seller can retry without retyping.
#[derive(Debug)]
pub struct ProfileEditor {
    api: SellerApi,
    session: Arc<SessionStore>,
    scope: ViewScope,
    form: SellerProfile,
    busy: BusyFlag,
}

impl ProfileEditor {
    /// Mount the editor, prefilled from the session.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Unauthenticated` if nobody is signed in.
    pub fn new(
        api: SellerApi,
        session: Arc<SessionStore>,
        scope: ViewScope,
    ) -> Result<Self, DashboardError> {
        let seller = session.current().ok_or(DashboardError::Unauthenticated)?;
        Ok(Self {
            api,
            session,
            scope,
            form: seller.profile,
            busy: BusyFlag::new(),
        })
    }

    /// Current form values.
    #[must_use]
    pub const fn form(&self) -> &SellerProfile {
        &self.form
    }

    /// Handle for observing whether a submit is in flight.
    #[must_use]
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    /// Set a text field.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::InvalidInput` for a malformed email; the form
    /// is left unchanged.
    pub fn set_field(&mut self, field: ProfileField, value: &str) -> Result<(), DashboardError> {
        let form = &mut self.form;
        let slot = match field {
            ProfileField::Email => {
                form.email = Email::parse(value)?;
                return Ok(());
            }
            ProfileField::Complement => {
                form.complement = Some(value.to_owned()).filter(|c| !c.is_empty());
                return Ok(());
            }
            ProfileField::FullName => &mut form.full_name,
            ProfileField::Phone => &mut form.phone,
            ProfileField::Street => &mut form.street,
            ProfileField::Number => &mut form.number,
            ProfileField::Neighborhood => &mut form.neighborhood,
            ProfileField::City => &mut form.city,
            ProfileField::State => &mut form.state,
            ProfileField::ZipCode => &mut form.zip_code,
        };
        value.clone_into(slot);
        Ok(())
    }

    /// Coerce an opening-hours field. Blank or non-numeric input becomes NaN
    /// and is only sent, never rejected.
    pub fn set_opening_hour(&mut self, field: HourField, input: &str) {
        self.form.opening_hours.set(field, input);
    }

    /// Send the whole form with the seller's id.
    ///
    /// On success the backend's record replaces the session.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Busy` if a submit is already in flight,
    /// `DashboardError::Unauthenticated` if the session was cleared, or the
    /// API/storage failure. Form edits are kept on failure.
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> Result<Notice, DashboardError> {
        let _busy = self.busy.enter().ok_or(DashboardError::Busy)?;
        let id = self
            .session
            .current()
            .map(|s| s.id)
            .ok_or(DashboardError::Unauthenticated)?;

        if !self.form.opening_hours.is_valid_window() {
            tracing::debug!(
                start = self.form.opening_hours.start,
                end = self.form.opening_hours.end,
                "submitting profile with an unusual opening-hours window"
            );
        }

        let updated = self
            .scope
            .run(self.api.update_seller(&id, &self.form))
            .await?;

        self.session.update(updated.clone())?;
        self.form = updated.profile;

        tracing::info!(seller_id = %id, "profile updated");
        Ok(NoticeContext::Profile.success())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use seller_dashboard_core::{Seller, SellerId};

    use super::*;
    use crate::config::DashboardConfig;
    use crate::storage::MemoryStore;

    fn editor() -> ProfileEditor {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStore::new())));
        session
            .update(Seller::new(
                SellerId::new("1"),
                SellerProfile {
                    full_name: "João Silva".to_owned(),
                    email: Email::parse("joao@x.com").unwrap(),
                    ..SellerProfile::default()
                },
            ))
            .unwrap();
        let api =
            SellerApi::new(DashboardConfig::new("http://127.0.0.1:9", "/tmp/unused").unwrap())
                .unwrap();
        ProfileEditor::new(api, session, ViewScope::new()).unwrap()
    }

    #[test]
    fn test_requires_session() {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStore::new())));
        let api =
            SellerApi::new(DashboardConfig::new("http://127.0.0.1:9", "/tmp/unused").unwrap())
                .unwrap();
        let result = ProfileEditor::new(api, session, ViewScope::new());
        assert!(matches!(result, Err(DashboardError::Unauthenticated)));
    }

    #[test]
    fn test_prefilled_from_session() {
        let editor = editor();
        assert_eq!(editor.form().full_name, "João Silva");
        assert_eq!(editor.form().email.as_str(), "joao@x.com");
    }

    #[test]
    fn test_set_fields() {
        let mut editor = editor();
        editor.set_field(ProfileField::City, "Campinas").unwrap();
        editor.set_field(ProfileField::Complement, "").unwrap();
        editor
            .set_field("zip_code".parse().unwrap(), "13000-000")
            .unwrap();

        assert_eq!(editor.form().city, "Campinas");
        assert_eq!(editor.form().complement, None);
        assert_eq!(editor.form().zip_code, "13000-000");
    }

    #[test]
    fn test_bad_email_leaves_form_unchanged() {
        let mut editor = editor();
        let result = editor.set_field(ProfileField::Email, "not-an-email");
        assert!(matches!(result, Err(DashboardError::InvalidInput(_))));
        assert_eq!(editor.form().email.as_str(), "joao@x.com");
    }

    #[test]
    fn test_blank_hour_coerces_to_nan() {
        let mut editor = editor();
        editor.set_opening_hour(HourField::Start, "7");
        editor.set_opening_hour(HourField::End, "");
        assert!((editor.form().opening_hours.start - 7.0).abs() < f64::EPSILON);
        assert!(editor.form().opening_hours.end.is_nan());
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_edits() {
        let mut editor = editor();
        editor.set_field(ProfileField::City, "Campinas").unwrap();

        // Nothing listens on the discard port.
        let err = editor.submit().await.unwrap_err();
        assert_eq!(
            err.notice(NoticeContext::Profile).title,
            "Serviço indisponível"
        );
        assert_eq!(editor.form().city, "Campinas");
        assert!(!editor.busy_flag().is_busy());
    }
}
