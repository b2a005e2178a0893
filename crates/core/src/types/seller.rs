//! Seller account records.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Email, OpeningHours, SellerId};

/// Contact, address and opening-hours fields of a seller.
///
/// This is the shape of the profile form and of the signup/update payloads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SellerProfile {
    pub full_name: String,
    pub email: Email,
    pub phone: String,
    pub street: String,
    pub number: String,
    /// Always written, as `""` when cleared, so an update can erase a stored value.
    #[serde(
        default,
        serialize_with = "write_complement",
        deserialize_with = "read_complement"
    )]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default)]
    pub opening_hours: OpeningHours,
}

#[allow(clippy::ref_option)]
fn write_complement<S: Serializer>(
    value: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or_default())
}

fn read_complement<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|c| !c.trim().is_empty()))
}

/// A seller record as returned by the backend.
///
/// This is what the session holds and what gets persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub id: SellerId,
    #[serde(flatten)]
    pub profile: SellerProfile,
}

impl Seller {
    /// Assemble a seller from an id and its profile fields.
    #[must_use]
    pub const fn new(id: SellerId, profile: SellerProfile) -> Self {
        Self { id, profile }
    }

    /// The seller's display name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.profile.full_name
    }

    /// The seller's sign-in email.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.profile.email
    }

    /// One-line address, e.g. `"Rua A, 10 - Centro, São Paulo/SP 01000-000"`.
    #[must_use]
    pub fn address_line(&self) -> String {
        let p = &self.profile;
        let complement = p
            .complement
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(|c| format!(" ({c})"))
            .unwrap_or_default();
        format!(
            "{}, {}{} - {}, {}/{} {}",
            p.street, p.number, complement, p.neighborhood, p.city, p.state, p.zip_code
        )
    }
}
