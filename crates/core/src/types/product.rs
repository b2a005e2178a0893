//! Catalog products.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product in a seller's catalog.
///
/// Ownership is enforced by the backend through the session cookie, so the
/// seller is not part of the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
}

/// Editable fields of a product, already parsed from the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub price: Price,
    pub description: String,
}

impl ProductDraft {
    /// Attach an id to the draft.
    #[must_use]
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            description: self.description,
        }
    }
}

impl Product {
    /// Overwrite name, price and description from a draft, keeping the id.
    pub fn apply(&mut self, draft: &ProductDraft) {
        self.name.clone_from(&draft.name);
        self.price = draft.price;
        self.description.clone_from(&draft.description);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Botijão P13".to_owned(),
            price: Price::from_cents(11_000),
            description: "13 kg".to_owned(),
        }
    }

    #[test]
    fn test_product_wire_shape() {
        let product = draft().into_product(ProductId::new("p1"));
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "p1",
                "name": "Botijão P13",
                "price": 110.0,
                "description": "13 kg"
            })
        );
    }

    #[test]
    fn test_apply_keeps_id() {
        let mut product = Product {
            id: ProductId::new("p9"),
            name: "old".to_owned(),
            price: Price::from_cents(100),
            description: String::new(),
        };
        product.apply(&draft());
        assert_eq!(product.id.as_str(), "p9");
        assert_eq!(product.name, "Botijão P13");
        assert_eq!(product.price, Price::from_cents(11_000));
    }
}
