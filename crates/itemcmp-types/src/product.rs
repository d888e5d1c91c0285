use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TypeError;
use crate::ids::{ProductId, SellerId};

/// The fields a caller may supply for a product listing.
///
/// A draft has no owner and no creation time: those are assigned by the
/// catalog when the draft is stored. Any `seller_id` or `created_at` keys in
/// incoming JSON are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Decimal>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub specifications: BTreeMap<String, String>,
}

impl ProductDraft {
    /// A draft with only the required fields set.
    pub fn new(id: i64, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: ProductId::new(id),
            name: name.into(),
            description: None,
            price,
            brand: None,
            image_url: None,
            rating: None,
            specifications: BTreeMap::new(),
        }
    }

    /// Check the draft's required fields.
    ///
    /// The name must be non-blank and the price strictly positive. Rating has
    /// no enforced range. Price and rating are stored as JSON floats, so
    /// both must read back unchanged from their `f64` form.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("name is required"));
        }
        if self.price <= Decimal::ZERO {
            return Err(self.invalid("price must be greater than zero"));
        }
        if !survives_json_number(self.price) {
            return Err(self.invalid("price has more precision than a JSON number keeps"));
        }
        if self.rating.is_some_and(|r| !survives_json_number(r)) {
            return Err(self.invalid("rating has more precision than a JSON number keeps"));
        }
        Ok(())
    }

    fn invalid(&self, reason: &str) -> TypeError {
        TypeError::InvalidProduct {
            id: self.id,
            reason: reason.to_string(),
        }
    }
}

/// A stored product listing.
///
/// `seller_id` and `created_at` are assigned once, when the record is first
/// created, and carried over unchanged by every later overwrite.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Decimal>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub specifications: BTreeMap<String, String>,
    pub seller_id: SellerId,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Build a record from a draft plus the server-assigned fields.
    pub fn from_draft(draft: ProductDraft, seller_id: SellerId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: draft.id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            brand: draft.brand,
            image_url: draft.image_url,
            rating: draft.rating,
            specifications: draft.specifications,
            seller_id,
            created_at,
        }
    }

    /// The caller-controlled part of this record.
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            brand: self.brand.clone(),
            image_url: self.image_url.clone(),
            rating: self.rating,
            specifications: self.specifications.clone(),
        }
    }

    /// Returns `true` if `seller` owns this record.
    pub fn is_owned_by(&self, seller: &SellerId) -> bool {
        &self.seller_id == seller
    }
}

/// `true` if `value` reads back unchanged after its trip through `f64`.
fn survives_json_number(value: Decimal) -> bool {
    value
        .to_f64()
        .and_then(|f| Decimal::from_str(&f.to_string()).ok())
        .is_some_and(|back| back == value)
}

// Older records were written with `"specifications": null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}
