//! Wire shapes. Requests deserialize straight into
//! [`ProductDraft`](itemcmp_types::ProductDraft); these types cover the rest.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use itemcmp_types::{Product, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product as returned to clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductResponse {
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
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    pub seller_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            brand: p.brand,
            image_url: p.image_url,
            rating: p.rating,
            specifications: p.specifications,
            seller_id: p.seller_id.into(),
            created_at: p.created_at,
        }
    }
}

/// Body of `POST /api/v1/products/compare`.
#[derive(Clone, Debug, Deserialize)]
pub struct CompareRequest {
    #[serde(default)]
    pub ids: Vec<ProductId>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}
