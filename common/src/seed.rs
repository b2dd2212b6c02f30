use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::{Category, CategoryId};
use crate::product::{discount_percent, Product, ProductId, VendorId};

/// Fixture file contents: categories first, then products.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// A product as written in a fixture. `discountPercent` and `createdAt` may
/// be left out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedProduct {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub category: CategoryId,
    pub selling_price: u64,
    pub mrp: u64,
    #[serde(default)]
    pub discount_percent: Option<u8>,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub vendor: Option<VendorId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SeedProduct {
    pub fn into_product(self, now: DateTime<Utc>) -> Product {
        Product {
            discount_percent: self
                .discount_percent
                .unwrap_or_else(|| discount_percent(self.mrp, self.selling_price)),
            id: self.id,
            name: self.name,
            slug: self.slug,
            category: self.category,
            selling_price: self.selling_price,
            mrp: self.mrp,
            media: self.media,
            vendor: self.vendor,
            created_at: self.created_at.unwrap_or(now),
            deleted_at: self.deleted_at,
        }
    }
}
