use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::CategoryId;

/// Unique product identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

/// Vendor that owns a listing. Admin-created listings have none.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorId(pub String);

/// A product listing in the shop catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub category: CategoryId,
    /// Price the shopper pays, in minor currency units.
    pub selling_price: u64,
    /// List price before discount, in minor currency units.
    pub mrp: u64,
    pub discount_percent: u8,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub vendor: Option<VendorId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Soft-deleted products are never visible to the catalog.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Whole-percent discount of `selling` relative to `mrp`, rounded down.
pub fn discount_percent(mrp: u64, selling: u64) -> u8 {
    if mrp == 0 || selling >= mrp {
        return 0;
    }
    let off = (mrp - selling) as u128 * 100 / mrp as u128;
    off as u8
}
