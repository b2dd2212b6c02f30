//! Catalog persistence.
//!
//! The store handle is built once in `main`, shared through the router state
//! and closed on shutdown. Handlers never reach a database any other way.

mod memory;
mod postgres;

use std::future::Future;

use chrono::{DateTime, Utc};
use shopfront_common::category::{Category, CategoryId};
use shopfront_common::product::{Product, ProductId};
use shopfront_common::query::{PageWindow, ProductFilter, SortMode};
use shopfront_common::seed::CatalogSeed;

use crate::error::StoreError;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Largest price a store accepts. Prices are `BIGINT` in Postgres.
pub const MAX_PRICE: u64 = i64::MAX as u64;

/// `price` as a signed column value, or [`StoreError::Invalid`] when it is
/// above [`MAX_PRICE`]. Every backend runs this before writing a product.
pub(crate) fn checked_price(id: &ProductId, field: &str, price: u64) -> Result<i64, StoreError> {
    i64::try_from(price).map_err(|_| {
        StoreError::Invalid(format!("product {}: {field} {price} exceeds {MAX_PRICE}", id.0))
    })
}

/// Read and seed operations over categories and products.
pub trait CatalogStore: Send + Sync + 'static {
    /// Short backend name reported by `/health`.
    fn backend(&self) -> &'static str;

    /// Ids of active categories whose slug is in `slugs`.
    fn resolve_category_slugs(
        &self,
        slugs: &[String],
    ) -> impl Future<Output = Result<Vec<CategoryId>, StoreError>> + Send;

    /// Up to `window.fetch()` products matching `filter`, ordered by `sort`,
    /// starting at `window.offset()`.
    fn find_products(
        &self,
        filter: &ProductFilter,
        sort: SortMode,
        window: PageWindow,
    ) -> impl Future<Output = Result<Vec<Product>, StoreError>> + Send;

    /// Active product with this slug.
    fn find_product_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Product>, StoreError>> + Send;

    /// Active categories ordered by name.
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, StoreError>> + Send;

    /// Insert or replace by id.
    fn insert_category(
        &self,
        category: Category,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Insert or replace by id.
    fn insert_product(
        &self,
        product: Product,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Mark a product deleted. `false` if it is missing or already deleted.
    fn soft_delete_product(
        &self,
        id: &ProductId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Release backend resources. Called once after the server stops.
    fn close(&self) {}
}

/// Load a fixture into `store`: categories, then products.
pub async fn apply_seed<S: CatalogStore>(store: &S, seed: CatalogSeed) -> Result<(), StoreError> {
    let now = Utc::now();
    let (n_categories, n_products) = (seed.categories.len(), seed.products.len());
    for category in seed.categories {
        store.insert_category(category).await?;
    }
    for product in seed.products {
        store.insert_product(product.into_product(now)).await?;
    }
    tracing::info!(
        categories = n_categories,
        products = n_products,
        backend = store.backend(),
        "seeded catalog"
    );
    Ok(())
}
