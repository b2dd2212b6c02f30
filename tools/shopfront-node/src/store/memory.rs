use chrono::{DateTime, Utc};
use dashmap::DashMap;
use shopfront_common::category::{resolve_slugs, Category, CategoryId};
use shopfront_common::product::{Product, ProductId};
use shopfront_common::query::{PageWindow, ProductFilter, SortMode};

use super::{checked_price, CatalogStore};
use crate::error::StoreError;

/// In-process catalog for development and tests.
#[derive(Default)]
pub struct MemoryStore {
    categories: DashMap<CategoryId, Category>,
    products: DashMap<ProductId, Product>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn clamp(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

impl CatalogStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn resolve_category_slugs(
        &self,
        slugs: &[String],
    ) -> Result<Vec<CategoryId>, StoreError> {
        let snapshot: Vec<Category> = self.categories.iter().map(|e| e.value().clone()).collect();
        Ok(resolve_slugs(&snapshot, slugs))
    }

    async fn find_products(
        &self,
        filter: &ProductFilter,
        sort: SortMode,
        window: PageWindow,
    ) -> Result<Vec<Product>, StoreError> {
        let mut matched: Vec<Product> = self
            .products
            .iter()
            .filter(|e| filter.matches(e.value()))
            .map(|e| e.value().clone())
            .collect();
        matched.sort_by(|a, b| sort.compare(a, b));
        Ok(matched
            .into_iter()
            .skip(clamp(window.offset()))
            .take(clamp(window.fetch()))
            .collect())
    }

    async fn find_product_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError> {
        Ok(self
            .products
            .iter()
            .filter(|e| e.is_active() && e.slug == slug)
            .map(|e| e.value().clone())
            .min_by(|a, b| a.id.cmp(&b.id)))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut active: Vec<Category> = self
            .categories
            .iter()
            .filter(|e| e.is_active())
            .map(|e| e.value().clone())
            .collect();
        active.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(active)
    }

    async fn insert_category(&self, category: Category) -> Result<(), StoreError> {
        self.categories.insert(category.id.clone(), category);
        Ok(())
    }

    async fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        checked_price(&product.id, "sellingPrice", product.selling_price)?;
        checked_price(&product.id, "mrp", product.mrp)?;
        self.products.insert(product.id.clone(), product);
        Ok(())
    }

    async fn soft_delete_product(
        &self,
        id: &ProductId,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        match self.products.get_mut(id) {
            Some(mut entry) if entry.deleted_at.is_none() => {
                entry.deleted_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
