use std::sync::Arc;

use shopfront_common::category::Category;
use shopfront_common::product::Product;
use shopfront_common::query::{CatalogPage, CatalogParams, CatalogQuery, PageLimits};

use crate::error::StoreError;
use crate::store::CatalogStore;

/// Shop catalog reads over an injected store handle.
pub struct CatalogService<S> {
    store: Arc<S>,
    limits: PageLimits,
}

impl<S: CatalogStore> CatalogService<S> {
    pub fn new(store: Arc<S>, limits: PageLimits) -> Self {
        Self { store, limits }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// One page of active products for a shop listing request.
    ///
    /// Category slugs are resolved first; a requested category that resolves
    /// to nothing yields an empty page rather than an unfiltered one.
    pub async fn list_products(&self, params: &CatalogParams) -> Result<CatalogPage, StoreError> {
        let query = CatalogQuery::from_params(params, self.limits);

        let resolved = match &query.category_slugs {
            Some(slugs) => Some(self.store.resolve_category_slugs(slugs).await?),
            None => None,
        };
        let filter = query.filter(resolved);
        let window = query.window();

        let rows = self.store.find_products(&filter, query.sort, window).await?;
        let page = window.finish(rows);

        tracing::debug!(
            page = query.page,
            limit = query.limit,
            sort = ?query.sort,
            returned = page.products.len(),
            next_page = ?page.next_page,
            "catalog page"
        );
        Ok(page)
    }

    pub async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError> {
        self.store.find_product_by_slug(slug).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        self.store.list_categories().await
    }
}
