use chrono::{DateTime, Utc};
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use shopfront_common::category::{Category, CategoryId};
use shopfront_common::product::{Product, ProductId, VendorId};
use shopfront_common::query::{PageWindow, ProductFilter, SortMode};
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

use super::{checked_price, CatalogStore};
use crate::error::StoreError;

const SCHEMA: &str = include_str!("schema.sql");

const PRODUCT_COLUMNS: &str = "id, name, slug, category_id, selling_price, mrp, \
    discount_percent, media, vendor_id, created_at, deleted_at";

/// PostgreSQL-backed catalog over a bounded connection pool.
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    /// Build the pool and make sure the catalog tables exist.
    pub async fn connect(url: &str, pool_size: usize) -> Result<Self, StoreError> {
        let mut cfg = Config::new();
        cfg.url = Some(url.to_string());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(PoolConfig::new(pool_size.max(1)));
        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;

        let store = Self { pool };
        store.ensure_schema().await?;
        tracing::info!(pool_size, "connected to postgres");
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client.batch_execute(SCHEMA).await?;
        Ok(())
    }
}

/// Accumulates positional parameters while a statement is assembled.
#[derive(Default)]
struct SqlParams {
    values: Vec<Box<dyn ToSql + Sync + Send>>,
}

impl SqlParams {
    /// Store `value` and return its placeholder (`$n`).
    fn bind<T: ToSql + Sync + Send + 'static>(&mut self, value: T) -> String {
        self.values.push(Box::new(value));
        format!("${}", self.values.len())
    }

    fn refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values
            .iter()
            .map(|v| v.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }
}

/// Escape `%`, `_` and `\` so user text matches literally under `ILIKE`.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `WHERE` body for a product filter. Always includes the soft-delete guard.
fn where_clause(filter: &ProductFilter, params: &mut SqlParams) -> String {
    let mut clauses = vec!["deleted_at IS NULL".to_string()];

    if let Some(ids) = &filter.categories {
        if ids.is_empty() {
            clauses.push("FALSE".to_string());
        } else {
            let ids: Vec<String> = ids.iter().map(|c| c.0.clone()).collect();
            clauses.push(format!("category_id = ANY({})", params.bind(ids)));
        }
    }
    if let Some(needle) = &filter.name_contains {
        let pattern = format!("%{}%", escape_like(needle));
        clauses.push(format!("name ILIKE {} ESCAPE '\\'", params.bind(pattern)));
    }
    // No stored price exceeds `BIGINT`: a lower bound past it matches nothing,
    // an upper bound past it matches everything.
    if let Some(min) = filter.min_price {
        match i64::try_from(min) {
            Ok(min) => clauses.push(format!("selling_price >= {}", params.bind(min))),
            Err(_) => clauses.push("FALSE".to_string()),
        }
    }
    if let Some(max) = filter.max_price.and_then(|max| i64::try_from(max).ok()) {
        clauses.push(format!("selling_price <= {}", params.bind(max)));
    }

    clauses.join(" AND ")
}

fn order_clause(sort: SortMode) -> &'static str {
    match sort {
        SortMode::Newest => "created_at DESC, id ASC",
        SortMode::NameAsc => "name COLLATE \"C\" ASC, id ASC",
        SortMode::NameDesc => "name COLLATE \"C\" DESC, id ASC",
        SortMode::PriceLowHigh => "selling_price ASC, id ASC",
        SortMode::PriceHighLow => "selling_price DESC, id ASC",
    }
}

fn product_from_row(row: &Row) -> Result<Product, StoreError> {
    let selling_price: i64 = row.try_get("selling_price")?;
    let mrp: i64 = row.try_get("mrp")?;
    let discount: i16 = row.try_get("discount_percent")?;
    let id: String = row.try_get("id")?;

    let corrupt = |field: &str| StoreError::Corrupt(format!("product {id}: {field} out of range"));

    Ok(Product {
        selling_price: u64::try_from(selling_price).map_err(|_| corrupt("selling_price"))?,
        mrp: u64::try_from(mrp).map_err(|_| corrupt("mrp"))?,
        discount_percent: u8::try_from(discount).map_err(|_| corrupt("discount_percent"))?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        category: CategoryId(row.try_get("category_id")?),
        media: row.try_get("media")?,
        vendor: row.try_get::<_, Option<String>>("vendor_id")?.map(VendorId),
        created_at: row.try_get("created_at")?,
        deleted_at: row.try_get("deleted_at")?,
        id: ProductId(id),
    })
}

fn category_from_row(row: &Row) -> Result<Category, StoreError> {
    Ok(Category {
        id: CategoryId(row.try_get("id")?),
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        parent: row.try_get::<_, Option<String>>("parent_id")?.map(CategoryId),
        deleted_at: row.try_get("deleted_at")?,
    })
}

impl CatalogStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn resolve_category_slugs(
        &self,
        slugs: &[String],
    ) -> Result<Vec<CategoryId>, StoreError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT DISTINCT id FROM categories \
                 WHERE deleted_at IS NULL AND slug = ANY($1) ORDER BY id",
                &[&slugs],
            )
            .await?;
        let ids = rows
            .iter()
            .map(|r| r.try_get::<_, String>("id").map(CategoryId))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    async fn find_products(
        &self,
        filter: &ProductFilter,
        sort: SortMode,
        window: PageWindow,
    ) -> Result<Vec<Product>, StoreError> {
        let mut params = SqlParams::default();
        let predicate = where_clause(filter, &mut params);
        let limit = params.bind(i64::try_from(window.fetch()).unwrap_or(i64::MAX));
        let offset = params.bind(i64::try_from(window.offset()).unwrap_or(i64::MAX));
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE {predicate} \
             ORDER BY {} LIMIT {limit} OFFSET {offset}",
            order_clause(sort)
        );
        tracing::debug!(%sql, "catalog query");

        let client = self.pool.get().await?;
        let rows = client.query(sql.as_str(), &params.refs()).await?;
        rows.iter().map(product_from_row).collect()
    }

    async fn find_product_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError> {
        let client = self.pool.get().await?;
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE deleted_at IS NULL AND slug = $1 ORDER BY id LIMIT 1"
        );
        let row = client.query_opt(sql.as_str(), &[&slug]).await?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, name, slug, parent_id, deleted_at FROM categories \
                 WHERE deleted_at IS NULL ORDER BY name COLLATE \"C\", id",
                &[],
            )
            .await?;
        rows.iter().map(category_from_row).collect()
    }

    async fn insert_category(&self, category: Category) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        let parent = category.parent.map(|p| p.0);
        client
            .execute(
                "INSERT INTO categories (id, name, slug, parent_id, deleted_at) \
                 VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, slug = EXCLUDED.slug, \
                 parent_id = EXCLUDED.parent_id, deleted_at = EXCLUDED.deleted_at",
                &[
                    &category.id.0,
                    &category.name,
                    &category.slug,
                    &parent,
                    &category.deleted_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        let selling_price = checked_price(&product.id, "sellingPrice", product.selling_price)?;
        let mrp = checked_price(&product.id, "mrp", product.mrp)?;
        let client = self.pool.get().await?;
        let vendor = product.vendor.map(|v| v.0);
        let discount = i16::from(product.discount_percent);
        client
            .execute(
                "INSERT INTO products (id, name, slug, category_id, selling_price, mrp, \
                 discount_percent, media, vendor_id, created_at, deleted_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, slug = EXCLUDED.slug, \
                 category_id = EXCLUDED.category_id, selling_price = EXCLUDED.selling_price, \
                 mrp = EXCLUDED.mrp, discount_percent = EXCLUDED.discount_percent, \
                 media = EXCLUDED.media, vendor_id = EXCLUDED.vendor_id, \
                 created_at = EXCLUDED.created_at, deleted_at = EXCLUDED.deleted_at",
                &[
                    &product.id.0,
                    &product.name,
                    &product.slug,
                    &product.category.0,
                    &selling_price,
                    &mrp,
                    &discount,
                    &product.media,
                    &vendor,
                    &product.created_at,
                    &product.deleted_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn soft_delete_product(
        &self,
        id: &ProductId,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let client = self.pool.get().await?;
        let changed = client
            .execute(
                "UPDATE products SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL",
                &[&id.0, &at],
            )
            .await?;
        Ok(changed > 0)
    }

    fn close(&self) {
        self.pool.close();
        tracing::info!("postgres pool closed");
    }
}
