//! Shop catalog query: raw request parameters, their coerced form, the
//! product predicate and the one-ahead page window.
//!
//! Nothing here talks to a store. Backends receive a [`ProductFilter`], a
//! [`SortMode`] and a [`PageWindow`] and hand back at most `window.fetch` rows,
//! which [`PageWindow::finish`] turns into a [`CatalogPage`].

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::category::CategoryId;
use crate::product::Product;

/// Page size used when the request does not carry a usable `limit`.
pub const DEFAULT_LIMIT: u32 = 9;

/// Upper bound on `limit`; larger requests are clamped.
pub const MAX_LIMIT: u32 = 100;

/// Query-string parameters exactly as received.
///
/// Every field is a string so that malformed numbers reach [`CatalogQuery`]
/// and get defaulted instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogParams {
    pub size: Option<String>,
    pub color: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub category: Option<String>,
    pub q: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
    pub sort: Option<String>,
}

impl CatalogParams {
    /// Collect decoded query-string pairs. The first value of a repeated key
    /// wins; unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "size" => &mut params.size,
                "color" => &mut params.color,
                "minPrice" => &mut params.min_price,
                "maxPrice" => &mut params.max_price,
                "category" => &mut params.category,
                "q" => &mut params.q,
                "limit" => &mut params.limit,
                "page" => &mut params.page,
                "sort" => &mut params.sort,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        params
    }
}

/// Result ordering. Unknown or missing sort keys mean [`SortMode::Newest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    /// `default_sorting`: creation time, newest first.
    #[default]
    Newest,
    /// `asc`: name A-Z.
    NameAsc,
    /// `desc`: name Z-A.
    NameDesc,
    /// `price_low_high`
    PriceLowHigh,
    /// `price_high_low`
    PriceHighLow,
}

impl SortMode {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("asc") => SortMode::NameAsc,
            Some("desc") => SortMode::NameDesc,
            Some("price_low_high") => SortMode::PriceLowHigh,
            Some("price_high_low") => SortMode::PriceHighLow,
            _ => SortMode::Newest,
        }
    }

    /// Total order used by in-process backends. Ties break on product id.
    pub fn compare(self, a: &Product, b: &Product) -> Ordering {
        let primary = match self {
            SortMode::Newest => b.created_at.cmp(&a.created_at),
            SortMode::NameAsc => a.name.cmp(&b.name),
            SortMode::NameDesc => b.name.cmp(&a.name),
            SortMode::PriceLowHigh => a.selling_price.cmp(&b.selling_price),
            SortMode::PriceHighLow => b.selling_price.cmp(&a.selling_price),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Page-size policy applied while coercing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

/// A catalog request after defaulting. Construction never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub category_slugs: Option<Vec<String>>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub sort: SortMode,
    pub page: u32,
    pub limit: u32,
}

impl CatalogQuery {
    pub fn from_params(params: &CatalogParams, limits: PageLimits) -> Self {
        let search = params
            .q
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let category_slugs = params.category.as_deref().and_then(|raw| {
            let slugs: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            (!slugs.is_empty()).then_some(slugs)
        });

        let max_limit = limits.max_limit.max(1);
        let limit = parse_number::<u64>(params.limit.as_deref())
            .filter(|l| *l > 0)
            .map_or(limits.default_limit, |l| u32::try_from(l).unwrap_or(u32::MAX))
            .min(max_limit);

        Self {
            search,
            category_slugs,
            min_price: parse_number(params.min_price.as_deref()),
            max_price: parse_number(params.max_price.as_deref()),
            sort: SortMode::parse(params.sort.as_deref()),
            page: parse_number(params.page.as_deref()).unwrap_or(0),
            limit,
        }
    }

    /// Predicate for this query once its category slugs have been resolved.
    ///
    /// `resolved` must be `Some` whenever slugs were requested; an empty
    /// resolution matches no products.
    pub fn filter(&self, resolved: Option<Vec<CategoryId>>) -> ProductFilter {
        ProductFilter {
            categories: self.category_slugs.as_ref().map(|_| resolved.unwrap_or_default()),
            name_contains: self.search.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }

    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.page, self.limit)
    }
}

fn parse_number<T: std::str::FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|s| s.trim().parse().ok())
}

/// What a product must satisfy to appear in a catalog page.
///
/// Soft-deleted products never match, whatever else is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// `None`: no category filter. `Some(empty)`: nothing matches.
    pub categories: Option<Vec<CategoryId>>,
    /// Case-insensitive literal substring of the product name.
    pub name_contains: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if !product.is_active() {
            return false;
        }
        if let Some(ids) = &self.categories {
            if !ids.contains(&product.category) {
                return false;
            }
        }
        if let Some(needle) = &self.name_contains {
            if !product.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| product.selling_price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.selling_price > max) {
            return false;
        }
        true
    }
}

/// Offset window that over-fetches by one row to detect a following page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub limit: u32,
}

impl PageWindow {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    pub fn offset(&self) -> u64 {
        self.page as u64 * self.limit as u64
    }

    /// Rows to ask the store for: one more than the page holds.
    pub fn fetch(&self) -> u64 {
        self.limit as u64 + 1
    }

    /// Trim the probe row, if present, and report the next page index.
    pub fn finish(&self, mut rows: Vec<Product>) -> CatalogPage {
        let has_more = rows.len() > self.limit as usize;
        rows.truncate(self.limit as usize);
        CatalogPage {
            products: rows,
            next_page: if has_more { self.page.checked_add(1) } else { None },
        }
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub products: Vec<Product>,
    pub next_page: Option<u32>,
}
