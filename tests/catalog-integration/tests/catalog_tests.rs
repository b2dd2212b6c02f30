//! Shop catalog API driven over HTTP against the in-memory store.

use chrono::Utc;
use serde_json::Value;

use shopfront_catalog_integration::harness::TestShop;
use shopfront_catalog_integration::{make_category, make_product, stock};
use shopfront_common::product::ProductId;
use shopfront_common::query::PageLimits;
use shopfront_node::store::{CatalogStore, MemoryStore};

/// Three active shirts, one deleted shirt, two shoes.
async fn dressed_shop() -> TestShop<MemoryStore> {
    let shop = TestShop::memory().await;
    let shirts = make_category("shirts");
    let shoes = make_category("shoes");
    shop.store.insert_category(shirts.clone()).await.unwrap();
    shop.store.insert_category(shoes.clone()).await.unwrap();

    stock(
        shop.store.as_ref(),
        &shirts,
        &[
            ("oxford", "Oxford Shirt", 2500),
            ("flannel", "Flannel shirt", 1800),
            ("old-tee", "Old shirt", 400),
            ("linen", "Linen SHIRT", 3000),
        ],
    )
    .await;
    stock(
        shop.store.as_ref(),
        &shoes,
        &[("runner", "Trail Runner", 7000), ("loafer", "Loafer", 5200)],
    )
    .await;

    shop.store
        .soft_delete_product(&ProductId("old-tee".into()), Utc::now())
        .await
        .unwrap();
    shop
}

fn ids(page: &shopfront_common::query::CatalogPage) -> Vec<&str> {
    page.products.iter().map(|p| p.id.0.as_str()).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn search_pages_with_one_ahead_probe() {
    let shop = dressed_shop().await;

    let first = shop.list(&[("q", "shirt"), ("limit", "2"), ("page", "0")]).await;
    assert_eq!(first.products.len(), 2);
    assert_eq!(first.next_page, Some(1));

    let second = shop.list(&[("q", "shirt"), ("limit", "2"), ("page", "1")]).await;
    assert_eq!(second.products.len(), 1);
    assert_eq!(second.next_page, None);

    let mut all: Vec<&str> = ids(&first).into_iter().chain(ids(&second)).collect();
    all.sort();
    assert_eq!(all, vec!["flannel", "linen", "oxford"]);

    shop.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn default_listing_is_newest_first_without_deleted() {
    let shop = dressed_shop().await;

    let page = shop.list(&[]).await;
    assert_eq!(ids(&page), vec!["loafer", "linen", "runner", "flannel", "oxford"]);
    assert_eq!(page.next_page, None);
    assert!(page.products.iter().all(|p| p.deleted_at.is_none()));

    shop.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn nextpage_serializes_as_null_on_last_page() {
    let shop = dressed_shop().await;

    let (status, body): (u16, Value) = shop.get("/api/shop/products", &[("limit", "50")]).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["statusCode"], 200);
    assert!(body["data"]["nextPage"].is_null());
    assert!(body["data"]["products"].is_array());
    assert!(body["data"]["products"][0]["sellingPrice"].is_u64());

    shop.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn category_filter_and_unknown_slug() {
    let shop = dressed_shop().await;

    let page = shop.list(&[("category", "shoes")]).await;
    assert_eq!(page.products.len(), 2);
    assert!(page.products.iter().all(|p| p.category.0 == "c-shoes"));

    let page = shop.list(&[("category", "shoes,shirts")]).await;
    assert_eq!(page.products.len(), 5);

    let page = shop.list(&[("category", "nonexistent-slug")]).await;
    assert!(page.products.is_empty());
    assert_eq!(page.next_page, None);

    // A known slug still filters when listed next to an unknown one.
    let page = shop.list(&[("category", "nonexistent-slug,shoes")]).await;
    assert_eq!(page.products.len(), 2);

    shop.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sort_modes() {
    let shop = dressed_shop().await;

    let page = shop.list(&[("sort", "price_low_high")]).await;
    assert!(page
        .products
        .windows(2)
        .all(|w| w[0].selling_price <= w[1].selling_price));

    let page = shop.list(&[("sort", "price_high_low")]).await;
    assert_eq!(page.products[0].id.0, "runner");

    let page = shop.list(&[("sort", "asc")]).await;
    assert_eq!(ids(&page), vec!["flannel", "linen", "loafer", "oxford", "runner"]);

    let page = shop.list(&[("sort", "desc")]).await;
    assert_eq!(page.products[0].id.0, "runner");

    let fallback = shop.list(&[("sort", "most_popular")]).await;
    let newest = shop.list(&[("sort", "default_sorting")]).await;
    assert_eq!(ids(&fallback), ids(&newest));

    shop.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn malformed_numbers_are_defaulted() {
    let shop = dressed_shop().await;

    let page = shop
        .list(&[("page", "abc"), ("limit", "lots"), ("minPrice", "free")])
        .await;
    assert_eq!(page.products.len(), 5);

    let page = shop.list(&[("limit", "0")]).await;
    assert_eq!(page.products.len(), 5);

    let page = shop.list(&[("size", "XL"), ("color", "red")]).await;
    assert_eq!(page.products.len(), 5);

    shop.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn repeated_keys_use_first_value() {
    let shop = dressed_shop().await;

    let page = shop.list(&[("sort", "asc"), ("sort", "desc")]).await;
    assert_eq!(ids(&page), vec!["flannel", "linen", "loafer", "oxford", "runner"]);

    let page = shop
        .list(&[("limit", "2"), ("limit", "50"), ("page", "1"), ("page", "0")])
        .await;
    assert_eq!(ids(&page), vec!["runner", "flannel"]);
    assert_eq!(page.next_page, Some(2));

    let page = shop
        .list(&[("category", "shoes"), ("category", "shirts"), ("q", "loaf"), ("q", "shirt")])
        .await;
    assert_eq!(ids(&page), vec!["loafer"]);

    shop.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn mangled_escapes_fall_back_to_defaults() {
    let shop = dressed_shop().await;

    let resp = reqwest::get(format!("{}/api/shop/products?sort=%FF&limit=%zz", shop.base_url))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["products"].as_array().unwrap().len(), 5);

    shop.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn price_bounds_are_inclusive() {
    let shop = dressed_shop().await;

    let page = shop
        .list(&[("minPrice", "1800"), ("maxPrice", "3000"), ("sort", "price_low_high")])
        .await;
    assert_eq!(ids(&page), vec!["flannel", "oxford", "linen"]);

    shop.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn limit_is_capped() {
    let store = std::sync::Arc::new(MemoryStore::new());
    let hats = make_category("hats");
    store.insert_category(hats.clone()).await.unwrap();
    let items: Vec<(String, String, u64)> = (0..8)
        .map(|i| (format!("hat-{i}"), format!("Hat {i}"), 100 + i))
        .collect();
    let borrowed: Vec<(&str, &str, u64)> = items
        .iter()
        .map(|(id, name, price)| (id.as_str(), name.as_str(), *price))
        .collect();
    stock(store.as_ref(), &hats, &borrowed).await;

    let shop = TestShop::start(
        store,
        PageLimits {
            default_limit: 3,
            max_limit: 5,
        },
    )
    .await;

    let page = shop.list(&[]).await;
    assert_eq!(page.products.len(), 3);
    assert_eq!(page.next_page, Some(1));

    let page = shop.list(&[("limit", "100")]).await;
    assert_eq!(page.products.len(), 5);
    assert_eq!(page.next_page, Some(1));

    shop.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn product_detail_by_slug() {
    let shop = dressed_shop().await;

    let (status, body): (u16, Value) = shop.get("/api/shop/products/linen", &[]).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["name"], "Linen SHIRT");

    let (status, body): (u16, Value) = shop.get("/api/shop/products/old-tee", &[]).await;
    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 404);
    assert!(body["data"].is_null());

    shop.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn categories_and_health() {
    let shop = dressed_shop().await;
    let mut retired = make_category("scarves");
    retired.deleted_at = Some(Utc::now());
    shop.store.insert_category(retired).await.unwrap();

    let (status, body): (u16, Value) = shop.get("/api/shop/categories", &[]).await;
    assert_eq!(status, 200);
    let slugs: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["shirts", "shoes"]);

    let (status, body): (u16, Value) = shop.get("/health", &[]).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");

    shop.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn newly_listed_product_shifts_offset_pages() {
    let shop = dressed_shop().await;
    let before = shop.list(&[("limit", "2"), ("page", "1")]).await;

    let shirts = make_category("shirts");
    shop.store
        .insert_product(make_product("polo", "Polo shirt", &shirts, 2200, Utc::now()))
        .await
        .unwrap();

    let after = shop.list(&[("limit", "2"), ("page", "1")]).await;
    assert_eq!(ids(&before), vec!["runner", "flannel"]);
    assert_eq!(ids(&after), vec!["linen", "runner"]);

    shop.stop().await;
}
