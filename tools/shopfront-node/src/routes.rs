use std::sync::Arc;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use shopfront_common::category::Category;
use shopfront_common::product::Product;
use shopfront_common::query::{CatalogPage, CatalogParams, PageLimits};
use shopfront_common::response::Envelope;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::service::CatalogService;
use crate::store::CatalogStore;

pub struct AppState<S> {
    pub catalog: CatalogService<S>,
}

impl<S: CatalogStore> AppState<S> {
    pub fn new(store: Arc<S>, limits: PageLimits) -> Arc<Self> {
        Arc::new(Self {
            catalog: CatalogService::new(store, limits),
        })
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
}

// ─── Handlers ──────────────────────────────────────────────────────────────

// Query strings are read as raw pairs so repeated keys resolve to their first
// value instead of failing extraction.
async fn list_products<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Envelope<CatalogPage>>, ApiError> {
    let params = match query {
        Ok(Query(pairs)) => CatalogParams::from_pairs(pairs),
        Err(rejection) => {
            tracing::debug!(
                error = %rejection.body_text(),
                "unreadable query string, using defaults"
            );
            CatalogParams::default()
        }
    };
    let page = state.catalog.list_products(&params).await?;
    Ok(Json(Envelope::ok("Products fetched successfully", page)))
}

async fn product_detail<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Envelope<Product>>, ApiError> {
    let Path(slug) = path?;
    let product = state
        .catalog
        .product_by_slug(&slug)
        .await?
        .ok_or(ApiError::NotFound("product"))?;
    Ok(Json(Envelope::ok("Product fetched successfully", product)))
}

async fn list_categories<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Envelope<Vec<Category>>>, ApiError> {
    let categories = state.catalog.categories().await?;
    Ok(Json(Envelope::ok("Categories fetched successfully", categories)))
}

async fn health<S: CatalogStore>(State(state): State<Arc<AppState<S>>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: state.catalog.store().backend(),
    })
}

// ─── Router ────────────────────────────────────────────────────────────────

pub fn router<S: CatalogStore>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health::<S>))
        .route("/api/shop/products", get(list_products::<S>))
        .route("/api/shop/products/{slug}", get(product_detail::<S>))
        .route("/api/shop/categories", get(list_categories::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
