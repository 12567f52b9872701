use crate::models::{
    CreateProductRequest, CreateProductResponse, CreateStoreRequest, CreateStoreResponse,
    ErrorResponse, FlushParams, FlushResponse,
};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use bazaar::domain::{CacheStats, Product, StoreProfile};
use tracing::{error, info};

/// DELETE /admin/cache[?pattern=prefix]
pub async fn flush_cache(
    State(state): State<AppState>,
    Query(params): Query<FlushParams>,
) -> Result<Json<FlushResponse>, StatusCode> {
    match state.cache.delete_by_pattern(params.pattern.as_deref()).await {
        Ok(deleted) => {
            info!("flushed {} cache entries", deleted);
            Ok(Json(FlushResponse { deleted }))
        }
        Err(e) => {
            error!("cache flush failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /admin/cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> Result<Json<CacheStats>, StatusCode> {
    match state.cache.stats().await {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => {
            error!("cache stats lookup failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /admin/stores
pub async fn create_store(
    State(state): State<AppState>,
    Json(req): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<CreateStoreResponse>), (StatusCode, Json<ErrorResponse>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(bad_request("store name must not be blank"));
    }

    let store = StoreProfile::new(name);
    match state.catalog.upsert_store(&store) {
        Ok(()) => {
            info!("created store {} ({})", store.name, store.id);
            Ok((
                StatusCode::CREATED,
                Json(CreateStoreResponse {
                    id: store.id,
                    name: store.name,
                }),
            ))
        }
        Err(e) => {
            error!("store create failed: {}", e);
            Err(internal("could not save store"))
        }
    }
}

/// POST /admin/products
///
/// Cached search responses are left alone. A new product becomes visible in
/// searches once the relevant cache entries expire.
pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<CreateProductResponse>), (StatusCode, Json<ErrorResponse>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(bad_request("product name must not be blank"));
    }

    match state.catalog.store_name(&req.store_id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(bad_request("unknown store_id")),
        Err(e) => {
            error!("store lookup failed: {}", e);
            return Err(internal("could not save product"));
        }
    }

    let product = Product::new(
        req.store_id,
        name,
        req.description,
        req.price,
        req.image_url,
    );
    match state.catalog.upsert_product(&product) {
        Ok(()) => {
            info!("created product {} ({})", product.name, product.id);
            Ok((
                StatusCode::CREATED,
                Json(CreateProductResponse { id: product.id }),
            ))
        }
        Err(e) => {
            error!("product create failed: {}", e);
            Err(internal("could not save product"))
        }
    }
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

fn internal(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}
