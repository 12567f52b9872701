use bazaar::domain::{PopularSearch, ProductHit, Suggestion};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// === Search Models ===

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    /// Selects the suggestion path when set to exactly "suggestions".
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<ProductHit>,
}

#[derive(Serialize)]
pub struct SuggestionsResponse {
    pub query: String,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Deserialize)]
pub struct PopularParams {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct PopularResponse {
    pub popular: Vec<PopularSearch>,
}

// === Admin Models ===

#[derive(Deserialize)]
pub struct FlushParams {
    pub pattern: Option<String>,
}

#[derive(Serialize)]
pub struct FlushResponse {
    pub deleted: u64,
}

#[derive(Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct CreateStoreResponse {
    pub id: Uuid,
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub store_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Serialize)]
pub struct CreateProductResponse {
    pub id: Uuid,
}

// === Shared Models ===

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
