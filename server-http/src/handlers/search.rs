use crate::models::{
    ErrorResponse, PopularParams, PopularResponse, SearchParams, SearchResponse,
    SuggestionsResponse,
};
use crate::state::AppState;
use crate::validation::{self, ValidationError};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info};

const SUGGESTIONS_KIND: &str = "suggestions";

const DEFAULT_POPULAR_LIMIT: usize = 10;
const MAX_POPULAR_LIMIT: usize = 100;

/// GET /search?q=term[&type=suggestions]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let term = validation::validate_term(params.q.as_deref()).map_err(bad_request)?;

    // Only the exact kind "suggestions" switches paths; any other value is
    // treated as a plain result search.
    if params.kind.as_deref() == Some(SUGGESTIONS_KIND) {
        info!("suggestion lookup: {}", term);
        match state.search.cached_suggestions(term).await {
            Ok(suggestions) => Ok(Json(SuggestionsResponse {
                query: term.to_string(),
                suggestions,
            })
            .into_response()),
            Err(e) => Err(search_failed(e)),
        }
    } else {
        info!("result lookup: {}", term);
        match state.search.cached_results(term).await {
            Ok(results) => Ok(Json(SearchResponse {
                query: term.to_string(),
                results,
            })
            .into_response()),
            Err(e) => Err(search_failed(e)),
        }
    }
}

/// GET /search/popular?limit=N
pub async fn popular(
    State(state): State<AppState>,
    Query(params): Query<PopularParams>,
) -> Result<Json<PopularResponse>, (StatusCode, Json<ErrorResponse>)> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_POPULAR_LIMIT)
        .min(MAX_POPULAR_LIMIT);

    match state.popularity.top(limit).await {
        Ok(popular) => Ok(Json(PopularResponse { popular })),
        Err(e) => {
            error!("popular terms lookup failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "popular terms unavailable".to_string(),
                }),
            ))
        }
    }
}

fn bad_request(err: ValidationError) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// The client only ever sees a generic body; the cause goes to the log.
fn search_failed(err: shared::Error) -> (StatusCode, Json<ErrorResponse>) {
    error!("search failed: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "search failed".to_string(),
        }),
    )
}
