use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::{Recommendation, RecommendationRequest, RecommendationResponse};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub catalog_size: usize,
    pub catalog_loaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct GenresResponse {
    pub success: bool,
    pub genres: Vec<String>,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let catalog = state.recommender.catalog();
    Json(HealthResponse {
        status: "healthy",
        catalog_size: catalog.len(),
        catalog_loaded_at: catalog.loaded_at(),
    })
}

/// Distinct genres present in the catalog
pub async fn list_genres(State(state): State<AppState>) -> Json<GenresResponse> {
    Json(GenresResponse {
        success: true,
        genres: state.recommender.catalog().genres(),
    })
}

/// Bare `OPTIONS` on the recommendation routes; real CORS preflights are
/// answered by the CORS layer before reaching this handler.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Ranked recommendations for a genre / runtime / age preference
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<RecommendationResponse>> {
    let request = parse_request(&headers, &body)?;
    let query = request.to_query()?;

    tracing::info!(
        request_id = %request_id,
        genres = ?query.genres,
        runtime = %query.runtime,
        age = query.age,
        "Processing recommendation request"
    );

    if state.config.require_genres && query.genres.is_empty() {
        return Err(AppError::InvalidQuery("Please select at least one genre".to_string()));
    }

    let top_n = match request.top_n {
        None => state.config.top_n,
        Some(n) if (1..=state.config.max_top_n).contains(&n) => n,
        Some(n) => {
            return Err(AppError::InvalidQuery(format!(
                "top_n must be between 1 and {}, got {}",
                state.config.max_top_n, n
            )));
        }
    };

    let min_rating = match request.min_rating {
        None => state.config.min_rating,
        Some(r) if (0.0..=10.0).contains(&r) => r,
        Some(r) => {
            return Err(AppError::InvalidQuery(format!(
                "min_rating must be between 0 and 10, got {}",
                r
            )));
        }
    };

    let recommendations: Vec<Recommendation> = state
        .recommender
        .recommend(&query, top_n, min_rating)
        .into_iter()
        .map(Recommendation::from)
        .collect();

    tracing::Span::current().record("result_count", recommendations.len());
    tracing::info!(
        request_id = %request_id,
        result_count = recommendations.len(),
        top_title = recommendations.first().map(|r| r.title.as_str()).unwrap_or("-"),
        "Recommendations computed"
    );

    Ok(Json(RecommendationResponse::new(recommendations)))
}

/// Decodes the recommendation body. An empty body means "all defaults".
fn parse_request(headers: &HeaderMap, body: &Bytes) -> AppResult<RecommendationRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RecommendationRequest::default());
    }

    if !has_json_content_type(headers) {
        return Err(AppError::InvalidQuery(
            "Expected request with `Content-Type: application/json`".to_string(),
        ));
    }

    Json::<RecommendationRequest>::from_bytes(body)
        .map(|Json(request)| request)
        .map_err(|rejection| {
            AppError::InvalidQuery(format!("Invalid request body: {}", rejection.body_text()))
        })
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|essence| {
            let essence = essence.trim().to_ascii_lowercase();
            essence == "application/json" || essence.ends_with("+json")
        })
        .unwrap_or(false)
}
