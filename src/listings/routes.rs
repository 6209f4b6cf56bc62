//! Listing and search route handlers

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::cache::AppCache;
use crate::caller::Caller;
use crate::error::Result;
use crate::AppState;

use super::queries;
use super::requests::{SearchFilter, SearchQuery, UpdatePropertyStatusRequest};
use super::responses::{PropertyResponse, SearchPage};

/// Listing routes, mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search/properties", get(search))
        .route("/search/properties/:id", get(get_listing))
        .route("/properties/:id/status", patch(update_property_status))
}

/// Search listed properties, optionally only those free for a stay
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchPage>> {
    let filter = SearchFilter::try_from(query)?;
    let key = AppCache::search_key(&filter);

    if let Some(key) = &key {
        if let Some(cached) = state.cache.searches.get(key).await {
            tracing::debug!("Cache HIT for search: {}", key);
            return Ok(Json((*cached).clone()));
        }
        tracing::debug!("Cache MISS for search: {}", key);
    }

    let generation = state.cache.generation();
    let properties = queries::search_properties(&state.db, &filter).await?;
    let total = queries::count_properties(&state.db, &filter).await?;
    let page = SearchPage {
        properties,
        total,
        limit: filter.limit,
        offset: filter.offset,
    };

    if let Some(key) = key {
        state.cache.insert_search(key, Arc::new(page.clone()), generation).await;
    }
    Ok(Json(page))
}

async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PropertyResponse>> {
    let property = if let Some(cached) = state.cache.properties.get(&id).await {
        (*cached).clone()
    } else {
        let generation = state.cache.generation();
        let property = queries::get_listing(&state.db, id).await?;
        state.cache.insert_property(Arc::new(property.clone()), generation).await;
        property
    };

    Ok(Json(PropertyResponse { property }))
}

/// Host lists, unlists or marks a property occupied
async fn update_property_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePropertyStatusRequest>,
) -> Result<Json<PropertyResponse>> {
    let property = queries::set_property_status(&state.db, caller.user_id, id, req.status).await?;
    state.cache.invalidate_property(id).await;
    info!("Property {} set to {}", id, property.status);

    Ok(Json(PropertyResponse { property }))
}
