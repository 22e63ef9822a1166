//! Handlers for `/ingredients` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/ingredients` | Optional `?name=<prefix>` (case-insensitive) |
//! | `GET`  | `/ingredients/:id` | 404 if not found |
//!
//! The catalog is read-only over HTTP; seeding happens out of band.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use ladle_core::{ingredient::Ingredient, store::RecipeStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Name prefix filter, e.g. `?name=fl` matches "Flour" and "flaxseed".
  pub name: Option<String>,
}

/// `GET /ingredients[?name=<prefix>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Ingredient>>, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let ingredients = store
    .list_ingredients(params.name)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(ingredients))
}

/// `GET /ingredients/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Ingredient>, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let ingredient = store
    .get_ingredient(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("ingredient {id} not found")))?;
  Ok(Json(ingredient))
}
