//! Handlers for the aggregated shopping list.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/recipes/shopping_list` | Aggregated lines as JSON |
//! | `GET` | `/recipes/download_shopping_cart` | Plain-text attachment |
//!
//! Both aggregate via the store; an empty cart is a 400 (a user-visible
//! empty state, not a server fault).

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::header,
  response::{IntoResponse, Response},
};
use chrono::Utc;
use ladle_core::{
  shopping_list::{AggregatedLine, render_document},
  store::RecipeStore,
};

use crate::{error::ApiError, identity::Identity};

/// `GET /recipes/shopping_list`
pub async fn get_list<S>(
  State(store): State<Arc<S>>,
  identity: Identity,
) -> Result<Json<Vec<AggregatedLine>>, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = identity.require()?;
  let lines = store
    .build_shopping_list(user)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(lines))
}

/// `GET /recipes/download_shopping_cart` — `shopping_list.txt` attachment.
pub async fn download<S>(
  State(store): State<Arc<S>>,
  identity: Identity,
) -> Result<Response, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = identity.require()?;
  let lines = store
    .build_shopping_list(user)
    .await
    .map_err(ApiError::from_store)?;

  let body = render_document(&lines, Utc::now());

  Ok(
    (
      [
        (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
        (
          header::CONTENT_DISPOSITION,
          "attachment; filename=\"shopping_list.txt\"",
        ),
      ],
      body,
    )
      .into_response(),
  )
}
