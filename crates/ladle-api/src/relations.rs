//! Toggle handlers for favorites, shopping carts, and subscriptions.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST`   | `/recipes/:id/favorite` | 201 + short view; 409 if already present |
//! | `DELETE` | `/recipes/:id/favorite` | 204; 404 if absent |
//! | `POST`   | `/recipes/:id/shopping_cart` | Same contract as favorite |
//! | `DELETE` | `/recipes/:id/shopping_cart` | Same contract as favorite |
//! | `POST`   | `/users/:id/subscribe` | 201 + subscription view; 400 for self |
//! | `DELETE` | `/users/:id/subscribe` | 204; 404 if absent |
//! | `GET`    | `/users/subscriptions` | Optional `?recipes_limit=<n>` |
//!
//! All three share one idempotent add/remove contract enforced by the
//! store; these handlers only map the created/removed signals onto HTTP
//! statuses.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use ladle_core::{
  relation::RelationKind,
  store::{RecipeQuery, RecipeStore},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, identity::Identity, recipes::RecipeShort};

// ─── Recipe-targeted toggles ──────────────────────────────────────────────────

async fn add_recipe_relation<S>(
  store: &S,
  kind: RelationKind,
  user: Uuid,
  recipe_id: Uuid,
  already: &str,
) -> Result<(StatusCode, Json<RecipeShort>), ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let recipe = store
    .get_recipe(recipe_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("recipe {recipe_id} not found"))
    })?;

  let created = store
    .add_relation(kind, user, recipe_id)
    .await
    .map_err(ApiError::from_store)?;
  if !created {
    return Err(ApiError::Conflict(format!(
      "recipe {:?} is already in {already}",
      recipe.name
    )));
  }

  Ok((StatusCode::CREATED, Json(RecipeShort::from(recipe))))
}

async fn remove_recipe_relation<S>(
  store: &S,
  kind: RelationKind,
  user: Uuid,
  recipe_id: Uuid,
  missing: &str,
) -> Result<StatusCode, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let removed = store
    .remove_relation(kind, user, recipe_id)
    .await
    .map_err(ApiError::from_store)?;
  if !removed {
    return Err(ApiError::NotFound(format!(
      "recipe {recipe_id} is not in {missing}"
    )));
  }
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /recipes/:id/favorite`
pub async fn favorite_add<S>(
  State(store): State<Arc<S>>,
  identity: Identity,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = identity.require()?;
  add_recipe_relation(store.as_ref(), RelationKind::Favorite, user, id, "favorites")
    .await
}

/// `DELETE /recipes/:id/favorite`
pub async fn favorite_remove<S>(
  State(store): State<Arc<S>>,
  identity: Identity,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = identity.require()?;
  remove_recipe_relation(store.as_ref(), RelationKind::Favorite, user, id, "favorites")
    .await
}

/// `POST /recipes/:id/shopping_cart`
pub async fn cart_add<S>(
  State(store): State<Arc<S>>,
  identity: Identity,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = identity.require()?;
  add_recipe_relation(
    store.as_ref(),
    RelationKind::ShoppingCart,
    user,
    id,
    "the shopping cart",
  )
  .await
}

/// `DELETE /recipes/:id/shopping_cart`
pub async fn cart_remove<S>(
  State(store): State<Arc<S>>,
  identity: Identity,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = identity.require()?;
  remove_recipe_relation(
    store.as_ref(),
    RelationKind::ShoppingCart,
    user,
    id,
    "the shopping cart",
  )
  .await
}

// ─── Subscriptions ────────────────────────────────────────────────────────────

/// An author the caller follows, with their recipes.
#[derive(Debug, Serialize)]
pub struct SubscriptionView {
  pub author_id:     Uuid,
  pub recipes:       Vec<RecipeShort>,
  pub recipes_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionParams {
  /// Cap the number of recipes embedded per author.
  pub recipes_limit: Option<usize>,
}

async fn subscription_view<S>(
  store: &S,
  author_id: Uuid,
  recipes_limit: Option<usize>,
) -> Result<SubscriptionView, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let recipes = store
    .list_recipes(&RecipeQuery {
      author: Some(author_id),
      ..Default::default()
    })
    .await
    .map_err(ApiError::from_store)?;

  let recipes_count = recipes.len();
  let recipes = recipes
    .into_iter()
    .take(recipes_limit.unwrap_or(usize::MAX))
    .map(RecipeShort::from)
    .collect();

  Ok(SubscriptionView { author_id, recipes, recipes_count })
}

/// `POST /users/:id/subscribe`
pub async fn subscribe<S>(
  State(store): State<Arc<S>>,
  identity: Identity,
  Path(author_id): Path<Uuid>,
  Query(params): Query<SubscriptionParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = identity.require()?;

  // Self-subscription surfaces from the store as a 400.
  let created = store
    .add_relation(RelationKind::Subscription, user, author_id)
    .await
    .map_err(ApiError::from_store)?;
  if !created {
    return Err(ApiError::Conflict(format!(
      "already subscribed to {author_id}"
    )));
  }

  let view =
    subscription_view(store.as_ref(), author_id, params.recipes_limit).await?;
  Ok((StatusCode::CREATED, Json(view)))
}

/// `DELETE /users/:id/subscribe`
pub async fn unsubscribe<S>(
  State(store): State<Arc<S>>,
  identity: Identity,
  Path(author_id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = identity.require()?;

  let removed = store
    .remove_relation(RelationKind::Subscription, user, author_id)
    .await
    .map_err(ApiError::from_store)?;
  if !removed {
    return Err(ApiError::NotFound(format!(
      "not subscribed to {author_id}"
    )));
  }
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /users/subscriptions[?recipes_limit=<n>]`
pub async fn list_subscriptions<S>(
  State(store): State<Arc<S>>,
  identity: Identity,
  Query(params): Query<SubscriptionParams>,
) -> Result<Json<Vec<SubscriptionView>>, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = identity.require()?;

  let authors = store
    .relation_targets(RelationKind::Subscription, user)
    .await
    .map_err(ApiError::from_store)?;

  let mut views = Vec::with_capacity(authors.len());
  for author_id in authors {
    views.push(
      subscription_view(store.as_ref(), author_id, params.recipes_limit)
        .await?,
    );
  }
  Ok(Json(views))
}
