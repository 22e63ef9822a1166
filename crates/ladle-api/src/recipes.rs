//! Handlers for `/recipes` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/recipes` | Filters: `author`, `is_favorited`, `is_in_shopping_cart`, `limit`, `offset` |
//! | `GET`    | `/recipes/:id` | Single recipe view |
//! | `POST`   | `/recipes` | Body: [`RecipeBody`]; returns 201 + view |
//! | `PATCH`  | `/recipes/:id` | Author only; body must resend the full ingredient list |
//! | `DELETE` | `/recipes/:id` | Author only; 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use ladle_core::{
  recipe::{CompositionEntry, CompositionRow, NewRecipe, Recipe, RecipeUpdate},
  relation::RelationKind,
  store::{RecipeQuery, RecipeStore},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, identity::Identity};

// ─── Views ────────────────────────────────────────────────────────────────────

/// The full read model for a recipe: stored fields, the joined ingredient
/// rows, and the viewer-dependent flags. Computed per request, never stored.
#[derive(Debug, Serialize)]
pub struct RecipeView {
  pub recipe_id:           Uuid,
  pub author_id:           Uuid,
  pub name:                String,
  pub text:                String,
  pub cooking_time:        u32,
  pub image:               Option<String>,
  pub created_at:          DateTime<Utc>,
  pub ingredients:         Vec<CompositionRow>,
  pub is_favorited:        bool,
  pub is_in_shopping_cart: bool,
}

/// The short representation used by toggle responses and subscription lists.
#[derive(Debug, Serialize)]
pub struct RecipeShort {
  pub recipe_id:    Uuid,
  pub name:         String,
  pub image:        Option<String>,
  pub cooking_time: u32,
}

impl From<Recipe> for RecipeShort {
  fn from(r: Recipe) -> Self {
    Self {
      recipe_id:    r.recipe_id,
      name:         r.name,
      image:        r.image,
      cooking_time: r.cooking_time,
    }
  }
}

/// Assemble a [`RecipeView`] for `viewer` (anonymous viewers get both flags
/// as `false`).
pub async fn view<S>(
  store: &S,
  recipe: Recipe,
  viewer: Option<Uuid>,
) -> Result<RecipeView, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let ingredients = store
    .get_composition(recipe.recipe_id)
    .await
    .map_err(ApiError::from_store)?;

  let (is_favorited, is_in_shopping_cart) = match viewer {
    Some(user) => (
      store
        .relation_exists(RelationKind::Favorite, user, recipe.recipe_id)
        .await
        .map_err(ApiError::from_store)?,
      store
        .relation_exists(RelationKind::ShoppingCart, user, recipe.recipe_id)
        .await
        .map_err(ApiError::from_store)?,
    ),
    None => (false, false),
  };

  Ok(RecipeView {
    recipe_id: recipe.recipe_id,
    author_id: recipe.author_id,
    name: recipe.name,
    text: recipe.text,
    cooking_time: recipe.cooking_time,
    image: recipe.image,
    created_at: recipe.created_at,
    ingredients,
    is_favorited,
    is_in_shopping_cart,
  })
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Restrict to recipes by this author.
  pub author:              Option<Uuid>,
  /// If `true`, only recipes the caller has favorited.
  #[serde(default)]
  pub is_favorited:        bool,
  /// If `true`, only recipes in the caller's shopping cart.
  #[serde(default)]
  pub is_in_shopping_cart: bool,
  pub limit:               Option<usize>,
  pub offset:              Option<usize>,
}

/// `GET /recipes[?author=...][&is_favorited=true][&is_in_shopping_cart=true]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  identity: Identity,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<RecipeView>>, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let viewer = identity.0;

  // Viewer-scoped filters match nothing for anonymous callers.
  if (params.is_favorited || params.is_in_shopping_cart) && viewer.is_none() {
    return Ok(Json(vec![]));
  }

  let query = RecipeQuery {
    author:       params.author,
    favorited_by: params.is_favorited.then_some(viewer).flatten(),
    in_cart_of:   params.is_in_shopping_cart.then_some(viewer).flatten(),
    limit:        params.limit,
    offset:       params.offset,
  };

  let recipes = store
    .list_recipes(&query)
    .await
    .map_err(ApiError::from_store)?;

  let mut views = Vec::with_capacity(recipes.len());
  for recipe in recipes {
    views.push(view(store.as_ref(), recipe, viewer).await?);
  }
  Ok(Json(views))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /recipes/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  identity: Identity,
  Path(id): Path<Uuid>,
) -> Result<Json<RecipeView>, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let recipe = store
    .get_recipe(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("recipe {id} not found")))?;
  Ok(Json(view(store.as_ref(), recipe, identity.0).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// One ingredient entry in a recipe write body.
#[derive(Debug, Deserialize)]
pub struct EntryBody {
  pub id:     Uuid,
  pub amount: u32,
}

/// JSON body accepted by `POST /recipes` and `PATCH /recipes/:id`.
///
/// `ingredients` is required in both cases: composition writes are
/// wholesale, so updates must resend the complete list even when only
/// scalar fields changed.
#[derive(Debug, Deserialize)]
pub struct RecipeBody {
  pub name:         String,
  pub text:         String,
  pub cooking_time: u32,
  pub image:        Option<String>,
  pub ingredients:  Vec<EntryBody>,
}

impl RecipeBody {
  fn entries(&self) -> Vec<CompositionEntry> {
    self
      .ingredients
      .iter()
      .map(|e| CompositionEntry { ingredient_id: e.id, amount: e.amount })
      .collect()
  }
}

/// `POST /recipes` — returns 201 + the stored recipe's view.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  identity: Identity,
  Json(body): Json<RecipeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let author_id = identity.require()?;

  let entries = body.entries();
  let recipe = store
    .create_recipe(NewRecipe {
      author_id,
      name: body.name,
      text: body.text,
      cooking_time: body.cooking_time,
      image: body.image,
      ingredients: entries,
    })
    .await
    .map_err(ApiError::from_store)?;

  let view = view(store.as_ref(), recipe, Some(author_id)).await?;
  Ok((StatusCode::CREATED, Json(view)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /recipes/:id` — author only; body is a full [`RecipeBody`].
pub async fn update<S>(
  State(store): State<Arc<S>>,
  identity: Identity,
  Path(id): Path<Uuid>,
  Json(body): Json<RecipeBody>,
) -> Result<Json<RecipeView>, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = identity.require()?;
  require_author(store.as_ref(), id, user).await?;

  let entries = body.entries();
  let recipe = store
    .update_recipe(id, RecipeUpdate {
      name:         body.name,
      text:         body.text,
      cooking_time: body.cooking_time,
      image:        body.image,
      ingredients:  entries,
    })
    .await
    .map_err(ApiError::from_store)?;

  Ok(Json(view(store.as_ref(), recipe, Some(user)).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /recipes/:id` — author only; 204 on success.
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  identity: Identity,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RecipeStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = identity.require()?;
  require_author(store.as_ref(), id, user).await?;

  store.delete_recipe(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// 404 if the recipe is missing, 403 if `user` is not its author.
async fn require_author<S>(
  store: &S,
  recipe_id: Uuid,
  user: Uuid,
) -> Result<(), ApiError>
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

  if recipe.author_id != user {
    return Err(ApiError::Forbidden(
      "only the author can modify a recipe".into(),
    ));
  }
  Ok(())
}
