//! JSON REST API for Ladle.
//!
//! Exposes an axum [`Router`] backed by any [`ladle_core::store::RecipeStore`].
//! Authentication lives upstream: a fronting layer verifies credentials and
//! asserts the caller's id in the `x-user-id` header (see [`identity`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", ladle_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod identity;
pub mod ingredients;
pub mod recipes;
pub mod relations;
pub mod shopping_list;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use ladle_core::store::RecipeStore;
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String {
  "127.0.0.1".into()
}

fn default_port() -> u16 {
  8000
}

fn default_store_path() -> PathBuf {
  PathBuf::from("ladle.db")
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RecipeStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Ingredient catalog
    .route("/ingredients", get(ingredients::list::<S>))
    .route("/ingredients/{id}", get(ingredients::get_one::<S>))
    // Recipes
    .route("/recipes", get(recipes::list::<S>).post(recipes::create::<S>))
    // Static segments take priority over the {id} capture.
    .route("/recipes/shopping_list", get(shopping_list::get_list::<S>))
    .route(
      "/recipes/download_shopping_cart",
      get(shopping_list::download::<S>),
    )
    .route(
      "/recipes/{id}",
      get(recipes::get_one::<S>)
        .patch(recipes::update::<S>)
        .delete(recipes::delete::<S>),
    )
    // Toggles
    .route(
      "/recipes/{id}/favorite",
      post(relations::favorite_add::<S>).delete(relations::favorite_remove::<S>),
    )
    .route(
      "/recipes/{id}/shopping_cart",
      post(relations::cart_add::<S>).delete(relations::cart_remove::<S>),
    )
    // Subscriptions
    .route("/users/subscriptions", get(relations::list_subscriptions::<S>))
    .route(
      "/users/{id}/subscribe",
      post(relations::subscribe::<S>).delete(relations::unsubscribe::<S>),
    )
    .with_state(store)
}
