//! Error types for `ladle-core`.
//!
//! Every variant is a deterministic function of input state; nothing here is
//! transient or retriable, so no layer of the engine performs retries.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("a recipe must contain at least one ingredient")]
  EmptyComposition,

  #[error("ingredient {0} is listed more than once")]
  DuplicateIngredient(Uuid),

  #[error("unknown ingredients: {0:?}")]
  UnknownIngredient(Vec<Uuid>),

  #[error(
    "amount for ingredient {ingredient_id} must be at least 1, got {amount}"
  )]
  InvalidAmount { ingredient_id: Uuid, amount: u32 },

  #[error("cannot subscribe to yourself")]
  SelfReferenceForbidden,

  #[error("the shopping cart is empty")]
  EmptyCart,

  #[error("recipe not found: {0}")]
  RecipeNotFound(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
