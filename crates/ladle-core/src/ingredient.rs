//! Ingredient — the catalog entry a composition links against.
//!
//! The catalog is read-only from the engine's perspective: entries are seeded
//! at system setup and never mutated or deleted afterwards.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A (name, measurement unit) pair in the ingredient catalog.
/// Names are unique across the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
  pub ingredient_id:    Uuid,
  pub name:             String,
  pub measurement_unit: String,
}

/// Input to [`crate::store::RecipeStore::add_ingredient`] (the seeding path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIngredient {
  pub name:             String,
  pub measurement_unit: String,
}
