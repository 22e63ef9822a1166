//! Recipe and composition types.
//!
//! A recipe owns its composition — the full set of (ingredient, amount)
//! pairs attached to it. Composition writes are wholesale: callers always
//! submit the complete list, and the previous set is replaced atomically.
//! There is no incremental patching of individual entries.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Recipe ──────────────────────────────────────────────────────────────────

/// A recipe as persisted. The composition is not embedded here; it is read
/// through [`crate::store::RecipeStore::get_composition`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
  pub recipe_id:    Uuid,
  /// Opaque identity supplied by the authentication collaborator.
  pub author_id:    Uuid,
  pub name:         String,
  /// Free-text body.
  pub text:         String,
  /// Cooking time in minutes.
  pub cooking_time: u32,
  /// Opaque image reference; storage is an external concern.
  pub image:        Option<String>,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::RecipeStore::create_recipe`].
/// `recipe_id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewRecipe {
  pub author_id:    Uuid,
  pub name:         String,
  pub text:         String,
  pub cooking_time: u32,
  pub image:        Option<String>,
  pub ingredients:  Vec<CompositionEntry>,
}

/// Input to [`crate::store::RecipeStore::update_recipe`].
///
/// The ingredient list is mandatory: updates always resend the complete
/// composition, even when only scalar fields changed. Partial updates that
/// omit it are rejected at the HTTP boundary.
#[derive(Debug, Clone)]
pub struct RecipeUpdate {
  pub name:         String,
  pub text:         String,
  pub cooking_time: u32,
  pub image:        Option<String>,
  pub ingredients:  Vec<CompositionEntry>,
}

// ─── Composition ─────────────────────────────────────────────────────────────

/// One (ingredient, amount) pair submitted on a composition write.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CompositionEntry {
  pub ingredient_id: Uuid,
  pub amount:        u32,
}

/// The read projection of a composition entry, joined with the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionRow {
  pub ingredient_id:    Uuid,
  pub name:             String,
  pub measurement_unit: String,
  pub amount:           u32,
}

/// Validate the pure-side constraints of a composition write: non-empty,
/// pairwise-distinct ingredients, all amounts at least 1.
///
/// Catalog membership (`UnknownIngredient`) is checked by the store inside
/// the write transaction, since it needs the catalog.
pub fn validate_composition(entries: &[CompositionEntry]) -> Result<()> {
  if entries.is_empty() {
    return Err(Error::EmptyComposition);
  }

  let mut seen = HashSet::with_capacity(entries.len());
  for entry in entries {
    if entry.amount < 1 {
      return Err(Error::InvalidAmount {
        ingredient_id: entry.ingredient_id,
        amount:        entry.amount,
      });
    }
    if !seen.insert(entry.ingredient_id) {
      return Err(Error::DuplicateIngredient(entry.ingredient_id));
    }
  }

  Ok(())
}
