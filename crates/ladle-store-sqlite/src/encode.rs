//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Relation kinds are stored as snake_case
//! discriminants.

use chrono::{DateTime, Utc};
use ladle_core::{
  ingredient::Ingredient,
  recipe::{CompositionRow, Recipe},
  relation::RelationKind,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── RelationKind ────────────────────────────────────────────────────────────

pub fn encode_relation_kind(k: RelationKind) -> &'static str {
  match k {
    RelationKind::Favorite => "favorite",
    RelationKind::ShoppingCart => "shopping_cart",
    RelationKind::Subscription => "subscription",
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `ingredients` row.
pub struct RawIngredient {
  pub ingredient_id:    String,
  pub name:             String,
  pub measurement_unit: String,
}

impl RawIngredient {
  pub fn into_ingredient(self) -> Result<Ingredient> {
    Ok(Ingredient {
      ingredient_id:    decode_uuid(&self.ingredient_id)?,
      name:             self.name,
      measurement_unit: self.measurement_unit,
    })
  }
}

/// Raw strings read directly from a `recipes` row.
pub struct RawRecipe {
  pub recipe_id:    String,
  pub author_id:    String,
  pub name:         String,
  pub text:         String,
  pub cooking_time: i64,
  pub image:        Option<String>,
  pub created_at:   String,
}

impl RawRecipe {
  pub fn into_recipe(self) -> Result<Recipe> {
    Ok(Recipe {
      recipe_id:    decode_uuid(&self.recipe_id)?,
      author_id:    decode_uuid(&self.author_id)?,
      name:         self.name,
      text:         self.text,
      cooking_time: u32::try_from(self.cooking_time)
        .map_err(|_| Error::Decode(format!("cooking_time out of range: {}", self.cooking_time)))?,
      image:        self.image,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from a `recipe_ingredients` row joined with the catalog.
pub struct RawCompositionRow {
  pub ingredient_id:    String,
  pub name:             String,
  pub measurement_unit: String,
  pub amount:           i64,
}

impl RawCompositionRow {
  pub fn into_row(self) -> Result<CompositionRow> {
    Ok(CompositionRow {
      ingredient_id:    decode_uuid(&self.ingredient_id)?,
      name:             self.name,
      measurement_unit: self.measurement_unit,
      amount:           u32::try_from(self.amount)
        .map_err(|_| Error::Decode(format!("amount out of range: {}", self.amount)))?,
    })
  }
}
