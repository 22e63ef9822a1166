//! The `RecipeStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `ladle-store-sqlite`).
//! Higher layers (`ladle-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  ingredient::{Ingredient, NewIngredient},
  recipe::{CompositionEntry, CompositionRow, NewRecipe, Recipe, RecipeUpdate},
  relation::RelationKind,
  shopping_list::AggregatedLine,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`RecipeStore::list_recipes`].
#[derive(Debug, Clone, Default)]
pub struct RecipeQuery {
  /// Restrict to recipes by a specific author.
  pub author:       Option<Uuid>,
  /// Restrict to recipes favorited by this user.
  pub favorited_by: Option<Uuid>,
  /// Restrict to recipes in this user's shopping cart.
  pub in_cart_of:   Option<Uuid>,
  pub limit:        Option<usize>,
  pub offset:       Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Ladle storage backend.
///
/// Composition writes are wholesale and atomic: a concurrent reader observes
/// either the old complete composition or the new complete composition,
/// never a partial set. Relation writes rely on the backend's uniqueness
/// constraint as the concurrency arbiter, so two racing `add_relation` calls
/// for the same pair yield exactly one created record.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecipeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Ingredient catalog ────────────────────────────────────────────────

  /// Insert a catalog entry, or return the existing entry with the same
  /// name. Used by seeding; the catalog is otherwise read-only.
  fn add_ingredient(
    &self,
    input: NewIngredient,
  ) -> impl Future<Output = Result<Ingredient, Self::Error>> + Send + '_;

  /// Retrieve a catalog entry by id. Returns `None` if not found.
  fn get_ingredient(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Ingredient>, Self::Error>> + Send + '_;

  /// List catalog entries ordered by name, optionally filtered by a
  /// case-insensitive name prefix.
  fn list_ingredients(
    &self,
    name_prefix: Option<String>,
  ) -> impl Future<Output = Result<Vec<Ingredient>, Self::Error>> + Send + '_;

  // ── Recipes ───────────────────────────────────────────────────────────

  /// Validate and persist a new recipe together with its composition in a
  /// single transaction. Fails without writing anything if the composition
  /// is invalid.
  fn create_recipe(
    &self,
    input: NewRecipe,
  ) -> impl Future<Output = Result<Recipe, Self::Error>> + Send + '_;

  /// Replace a recipe's fields and its entire composition in a single
  /// transaction. The ingredient list must always be resent; there is no
  /// partial composition update.
  fn update_recipe(
    &self,
    recipe_id: Uuid,
    update: RecipeUpdate,
  ) -> impl Future<Output = Result<Recipe, Self::Error>> + Send + '_;

  /// Delete a recipe, cascading its composition rows and any favorite or
  /// shopping-cart relations pointing at it. Returns `false` if the recipe
  /// did not exist.
  fn delete_recipe(
    &self,
    recipe_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Retrieve a recipe by id. Returns `None` if not found.
  fn get_recipe(
    &self,
    recipe_id: Uuid,
  ) -> impl Future<Output = Result<Option<Recipe>, Self::Error>> + Send + '_;

  /// List recipes matching `query`, newest first.
  fn list_recipes<'a>(
    &'a self,
    query: &'a RecipeQuery,
  ) -> impl Future<Output = Result<Vec<Recipe>, Self::Error>> + Send + 'a;

  // ── Composition ───────────────────────────────────────────────────────

  /// Atomically replace the recipe's entire composition with `entries`.
  ///
  /// All constraints are validated before anything is mutated: the list
  /// must be non-empty, ingredient ids pairwise distinct and present in
  /// the catalog, and every amount at least 1. Old entries absent from the
  /// new list are removed — replacement is wholesale, not a diff.
  fn set_composition(
    &self,
    recipe_id: Uuid,
    entries: Vec<CompositionEntry>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Read the recipe's composition joined with the catalog, ordered by
  /// case-normalized ingredient name ascending (id ascending on ties).
  fn get_composition(
    &self,
    recipe_id: Uuid,
  ) -> impl Future<Output = Result<Vec<CompositionRow>, Self::Error>> + Send + '_;

  // ── Relations ─────────────────────────────────────────────────────────

  /// Create the (subject, target) record for `kind` if absent. Returns
  /// whether a record was created; `false` means the pair already existed
  /// (idempotent — callers map it to a conflict). Subscription to oneself
  /// is rejected.
  fn add_relation(
    &self,
    kind: RelationKind,
    subject_id: Uuid,
    target_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Remove the (subject, target) record for `kind` if present. Returns
  /// whether a record was removed; `false` means no record existed.
  fn remove_relation(
    &self,
    kind: RelationKind,
    subject_id: Uuid,
    target_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Whether the (subject, target) record exists for `kind`. Backs the
  /// read-path flags (`is_favorited`, `is_in_shopping_cart`,
  /// `is_subscribed`).
  fn relation_exists(
    &self,
    kind: RelationKind,
    subject_id: Uuid,
    target_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All targets the subject holds a record for under `kind`, newest
  /// first.
  fn relation_targets(
    &self,
    kind: RelationKind,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  // ── Shopping list ─────────────────────────────────────────────────────

  /// Aggregate the compositions of every recipe in the user's shopping
  /// cart into one summed list (see [`crate::shopping_list::aggregate`]).
  /// Fails with an empty-cart error if the cart holds no recipes — a
  /// user-visible empty state, not a system fault.
  fn build_shopping_list(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AggregatedLine>, Self::Error>> + Send + '_;
}
