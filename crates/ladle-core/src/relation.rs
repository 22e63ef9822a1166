//! Relation records — favorites, shopping carts, and subscriptions.
//!
//! All three are the same binary relation between a subject and a target,
//! with identical idempotent add/remove/exists semantics. A single tagged
//! enum parameterises the store contract so the semantics are enforced once
//! rather than three near-duplicate times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of a relation record. The target is a recipe for `Favorite` and
/// `ShoppingCart`, and another user (an author) for `Subscription`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
  Favorite,
  ShoppingCart,
  Subscription,
}

impl RelationKind {
  /// Whether the target of this kind is another user rather than a recipe.
  pub fn targets_user(self) -> bool { matches!(self, Self::Subscription) }
}

/// A persisted (subject, target) pair. Unique per kind.
///
/// Each pair is either Absent or Present; `add` and `remove` are the only
/// transitions, and repeating one is a no-op signalled to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationRecord {
  pub kind:       RelationKind,
  pub subject_id: Uuid,
  pub target_id:  Uuid,
  pub created_at: DateTime<Utc>,
}
