//! [`SqliteStore`] — the SQLite implementation of [`RecipeStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use ladle_core::{
  ingredient::{Ingredient, NewIngredient},
  recipe::{
    CompositionEntry, CompositionRow, NewRecipe, Recipe, RecipeUpdate,
    validate_composition,
  },
  relation::RelationKind,
  shopping_list::{AggregatedLine, aggregate},
  store::{RecipeQuery, RecipeStore},
};

use crate::{
  Error, Result,
  encode::{
    RawCompositionRow, RawIngredient, RawRecipe, decode_uuid, encode_dt,
    encode_relation_kind, encode_uuid,
  },
  schema::SCHEMA,
};

/// A domain-level outcome threaded out of a database closure, separate from
/// the closure's own `tokio_rusqlite` error channel.
type DomainResult<T> = std::result::Result<T, ladle_core::Error>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Ladle recipe store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Transaction helpers ─────────────────────────────────────────────────────

/// Pre-encode composition entries for use inside a database closure.
fn encode_entries(entries: &[CompositionEntry]) -> Vec<(String, Uuid, u32)> {
  entries
    .iter()
    .map(|e| (encode_uuid(e.ingredient_id), e.ingredient_id, e.amount))
    .collect()
}

/// Fetch a recipe row. `None` if the recipe is absent.
fn recipe_row(
  conn: &rusqlite::Connection,
  recipe_id: &str,
) -> rusqlite::Result<Option<RawRecipe>> {
  conn.query_row(
    "SELECT recipe_id, author_id, name, text, cooking_time, image, created_at
     FROM recipes WHERE recipe_id = ?1",
    rusqlite::params![recipe_id],
    |row| {
      Ok(RawRecipe {
        recipe_id:    row.get(0)?,
        author_id:    row.get(1)?,
        name:         row.get(2)?,
        text:         row.get(3)?,
        cooking_time: row.get(4)?,
        image:        row.get(5)?,
        created_at:   row.get(6)?,
      })
    },
  )
  .optional()
}

/// Replace a recipe's entire composition inside an open transaction.
///
/// Checks catalog membership for every entry first; if any ingredient is
/// unknown, returns the full missing-id list and the transaction is left
/// uncommitted, so nothing is mutated. Delete-then-insert runs under the
/// caller's transaction, so readers never observe a partial set.
fn replace_composition(
  tx: &rusqlite::Transaction<'_>,
  recipe_id: &str,
  entries: &[(String, Uuid, u32)],
) -> rusqlite::Result<DomainResult<()>> {
  let mut missing = Vec::new();
  {
    let mut stmt =
      tx.prepare("SELECT 1 FROM ingredients WHERE ingredient_id = ?1")?;
    for (id_str, id, _) in entries {
      let found: bool = stmt
        .query_row(rusqlite::params![id_str], |_| Ok(true))
        .optional()?
        .unwrap_or(false);
      if !found {
        missing.push(*id);
      }
    }
  }
  if !missing.is_empty() {
    return Ok(Err(ladle_core::Error::UnknownIngredient(missing)));
  }

  tx.execute(
    "DELETE FROM recipe_ingredients WHERE recipe_id = ?1",
    rusqlite::params![recipe_id],
  )?;

  let mut stmt = tx.prepare(
    "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
     VALUES (?1, ?2, ?3)",
  )?;
  for (id_str, _, amount) in entries {
    stmt.execute(rusqlite::params![recipe_id, id_str, amount])?;
  }

  Ok(Ok(()))
}

// ─── RecipeStore impl ────────────────────────────────────────────────────────

impl RecipeStore for SqliteStore {
  type Error = Error;

  // ── Ingredient catalog ────────────────────────────────────────────────────

  async fn add_ingredient(&self, input: NewIngredient) -> Result<Ingredient> {
    let id_str = encode_uuid(Uuid::new_v4());
    let name = input.name;
    let unit = input.measurement_unit;

    let raw: RawIngredient = self
      .conn
      .call(move |conn| {
        // Seeding is idempotent by name, so re-running a seed file is safe.
        conn.execute(
          "INSERT INTO ingredients (ingredient_id, name, measurement_unit)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (name) DO NOTHING",
          rusqlite::params![id_str, name, unit],
        )?;
        let raw = conn.query_row(
          "SELECT ingredient_id, name, measurement_unit
           FROM ingredients WHERE name = ?1",
          rusqlite::params![name],
          |row| {
            Ok(RawIngredient {
              ingredient_id:    row.get(0)?,
              name:             row.get(1)?,
              measurement_unit: row.get(2)?,
            })
          },
        )?;
        Ok(raw)
      })
      .await?;

    raw.into_ingredient()
  }

  async fn get_ingredient(&self, id: Uuid) -> Result<Option<Ingredient>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawIngredient> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT ingredient_id, name, measurement_unit
               FROM ingredients WHERE ingredient_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawIngredient {
                  ingredient_id:    row.get(0)?,
                  name:             row.get(1)?,
                  measurement_unit: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawIngredient::into_ingredient).transpose()
  }

  async fn list_ingredients(
    &self,
    name_prefix: Option<String>,
  ) -> Result<Vec<Ingredient>> {
    let pattern = name_prefix.map(|p| format!("{p}%"));

    let raws: Vec<RawIngredient> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(pattern) = pattern {
          let mut stmt = conn.prepare(
            "SELECT ingredient_id, name, measurement_unit FROM ingredients
             WHERE name LIKE ?1 ORDER BY lower(name)",
          )?;
          stmt
            .query_map(rusqlite::params![pattern], |row| {
              Ok(RawIngredient {
                ingredient_id:    row.get(0)?,
                name:             row.get(1)?,
                measurement_unit: row.get(2)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT ingredient_id, name, measurement_unit FROM ingredients
             ORDER BY lower(name)",
          )?;
          stmt
            .query_map([], |row| {
              Ok(RawIngredient {
                ingredient_id:    row.get(0)?,
                name:             row.get(1)?,
                measurement_unit: row.get(2)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawIngredient::into_ingredient).collect()
  }

  // ── Recipes ───────────────────────────────────────────────────────────────

  async fn create_recipe(&self, input: NewRecipe) -> Result<Recipe> {
    validate_composition(&input.ingredients)?;

    let recipe = Recipe {
      recipe_id:    Uuid::new_v4(),
      author_id:    input.author_id,
      name:         input.name,
      text:         input.text,
      cooking_time: input.cooking_time,
      image:        input.image,
      created_at:   Utc::now(),
    };

    let recipe_id_str = encode_uuid(recipe.recipe_id);
    let author_id_str = encode_uuid(recipe.author_id);
    let name          = recipe.name.clone();
    let text          = recipe.text.clone();
    let cooking_time  = recipe.cooking_time;
    let image         = recipe.image.clone();
    let created_str   = encode_dt(recipe.created_at);
    let entries       = encode_entries(&input.ingredients);

    let outcome: DomainResult<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO recipes
             (recipe_id, author_id, name, text, cooking_time, image, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            recipe_id_str,
            author_id_str,
            name,
            text,
            cooking_time,
            image,
            created_str,
          ],
        )?;
        let res = replace_composition(&tx, &recipe_id_str, &entries)?;
        if res.is_ok() {
          tx.commit()?;
        }
        Ok(res)
      })
      .await?;

    outcome.map_err(Error::Core)?;
    Ok(recipe)
  }

  async fn update_recipe(
    &self,
    recipe_id: Uuid,
    update: RecipeUpdate,
  ) -> Result<Recipe> {
    validate_composition(&update.ingredients)?;

    let recipe_id_str = encode_uuid(recipe_id);
    let name          = update.name.clone();
    let text          = update.text.clone();
    let cooking_time  = update.cooking_time;
    let image         = update.image.clone();
    let entries       = encode_entries(&update.ingredients);

    let outcome: DomainResult<RawRecipe> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(raw) = recipe_row(&tx, &recipe_id_str)? else {
          return Ok(Err(ladle_core::Error::RecipeNotFound(recipe_id)));
        };

        tx.execute(
          "UPDATE recipes SET name = ?2, text = ?3, cooking_time = ?4, image = ?5
           WHERE recipe_id = ?1",
          rusqlite::params![recipe_id_str, name, text, cooking_time, image],
        )?;

        if let Err(e) = replace_composition(&tx, &recipe_id_str, &entries)? {
          return Ok(Err(e));
        }

        tx.commit()?;
        Ok(Ok(raw))
      })
      .await?;

    let existing = outcome.map_err(Error::Core)?.into_recipe()?;
    Ok(Recipe {
      name: update.name,
      text: update.text,
      cooking_time: update.cooking_time,
      image: update.image,
      ..existing
    })
  }

  async fn delete_recipe(&self, recipe_id: Uuid) -> Result<bool> {
    let recipe_id_str = encode_uuid(recipe_id);

    let deleted: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Composition rows cascade via the foreign key; favorite and cart
        // records have no FK (their target column is polymorphic) and are
        // swept explicitly.
        tx.execute(
          "DELETE FROM relations
           WHERE kind IN ('favorite', 'shopping_cart') AND target_id = ?1",
          rusqlite::params![recipe_id_str],
        )?;
        let n = tx.execute(
          "DELETE FROM recipes WHERE recipe_id = ?1",
          rusqlite::params![recipe_id_str],
        )?;
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;

    Ok(deleted)
  }

  async fn get_recipe(&self, recipe_id: Uuid) -> Result<Option<Recipe>> {
    let recipe_id_str = encode_uuid(recipe_id);

    let raw: Option<RawRecipe> = self
      .conn
      .call(move |conn| Ok(recipe_row(conn, &recipe_id_str)?))
      .await?;

    raw.map(RawRecipe::into_recipe).transpose()
  }

  async fn list_recipes(&self, query: &RecipeQuery) -> Result<Vec<Recipe>> {
    let author_str    = query.author.map(encode_uuid);
    let favorited_str = query.favorited_by.map(encode_uuid);
    let cart_str      = query.in_cart_of.map(encode_uuid);
    let limit_val     = query.limit.unwrap_or(100) as i64;
    let offset_val    = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawRecipe> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically.
        let mut conds: Vec<&'static str> = vec![];
        if author_str.is_some() {
          conds.push("r.author_id = ?1");
        }
        if favorited_str.is_some() {
          conds.push(
            "EXISTS (SELECT 1 FROM relations f
                     WHERE f.kind = 'favorite'
                       AND f.subject_id = ?2
                       AND f.target_id = r.recipe_id)",
          );
        }
        if cart_str.is_some() {
          conds.push(
            "EXISTS (SELECT 1 FROM relations c
                     WHERE c.kind = 'shopping_cart'
                       AND c.subject_id = ?3
                       AND c.target_id = r.recipe_id)",
          );
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT r.recipe_id, r.author_id, r.name, r.text, r.cooking_time,
                  r.image, r.created_at
           FROM recipes r
           {where_clause}
           ORDER BY r.created_at DESC, r.recipe_id
           LIMIT ?4 OFFSET ?5"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              author_str.as_deref(),
              favorited_str.as_deref(),
              cart_str.as_deref(),
              limit_val,
              offset_val,
            ],
            |row| {
              Ok(RawRecipe {
                recipe_id:    row.get(0)?,
                author_id:    row.get(1)?,
                name:         row.get(2)?,
                text:         row.get(3)?,
                cooking_time: row.get(4)?,
                image:        row.get(5)?,
                created_at:   row.get(6)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecipe::into_recipe).collect()
  }

  // ── Composition ───────────────────────────────────────────────────────────

  async fn set_composition(
    &self,
    recipe_id: Uuid,
    entries: Vec<CompositionEntry>,
  ) -> Result<()> {
    validate_composition(&entries)?;

    let recipe_id_str = encode_uuid(recipe_id);
    let entries = encode_entries(&entries);

    let outcome: DomainResult<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if recipe_row(&tx, &recipe_id_str)?.is_none() {
          return Ok(Err(ladle_core::Error::RecipeNotFound(recipe_id)));
        }
        let res = replace_composition(&tx, &recipe_id_str, &entries)?;
        if res.is_ok() {
          tx.commit()?;
        }
        Ok(res)
      })
      .await?;

    outcome.map_err(Error::Core)
  }

  async fn get_composition(
    &self,
    recipe_id: Uuid,
  ) -> Result<Vec<CompositionRow>> {
    let recipe_id_str = encode_uuid(recipe_id);

    let raws: Vec<RawCompositionRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT ri.ingredient_id, i.name, i.measurement_unit, ri.amount
           FROM recipe_ingredients ri
           JOIN ingredients i ON i.ingredient_id = ri.ingredient_id
           WHERE ri.recipe_id = ?1
           ORDER BY lower(i.name), ri.ingredient_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![recipe_id_str], |row| {
            Ok(RawCompositionRow {
              ingredient_id:    row.get(0)?,
              name:             row.get(1)?,
              measurement_unit: row.get(2)?,
              amount:           row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCompositionRow::into_row).collect()
  }

  // ── Relations ─────────────────────────────────────────────────────────────

  async fn add_relation(
    &self,
    kind: RelationKind,
    subject_id: Uuid,
    target_id: Uuid,
  ) -> Result<bool> {
    if kind == RelationKind::Subscription && subject_id == target_id {
      return Err(Error::Core(ladle_core::Error::SelfReferenceForbidden));
    }

    let kind_str    = encode_relation_kind(kind).to_owned();
    let subject_str = encode_uuid(subject_id);
    let target_str  = encode_uuid(target_id);
    let at_str      = encode_dt(Utc::now());

    let created = self
      .conn
      .call(move |conn| {
        // The primary key arbitrates racing adds: the losing insert is a
        // no-op rather than a constraint-violation error.
        let n = conn.execute(
          "INSERT INTO relations (kind, subject_id, target_id, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (kind, subject_id, target_id) DO NOTHING",
          rusqlite::params![kind_str, subject_str, target_str, at_str],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(created)
  }

  async fn remove_relation(
    &self,
    kind: RelationKind,
    subject_id: Uuid,
    target_id: Uuid,
  ) -> Result<bool> {
    let kind_str    = encode_relation_kind(kind).to_owned();
    let subject_str = encode_uuid(subject_id);
    let target_str  = encode_uuid(target_id);

    let removed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM relations
           WHERE kind = ?1 AND subject_id = ?2 AND target_id = ?3",
          rusqlite::params![kind_str, subject_str, target_str],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(removed)
  }

  async fn relation_exists(
    &self,
    kind: RelationKind,
    subject_id: Uuid,
    target_id: Uuid,
  ) -> Result<bool> {
    let kind_str    = encode_relation_kind(kind).to_owned();
    let subject_str = encode_uuid(subject_id);
    let target_str  = encode_uuid(target_id);

    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM relations
               WHERE kind = ?1 AND subject_id = ?2 AND target_id = ?3",
              rusqlite::params![kind_str, subject_str, target_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(exists)
  }

  async fn relation_targets(
    &self,
    kind: RelationKind,
    subject_id: Uuid,
  ) -> Result<Vec<Uuid>> {
    let kind_str    = encode_relation_kind(kind).to_owned();
    let subject_str = encode_uuid(subject_id);

    let raws: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT target_id FROM relations
           WHERE kind = ?1 AND subject_id = ?2
           ORDER BY created_at DESC, target_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![kind_str, subject_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.iter().map(|s| decode_uuid(s)).collect()
  }

  // ── Shopping list ─────────────────────────────────────────────────────────

  async fn build_shopping_list(
    &self,
    user_id: Uuid,
  ) -> Result<Vec<AggregatedLine>> {
    let kind_str = encode_relation_kind(RelationKind::ShoppingCart).to_owned();
    let user_str = encode_uuid(user_id);

    let (cart_size, raws): (i64, Vec<RawCompositionRow>) = self
      .conn
      .call(move |conn| {
        let cart_size: i64 = conn.query_row(
          "SELECT COUNT(*) FROM relations
           WHERE kind = ?1 AND subject_id = ?2",
          rusqlite::params![kind_str, user_str],
          |row| row.get(0),
        )?;
        if cart_size == 0 {
          return Ok((0, Vec::new()));
        }

        let mut stmt = conn.prepare(
          "SELECT ri.ingredient_id, i.name, i.measurement_unit, ri.amount
           FROM relations c
           JOIN recipe_ingredients ri ON ri.recipe_id = c.target_id
           JOIN ingredients i ON i.ingredient_id = ri.ingredient_id
           WHERE c.kind = ?1 AND c.subject_id = ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![kind_str, user_str], |row| {
            Ok(RawCompositionRow {
              ingredient_id:    row.get(0)?,
              name:             row.get(1)?,
              measurement_unit: row.get(2)?,
              amount:           row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((cart_size, rows))
      })
      .await?;

    if cart_size == 0 {
      return Err(Error::Core(ladle_core::Error::EmptyCart));
    }

    let rows: Vec<CompositionRow> = raws
      .into_iter()
      .map(RawCompositionRow::into_row)
      .collect::<Result<_>>()?;

    Ok(aggregate(rows))
  }
}
