//! SQL schema for the Ladle SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- The ingredient catalog. Seeded at setup; never mutated by the engine.
CREATE TABLE IF NOT EXISTS ingredients (
    ingredient_id    TEXT PRIMARY KEY,
    name             TEXT NOT NULL UNIQUE,
    measurement_unit TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS recipes (
    recipe_id    TEXT PRIMARY KEY,
    author_id    TEXT NOT NULL,   -- opaque identity from the auth layer
    name         TEXT NOT NULL,
    text         TEXT NOT NULL,
    cooking_time INTEGER NOT NULL,  -- minutes
    image        TEXT,
    created_at   TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- Composition entries. The full set for a recipe is deleted and recreated
-- on every write that touches ingredients; there is no row-level UPDATE.
CREATE TABLE IF NOT EXISTS recipe_ingredients (
    recipe_id     TEXT NOT NULL REFERENCES recipes(recipe_id) ON DELETE CASCADE,
    ingredient_id TEXT NOT NULL REFERENCES ingredients(ingredient_id),
    amount        INTEGER NOT NULL CHECK (amount >= 1),
    PRIMARY KEY (recipe_id, ingredient_id)
);

-- Favorite / shopping-cart / subscription records. The primary key doubles
-- as the concurrency arbiter for idempotent adds.
CREATE TABLE IF NOT EXISTS relations (
    kind       TEXT NOT NULL,   -- 'favorite' | 'shopping_cart' | 'subscription'
    subject_id TEXT NOT NULL,
    target_id  TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (kind, subject_id, target_id)
);

CREATE INDEX IF NOT EXISTS recipes_author_idx        ON recipes(author_id);
CREATE INDEX IF NOT EXISTS recipe_ingredients_ing_idx ON recipe_ingredients(ingredient_id);
CREATE INDEX IF NOT EXISTS relations_target_idx      ON relations(kind, target_id);

PRAGMA user_version = 1;
";
