//! Integration tests for `SqliteStore` against an in-memory database.

use ladle_core::{
  ingredient::{Ingredient, NewIngredient},
  recipe::{CompositionEntry, NewRecipe, Recipe, RecipeUpdate},
  relation::RelationKind,
  store::{RecipeQuery, RecipeStore},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn ingredient(s: &SqliteStore, name: &str, unit: &str) -> Ingredient {
  s.add_ingredient(NewIngredient {
    name:             name.into(),
    measurement_unit: unit.into(),
  })
  .await
  .unwrap()
}

fn entry(ingredient_id: Uuid, amount: u32) -> CompositionEntry {
  CompositionEntry { ingredient_id, amount }
}

fn new_recipe(
  author_id: Uuid,
  name: &str,
  ingredients: Vec<CompositionEntry>,
) -> NewRecipe {
  NewRecipe {
    author_id,
    name: name.into(),
    text: "Mix and cook.".into(),
    cooking_time: 30,
    image: None,
    ingredients,
  }
}

async fn recipe(
  s: &SqliteStore,
  author_id: Uuid,
  name: &str,
  ingredients: Vec<CompositionEntry>,
) -> Recipe {
  s.create_recipe(new_recipe(author_id, name, ingredients))
    .await
    .unwrap()
}

// ─── Ingredient catalog ──────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_ingredient() {
  let s = store().await;

  let sugar = ingredient(&s, "Sugar", "g").await;
  let fetched = s.get_ingredient(sugar.ingredient_id).await.unwrap();

  assert!(fetched.is_some());
  let fetched = fetched.unwrap();
  assert_eq!(fetched.name, "Sugar");
  assert_eq!(fetched.measurement_unit, "g");
}

#[tokio::test]
async fn add_ingredient_is_idempotent_by_name() {
  let s = store().await;

  let first = ingredient(&s, "Salt", "g").await;
  let second = ingredient(&s, "Salt", "g").await;

  assert_eq!(first.ingredient_id, second.ingredient_id);
  assert_eq!(s.list_ingredients(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn get_ingredient_missing_returns_none() {
  let s = store().await;
  assert!(s.get_ingredient(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_ingredients_filters_by_prefix() {
  let s = store().await;
  ingredient(&s, "Flour", "g").await;
  ingredient(&s, "flaxseed", "g").await;
  ingredient(&s, "Milk", "ml").await;

  let matched = s.list_ingredients(Some("fl".into())).await.unwrap();
  assert_eq!(matched.len(), 2);

  let all = s.list_ingredients(None).await.unwrap();
  assert_eq!(all.len(), 3);
}

// ─── Recipe creation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn create_recipe_persists_composition() {
  let s = store().await;
  let flour = ingredient(&s, "Flour", "g").await;
  let egg = ingredient(&s, "Egg", "pcs").await;

  let author = Uuid::new_v4();
  let r = recipe(&s, author, "Pancakes", vec![
    entry(flour.ingredient_id, 500),
    entry(egg.ingredient_id, 3),
  ])
  .await;

  let fetched = s.get_recipe(r.recipe_id).await.unwrap().unwrap();
  assert_eq!(fetched.author_id, author);
  assert_eq!(fetched.name, "Pancakes");

  let rows = s.get_composition(r.recipe_id).await.unwrap();
  assert_eq!(rows.len(), 2);
  // Ordered by name: Egg before Flour.
  assert_eq!(rows[0].name, "Egg");
  assert_eq!(rows[0].amount, 3);
  assert_eq!(rows[1].name, "Flour");
  assert_eq!(rows[1].amount, 500);
}

#[tokio::test]
async fn get_recipe_missing_returns_none() {
  let s = store().await;
  assert!(s.get_recipe(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn create_recipe_without_ingredients_is_rejected() {
  let s = store().await;

  let err = s
    .create_recipe(new_recipe(Uuid::new_v4(), "Air soup", vec![]))
    .await
    .unwrap_err();

  assert!(matches!(
    err,
    crate::Error::Core(ladle_core::Error::EmptyComposition)
  ));
}

#[tokio::test]
async fn create_recipe_with_duplicate_ingredient_is_rejected() {
  let s = store().await;
  let flour = ingredient(&s, "Flour", "g").await;

  let err = s
    .create_recipe(new_recipe(Uuid::new_v4(), "Double flour", vec![
      entry(flour.ingredient_id, 100),
      entry(flour.ingredient_id, 200),
    ]))
    .await
    .unwrap_err();

  assert!(matches!(
    err,
    crate::Error::Core(ladle_core::Error::DuplicateIngredient(id))
      if id == flour.ingredient_id
  ));
}

#[tokio::test]
async fn create_recipe_with_unknown_ingredients_lists_all_missing() {
  let s = store().await;
  let flour = ingredient(&s, "Flour", "g").await;
  let ghost_a = Uuid::new_v4();
  let ghost_b = Uuid::new_v4();

  let err = s
    .create_recipe(new_recipe(Uuid::new_v4(), "Ghost cake", vec![
      entry(flour.ingredient_id, 100),
      entry(ghost_a, 1),
      entry(ghost_b, 2),
    ]))
    .await
    .unwrap_err();

  let crate::Error::Core(ladle_core::Error::UnknownIngredient(missing)) = err
  else {
    panic!("expected UnknownIngredient, got {err:?}");
  };
  assert_eq!(missing, vec![ghost_a, ghost_b]);

  // Fail-fast: nothing was written.
  let listed = s.list_recipes(&RecipeQuery::default()).await.unwrap();
  assert!(listed.is_empty());
}

#[tokio::test]
async fn create_recipe_with_zero_amount_is_rejected() {
  let s = store().await;
  let flour = ingredient(&s, "Flour", "g").await;

  let err = s
    .create_recipe(new_recipe(Uuid::new_v4(), "Nothing pie", vec![entry(
      flour.ingredient_id,
      0,
    )]))
    .await
    .unwrap_err();

  assert!(matches!(
    err,
    crate::Error::Core(ladle_core::Error::InvalidAmount { amount: 0, .. })
  ));
}

// ─── Composition replacement ─────────────────────────────────────────────────

#[tokio::test]
async fn set_composition_replaces_wholesale() {
  let s = store().await;
  let flour = ingredient(&s, "Flour", "g").await;
  let egg = ingredient(&s, "Egg", "pcs").await;

  let r = recipe(&s, Uuid::new_v4(), "Pancakes", vec![
    entry(flour.ingredient_id, 500),
    entry(egg.ingredient_id, 3),
  ])
  .await;

  s.set_composition(r.recipe_id, vec![entry(flour.ingredient_id, 600)])
    .await
    .unwrap();

  // The egg entry is gone even though it was not named in the new list.
  let rows = s.get_composition(r.recipe_id).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].ingredient_id, flour.ingredient_id);
  assert_eq!(rows[0].amount, 600);
}

#[tokio::test]
async fn failed_set_composition_leaves_prior_composition_unchanged() {
  let s = store().await;
  let flour = ingredient(&s, "Flour", "g").await;
  let egg = ingredient(&s, "Egg", "pcs").await;

  let r = recipe(&s, Uuid::new_v4(), "Pancakes", vec![
    entry(flour.ingredient_id, 500),
    entry(egg.ingredient_id, 3),
  ])
  .await;

  // Duplicate id: rejected before any mutation.
  let err = s
    .set_composition(r.recipe_id, vec![
      entry(flour.ingredient_id, 1),
      entry(flour.ingredient_id, 2),
    ])
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(ladle_core::Error::DuplicateIngredient(_))
  ));

  // Unknown id: rejected inside the transaction, nothing committed.
  let err = s
    .set_composition(r.recipe_id, vec![entry(Uuid::new_v4(), 1)])
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(ladle_core::Error::UnknownIngredient(_))
  ));

  let rows = s.get_composition(r.recipe_id).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].amount, 3);
  assert_eq!(rows[1].amount, 500);
}

#[tokio::test]
async fn set_composition_on_missing_recipe_errors() {
  let s = store().await;
  let flour = ingredient(&s, "Flour", "g").await;

  let err = s
    .set_composition(Uuid::new_v4(), vec![entry(flour.ingredient_id, 1)])
    .await
    .unwrap_err();

  assert!(matches!(
    err,
    crate::Error::Core(ladle_core::Error::RecipeNotFound(_))
  ));
}

#[tokio::test]
async fn roundtrip_returns_exactly_the_submitted_set() {
  let s = store().await;
  let a = ingredient(&s, "Butter", "g").await;
  let b = ingredient(&s, "Apple", "pcs").await;
  let c = ingredient(&s, "Cinnamon", "g").await;

  let r = recipe(&s, Uuid::new_v4(), "Apple pie", vec![entry(
    a.ingredient_id,
    1,
  )])
  .await;

  let submitted = vec![
    entry(c.ingredient_id, 5),
    entry(a.ingredient_id, 150),
    entry(b.ingredient_id, 4),
  ];
  s.set_composition(r.recipe_id, submitted.clone()).await.unwrap();

  let rows = s.get_composition(r.recipe_id).await.unwrap();
  let mut got: Vec<(Uuid, u32)> =
    rows.iter().map(|row| (row.ingredient_id, row.amount)).collect();
  let mut want: Vec<(Uuid, u32)> =
    submitted.iter().map(|e| (e.ingredient_id, e.amount)).collect();
  got.sort();
  want.sort();
  assert_eq!(got, want);
}

// ─── Recipe update & delete ──────────────────────────────────────────────────

#[tokio::test]
async fn update_recipe_replaces_fields_and_composition() {
  let s = store().await;
  let flour = ingredient(&s, "Flour", "g").await;
  let egg = ingredient(&s, "Egg", "pcs").await;

  let author = Uuid::new_v4();
  let r = recipe(&s, author, "Pancakes", vec![
    entry(flour.ingredient_id, 500),
    entry(egg.ingredient_id, 3),
  ])
  .await;

  let updated = s
    .update_recipe(r.recipe_id, RecipeUpdate {
      name:         "Thin pancakes".into(),
      text:         "Whisk harder.".into(),
      cooking_time: 20,
      image:        Some("pancakes.webp".into()),
      ingredients:  vec![entry(flour.ingredient_id, 600)],
    })
    .await
    .unwrap();

  assert_eq!(updated.recipe_id, r.recipe_id);
  assert_eq!(updated.author_id, author);
  assert_eq!(updated.name, "Thin pancakes");
  assert_eq!(updated.cooking_time, 20);

  let fetched = s.get_recipe(r.recipe_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Thin pancakes");
  assert_eq!(fetched.image.as_deref(), Some("pancakes.webp"));

  let rows = s.get_composition(r.recipe_id).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].ingredient_id, flour.ingredient_id);
  assert_eq!(rows[0].amount, 600);
}

#[tokio::test]
async fn update_missing_recipe_errors() {
  let s = store().await;
  let flour = ingredient(&s, "Flour", "g").await;

  let err = s
    .update_recipe(Uuid::new_v4(), RecipeUpdate {
      name:         "Nowhere".into(),
      text:         "".into(),
      cooking_time: 5,
      image:        None,
      ingredients:  vec![entry(flour.ingredient_id, 1)],
    })
    .await
    .unwrap_err();

  assert!(matches!(
    err,
    crate::Error::Core(ladle_core::Error::RecipeNotFound(_))
  ));
}

#[tokio::test]
async fn delete_recipe_cascades_composition_and_relations() {
  let s = store().await;
  let flour = ingredient(&s, "Flour", "g").await;
  let user = Uuid::new_v4();

  let r =
    recipe(&s, Uuid::new_v4(), "Bread", vec![entry(flour.ingredient_id, 900)])
      .await;
  s.add_relation(RelationKind::Favorite, user, r.recipe_id).await.unwrap();
  s.add_relation(RelationKind::ShoppingCart, user, r.recipe_id)
    .await
    .unwrap();

  assert!(s.delete_recipe(r.recipe_id).await.unwrap());

  assert!(s.get_recipe(r.recipe_id).await.unwrap().is_none());
  assert!(s.get_composition(r.recipe_id).await.unwrap().is_empty());
  assert!(
    !s.relation_exists(RelationKind::Favorite, user, r.recipe_id)
      .await
      .unwrap()
  );
  assert!(
    !s.relation_exists(RelationKind::ShoppingCart, user, r.recipe_id)
      .await
      .unwrap()
  );
}

#[tokio::test]
async fn delete_missing_recipe_returns_false() {
  let s = store().await;
  assert!(!s.delete_recipe(Uuid::new_v4()).await.unwrap());
}

// ─── Recipe listing ──────────────────────────────────────────────────────────

#[tokio::test]
async fn list_recipes_filters_by_author_favorites_and_cart() {
  let s = store().await;
  let flour = ingredient(&s, "Flour", "g").await;

  let alice = Uuid::new_v4();
  let bob = Uuid::new_v4();
  let r1 =
    recipe(&s, alice, "Bread", vec![entry(flour.ingredient_id, 900)]).await;
  let r2 =
    recipe(&s, bob, "Buns", vec![entry(flour.ingredient_id, 400)]).await;

  let viewer = Uuid::new_v4();
  s.add_relation(RelationKind::Favorite, viewer, r1.recipe_id).await.unwrap();
  s.add_relation(RelationKind::ShoppingCart, viewer, r2.recipe_id)
    .await
    .unwrap();

  let by_alice = s
    .list_recipes(&RecipeQuery { author: Some(alice), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_alice.len(), 1);
  assert_eq!(by_alice[0].recipe_id, r1.recipe_id);

  let favorited = s
    .list_recipes(&RecipeQuery {
      favorited_by: Some(viewer),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(favorited.len(), 1);
  assert_eq!(favorited[0].recipe_id, r1.recipe_id);

  let in_cart = s
    .list_recipes(&RecipeQuery {
      in_cart_of: Some(viewer),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(in_cart.len(), 1);
  assert_eq!(in_cart[0].recipe_id, r2.recipe_id);

  let all = s.list_recipes(&RecipeQuery::default()).await.unwrap();
  assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn list_recipes_respects_limit_and_offset() {
  let s = store().await;
  let flour = ingredient(&s, "Flour", "g").await;
  let author = Uuid::new_v4();

  for i in 0..5 {
    recipe(&s, author, &format!("Recipe {i}"), vec![entry(
      flour.ingredient_id,
      1,
    )])
    .await;
  }

  let page = s
    .list_recipes(&RecipeQuery {
      limit: Some(2),
      offset: Some(1),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(page.len(), 2);
}

// ─── Relations ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_relation_is_idempotent() {
  let s = store().await;
  let user = Uuid::new_v4();
  let target = Uuid::new_v4();

  let created = s
    .add_relation(RelationKind::Favorite, user, target)
    .await
    .unwrap();
  assert!(created);

  let created_again = s
    .add_relation(RelationKind::Favorite, user, target)
    .await
    .unwrap();
  assert!(!created_again);

  assert!(
    s.relation_exists(RelationKind::Favorite, user, target).await.unwrap()
  );
}

#[tokio::test]
async fn remove_relation_after_add_and_without_add() {
  let s = store().await;
  let user = Uuid::new_v4();
  let target = Uuid::new_v4();

  s.add_relation(RelationKind::ShoppingCart, user, target).await.unwrap();
  assert!(
    s.remove_relation(RelationKind::ShoppingCart, user, target)
      .await
      .unwrap()
  );
  assert!(
    !s.relation_exists(RelationKind::ShoppingCart, user, target)
      .await
      .unwrap()
  );

  // Removing again signals absence instead of erroring.
  assert!(
    !s.remove_relation(RelationKind::ShoppingCart, user, target)
      .await
      .unwrap()
  );
}

#[tokio::test]
async fn relation_kinds_are_independent() {
  let s = store().await;
  let user = Uuid::new_v4();
  let target = Uuid::new_v4();

  s.add_relation(RelationKind::Favorite, user, target).await.unwrap();

  assert!(
    s.relation_exists(RelationKind::Favorite, user, target).await.unwrap()
  );
  assert!(
    !s.relation_exists(RelationKind::ShoppingCart, user, target)
      .await
      .unwrap()
  );

  // Adding the same pair under another kind still counts as a fresh record.
  assert!(
    s.add_relation(RelationKind::ShoppingCart, user, target).await.unwrap()
  );
}

#[tokio::test]
async fn self_subscription_is_forbidden_and_writes_nothing() {
  let s = store().await;
  let user = Uuid::new_v4();

  let err = s
    .add_relation(RelationKind::Subscription, user, user)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(ladle_core::Error::SelfReferenceForbidden)
  ));

  assert!(
    !s.relation_exists(RelationKind::Subscription, user, user).await.unwrap()
  );
}

#[tokio::test]
async fn relation_targets_returns_all_targets() {
  let s = store().await;
  let user = Uuid::new_v4();
  let a = Uuid::new_v4();
  let b = Uuid::new_v4();

  s.add_relation(RelationKind::Subscription, user, a).await.unwrap();
  s.add_relation(RelationKind::Subscription, user, b).await.unwrap();

  let targets = s
    .relation_targets(RelationKind::Subscription, user)
    .await
    .unwrap();
  assert_eq!(targets.len(), 2);
  assert!(targets.contains(&a));
  assert!(targets.contains(&b));
}

// ─── Shopping list ───────────────────────────────────────────────────────────

#[tokio::test]
async fn shopping_list_sums_across_cart_recipes() {
  let s = store().await;
  let sugar = ingredient(&s, "Sugar", "g").await;
  let milk = ingredient(&s, "Milk", "ml").await;

  let author = Uuid::new_v4();
  let r1 =
    recipe(&s, author, "Caramel", vec![entry(sugar.ingredient_id, 100)]).await;
  let r2 = recipe(&s, author, "Custard", vec![
    entry(sugar.ingredient_id, 50),
    entry(milk.ingredient_id, 200),
  ])
  .await;

  let user = Uuid::new_v4();
  s.add_relation(RelationKind::ShoppingCart, user, r1.recipe_id)
    .await
    .unwrap();
  s.add_relation(RelationKind::ShoppingCart, user, r2.recipe_id)
    .await
    .unwrap();

  let lines = s.build_shopping_list(user).await.unwrap();

  assert_eq!(lines.len(), 2);
  assert_eq!(lines[0].name, "Milk");
  assert_eq!(lines[0].total_amount, 200);
  assert_eq!(lines[0].measurement_unit, "ml");
  assert_eq!(lines[1].name, "Sugar");
  assert_eq!(lines[1].total_amount, 150);
  assert_eq!(lines[1].measurement_unit, "g");
}

#[tokio::test]
async fn shopping_list_is_independent_of_cart_insertion_order() {
  let s = store().await;
  let sugar = ingredient(&s, "Sugar", "g").await;
  let milk = ingredient(&s, "Milk", "ml").await;

  let author = Uuid::new_v4();
  let r1 =
    recipe(&s, author, "Caramel", vec![entry(sugar.ingredient_id, 100)]).await;
  let r2 = recipe(&s, author, "Custard", vec![
    entry(sugar.ingredient_id, 50),
    entry(milk.ingredient_id, 200),
  ])
  .await;

  let forward = Uuid::new_v4();
  s.add_relation(RelationKind::ShoppingCart, forward, r1.recipe_id)
    .await
    .unwrap();
  s.add_relation(RelationKind::ShoppingCart, forward, r2.recipe_id)
    .await
    .unwrap();

  let reversed = Uuid::new_v4();
  s.add_relation(RelationKind::ShoppingCart, reversed, r2.recipe_id)
    .await
    .unwrap();
  s.add_relation(RelationKind::ShoppingCart, reversed, r1.recipe_id)
    .await
    .unwrap();

  assert_eq!(
    s.build_shopping_list(forward).await.unwrap(),
    s.build_shopping_list(reversed).await.unwrap(),
  );
}

#[tokio::test]
async fn shopping_list_for_empty_cart_errors() {
  let s = store().await;

  let err = s.build_shopping_list(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(ladle_core::Error::EmptyCart)
  ));
}

#[tokio::test]
async fn shopping_list_ignores_other_users_carts() {
  let s = store().await;
  let sugar = ingredient(&s, "Sugar", "g").await;

  let r = recipe(&s, Uuid::new_v4(), "Caramel", vec![entry(
    sugar.ingredient_id,
    100,
  )])
  .await;

  let user = Uuid::new_v4();
  let other = Uuid::new_v4();
  s.add_relation(RelationKind::ShoppingCart, other, r.recipe_id)
    .await
    .unwrap();

  let err = s.build_shopping_list(user).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(ladle_core::Error::EmptyCart)
  ));
}

#[tokio::test]
async fn shopping_list_reflects_composition_updates() {
  let s = store().await;
  let flour = ingredient(&s, "Flour", "g").await;
  let egg = ingredient(&s, "Egg", "pcs").await;

  let r = recipe(&s, Uuid::new_v4(), "Pancakes", vec![
    entry(flour.ingredient_id, 500),
    entry(egg.ingredient_id, 3),
  ])
  .await;

  let user = Uuid::new_v4();
  s.add_relation(RelationKind::ShoppingCart, user, r.recipe_id)
    .await
    .unwrap();

  s.set_composition(r.recipe_id, vec![entry(flour.ingredient_id, 600)])
    .await
    .unwrap();

  let lines = s.build_shopping_list(user).await.unwrap();
  assert_eq!(lines.len(), 1);
  assert_eq!(lines[0].ingredient_id, flour.ingredient_id);
  assert_eq!(lines[0].total_amount, 600);
}
