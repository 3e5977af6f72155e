use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use sea_orm::{
    DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Statement, Value,
};

use foodgram_api::domain::repository::{
    RecipeCollectionRepository, RecipeRepository, SubscriptionRepository,
};
use foodgram_api::domain::types::{IngredientLine, RecipePatch};
use foodgram_api::error::ApiError;
use foodgram_api::infra::db::{
    DbFavoriteRepository, DbRecipeRepository, DbShoppingCartRepository, DbSubscriptionRepository,
};
use foodgram_api::usecase::collection::AddToCollectionUseCase;
use foodgram_api_schema::recipes;

use crate::helpers::MemoryStore;

fn affected(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

fn db_with_exec(results: impl IntoIterator<Item = MockExecResult>) -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(results)
        .into_connection()
}

/// Every statement the mock saw, flattened across transactions.
fn statements(db: DatabaseConnection) -> Vec<Statement> {
    db.into_transaction_log()
        .iter()
        .flat_map(|txn| txn.statements().to_vec())
        .collect()
}

fn recipe_model(id: i32, author_id: i32) -> recipes::Model {
    recipes::Model {
        id,
        author_id,
        name: format!("recipe {id}"),
        text: "Mix and bake.".into(),
        image: None,
        cooking_time: 30,
        pub_date: Utc.timestamp_opt(1_700_000_000 + i64::from(id), 0).unwrap(),
    }
}

// ── Favorites / shopping cart / subscriptions ────────────────────────────────

#[tokio::test]
async fn should_report_inserted_favorite() {
    let db = db_with_exec([affected(1)]);
    let repo = DbFavoriteRepository { db: db.clone() };

    assert!(repo.add(7, 3).await.unwrap());

    let log = statements(db);
    assert_eq!(log.len(), 1);
    assert!(log[0].sql.starts_with(r#"INSERT INTO "favorites""#));
    assert!(log[0].sql.contains("ON CONFLICT"));
    assert!(log[0].sql.contains("DO NOTHING"));
}

#[tokio::test]
async fn should_report_duplicate_favorite_when_nothing_inserted() {
    let repo = DbFavoriteRepository {
        db: db_with_exec([affected(0)]),
    };

    assert!(!repo.add(7, 3).await.unwrap());
}

#[tokio::test]
async fn should_report_duplicate_cart_entry_when_nothing_inserted() {
    let db = db_with_exec([affected(0)]);
    let repo = DbShoppingCartRepository { db: db.clone() };

    assert!(!repo.add(7, 3).await.unwrap());

    let log = statements(db);
    assert!(log[0].sql.starts_with(r#"INSERT INTO "shopping_carts""#));
    assert!(log[0].sql.contains("DO NOTHING"));
}

#[tokio::test]
async fn should_report_duplicate_subscription_when_nothing_inserted() {
    let db = db_with_exec([affected(1), affected(0)]);
    let repo = DbSubscriptionRepository { db: db.clone() };

    assert!(repo.subscribe(7, 9).await.unwrap());
    assert!(!repo.subscribe(7, 9).await.unwrap());

    let log = statements(db);
    assert_eq!(log.len(), 2);
    assert!(log.iter().all(|s| s.sql.contains("ON CONFLICT")));
}

#[tokio::test]
async fn should_map_conflicting_favorite_insert_to_already_favorited() {
    let store = MemoryStore::new();
    let author = store.with_user("author");
    let reader = store.with_user("reader");
    let recipe = store.with_recipe(author.id, "Pancakes", &[], &[]);
    let usecase = AddToCollectionUseCase {
        recipes: store,
        collection: DbFavoriteRepository {
            db: db_with_exec([affected(0)]),
        },
    };

    let result = usecase.execute(reader.id, recipe.id).await;

    assert!(matches!(result, Err(ApiError::AlreadyFavorited)));
}

// ── Recipe update ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_replace_links_inside_one_transaction_on_update() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![recipe_model(5, 1)]])
        .append_exec_results([affected(2), affected(3), affected(1), affected(1)])
        .into_connection();
    let repo = DbRecipeRepository { db: db.clone() };
    let patch = RecipePatch {
        name: None,
        text: None,
        image: None,
        cooking_time: None,
        tag_ids: vec![4],
        ingredients: vec![IngredientLine {
            ingredient_id: 8,
            amount: 250,
        }],
    };

    let recipe = repo.update(5, &patch).await.unwrap();
    assert_eq!(recipe.id, 5);

    let log = db.into_transaction_log();
    assert_eq!(log.len(), 1, "expected a single transaction, got {log:?}");
    let sql: Vec<&str> = log[0].statements().iter().map(|s| s.sql.as_str()).collect();
    let position = |prefix: &str| {
        sql.iter()
            .position(|s| s.starts_with(prefix))
            .unwrap_or_else(|| panic!("no statement starting with {prefix}: {sql:?}"))
    };

    assert_eq!(sql.first(), Some(&"BEGIN"));
    assert_eq!(sql.last(), Some(&"COMMIT"));
    let delete_tags = position(r#"DELETE FROM "recipe_tags""#);
    let delete_amounts = position(r#"DELETE FROM "ingredient_amounts""#);
    let insert_tags = position(r#"INSERT INTO "recipe_tags""#);
    let insert_amounts = position(r#"INSERT INTO "ingredient_amounts""#);
    assert!(delete_tags < insert_tags);
    assert!(delete_amounts < insert_amounts);
    assert!(delete_amounts < insert_tags);
}

#[tokio::test]
async fn should_report_missing_recipe_on_update() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<recipes::Model>::new()])
        .into_connection();
    let repo = DbRecipeRepository { db: db.clone() };
    let patch = RecipePatch {
        name: None,
        text: None,
        image: None,
        cooking_time: None,
        tag_ids: vec![4],
        ingredients: vec![],
    };

    let result = repo.update(5, &patch).await;

    assert!(matches!(result, Err(ApiError::RecipeNotFound)));
    let log = db.into_transaction_log();
    let sql: Vec<&str> = log[0].statements().iter().map(|s| s.sql.as_str()).collect();
    assert_eq!(sql.last(), Some(&"ROLLBACK"));
    assert!(!sql.iter().any(|s| s.starts_with("DELETE")));
}

// ── Recipes by author ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_cap_recipes_per_author_in_the_query() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![recipe_model(9, 1), recipe_model(8, 1), recipe_model(7, 2)]])
        .into_connection();
    let repo = DbRecipeRepository { db: db.clone() };

    let recipes = repo.list_by_authors(&[1, 2], Some(2)).await.unwrap();
    assert_eq!(recipes.len(), 3);

    let log = statements(db);
    assert_eq!(log.len(), 1);
    assert!(log[0].sql.contains("ROW_NUMBER() OVER"));
    assert!(log[0].sql.contains("PARTITION BY author_id"));
    let values = &log[0].values.as_ref().unwrap().0;
    assert_eq!(
        values,
        &vec![Value::Int(Some(1)), Value::Int(Some(2)), Value::BigInt(Some(2))]
    );
}

#[tokio::test]
async fn should_count_recipes_per_author() {
    let row = |author_id: i32, count: i64| {
        BTreeMap::from([
            ("author_id", Value::Int(Some(author_id))),
            ("recipes_count", Value::BigInt(Some(count))),
        ])
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row(1, 12), row(2, 1)]])
        .into_connection();
    let repo = DbRecipeRepository { db: db.clone() };

    let counts = repo.count_by_authors(&[1, 2, 3]).await.unwrap();

    assert_eq!(counts.get(&1), Some(&12));
    assert_eq!(counts.get(&2), Some(&1));
    assert_eq!(counts.get(&3), None);
    let log = statements(db);
    assert!(log[0].sql.contains("GROUP BY"));
}

#[tokio::test]
async fn should_skip_queries_for_no_authors() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = DbRecipeRepository { db: db.clone() };

    assert!(repo.list_by_authors(&[], Some(3)).await.unwrap().is_empty());
    assert!(repo.count_by_authors(&[]).await.unwrap().is_empty());
    assert!(statements(db).is_empty());
}
