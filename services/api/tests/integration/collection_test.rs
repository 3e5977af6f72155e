use foodgram_api::error::ApiError;
use foodgram_api::usecase::collection::{AddToCollectionUseCase, RemoveFromCollectionUseCase};

use crate::helpers::MemoryStore;

fn seeded() -> (MemoryStore, i32, i32) {
    let store = MemoryStore::new();
    let author = store.with_user("author");
    let reader = store.with_user("reader");
    let recipe = store.with_recipe(author.id, "Pancakes", &[], &[]);
    (store, reader.id, recipe.id)
}

// ── Favorites ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_add_favorite_and_return_recipe() {
    let (store, reader, recipe_id) = seeded();
    let usecase = AddToCollectionUseCase {
        recipes: store.clone(),
        collection: store.favorites(),
    };

    let recipe = usecase.execute(reader, recipe_id).await.unwrap();

    assert_eq!(recipe.id, recipe_id);
    assert!(store.data().favorites.contains(&(reader, recipe_id)));
}

#[tokio::test]
async fn should_reject_second_favorite_of_same_recipe() {
    let (store, reader, recipe_id) = seeded();
    let usecase = AddToCollectionUseCase {
        recipes: store.clone(),
        collection: store.favorites(),
    };
    usecase.execute(reader, recipe_id).await.unwrap();

    let result = usecase.execute(reader, recipe_id).await;

    assert!(
        matches!(result, Err(ApiError::AlreadyFavorited)),
        "expected AlreadyFavorited, got {result:?}"
    );
}

#[tokio::test]
async fn should_return_recipe_not_found_when_favoriting_missing_recipe() {
    let (store, reader, _) = seeded();
    let usecase = AddToCollectionUseCase {
        recipes: store.clone(),
        collection: store.favorites(),
    };

    let result = usecase.execute(reader, 999).await;

    assert!(matches!(result, Err(ApiError::RecipeNotFound)));
    assert!(store.data().favorites.is_empty());
}

#[tokio::test]
async fn should_reject_removing_recipe_that_is_not_favorited() {
    let (store, reader, recipe_id) = seeded();
    let usecase = RemoveFromCollectionUseCase {
        recipes: store.clone(),
        collection: store.favorites(),
    };

    let result = usecase.execute(reader, recipe_id).await;

    assert!(matches!(result, Err(ApiError::NotFavorited)));
}

#[tokio::test]
async fn should_remove_favorite() {
    let (store, reader, recipe_id) = seeded();
    store.data().favorites.insert((reader, recipe_id));
    let usecase = RemoveFromCollectionUseCase {
        recipes: store.clone(),
        collection: store.favorites(),
    };

    usecase.execute(reader, recipe_id).await.unwrap();

    assert!(store.data().favorites.is_empty());
}

// ── Shopping cart ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_second_cart_entry_with_cart_kind() {
    let (store, reader, recipe_id) = seeded();
    let usecase = AddToCollectionUseCase {
        recipes: store.clone(),
        collection: store.cart(),
    };
    usecase.execute(reader, recipe_id).await.unwrap();

    let result = usecase.execute(reader, recipe_id).await;

    assert!(matches!(result, Err(ApiError::AlreadyInShoppingCart)));
    assert!(store.data().favorites.is_empty());
}

#[tokio::test]
async fn should_reject_removing_recipe_not_in_cart() {
    let (store, reader, recipe_id) = seeded();
    let usecase = RemoveFromCollectionUseCase {
        recipes: store.clone(),
        collection: store.cart(),
    };

    let result = usecase.execute(reader, recipe_id).await;

    assert!(matches!(result, Err(ApiError::NotInShoppingCart)));
}

#[tokio::test]
async fn should_check_recipe_before_removing_from_cart() {
    let (store, reader, _) = seeded();
    let usecase = RemoveFromCollectionUseCase {
        recipes: store.clone(),
        collection: store.cart(),
    };

    let result = usecase.execute(reader, 999).await;

    assert!(matches!(result, Err(ApiError::RecipeNotFound)));
}
