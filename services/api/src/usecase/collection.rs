//! Favorites and shopping cart share one add/remove flow.

use crate::domain::repository::{RecipeCollectionRepository, RecipeRepository};
use crate::domain::types::{Collection, Recipe};
use crate::error::ApiError;

fn already_marked(collection: Collection) -> ApiError {
    match collection {
        Collection::Favorites => ApiError::AlreadyFavorited,
        Collection::ShoppingCart => ApiError::AlreadyInShoppingCart,
    }
}

fn not_marked(collection: Collection) -> ApiError {
    match collection {
        Collection::Favorites => ApiError::NotFavorited,
        Collection::ShoppingCart => ApiError::NotInShoppingCart,
    }
}

// ── AddToCollection ──────────────────────────────────────────────────────────

pub struct AddToCollectionUseCase<R: RecipeRepository, C: RecipeCollectionRepository> {
    pub recipes: R,
    pub collection: C,
}

impl<R: RecipeRepository, C: RecipeCollectionRepository> AddToCollectionUseCase<R, C> {
    /// Returns the recipe for the short representation.
    pub async fn execute(&self, user_id: i32, recipe_id: i32) -> Result<Recipe, ApiError> {
        let recipe = self
            .recipes
            .find_by_id(recipe_id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;
        if !self.collection.add(user_id, recipe_id).await? {
            return Err(already_marked(C::COLLECTION));
        }
        tracing::debug!(user_id, recipe_id, collection = ?C::COLLECTION, "recipe marked");
        Ok(recipe)
    }
}

// ── RemoveFromCollection ─────────────────────────────────────────────────────

pub struct RemoveFromCollectionUseCase<R: RecipeRepository, C: RecipeCollectionRepository> {
    pub recipes: R,
    pub collection: C,
}

impl<R: RecipeRepository, C: RecipeCollectionRepository> RemoveFromCollectionUseCase<R, C> {
    pub async fn execute(&self, user_id: i32, recipe_id: i32) -> Result<(), ApiError> {
        if self.recipes.find_by_id(recipe_id).await?.is_none() {
            return Err(ApiError::RecipeNotFound);
        }
        if !self.collection.remove(user_id, recipe_id).await? {
            return Err(not_marked(C::COLLECTION));
        }
        Ok(())
    }
}
