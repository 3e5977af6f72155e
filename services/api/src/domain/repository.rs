#![allow(async_fn_in_trait)]

use std::collections::{HashMap, HashSet};

use foodgram_domain::pagination::{PageRequest, Paginated};

use crate::domain::image::DecodedImage;
use crate::domain::types::{
    CartLine, Collection, Ingredient, NewUser, Profile, Recipe, RecipeDetail, RecipeDraft,
    RecipeFilter, RecipePatch, Tag, User, UserCredentials,
};
use crate::error::ApiError;

/// Repository for accounts and public profiles.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, ApiError>;

    /// Profile with `is_subscribed` computed for `viewer` (false when anonymous).
    async fn find_profile(
        &self,
        id: i32,
        viewer: Option<i32>,
    ) -> Result<Option<Profile>, ApiError>;

    /// Users ordered by id.
    async fn list_profiles(
        &self,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<Paginated<Profile>, ApiError>;

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, ApiError>;

    async fn find_credentials_by_id(&self, id: i32)
    -> Result<Option<UserCredentials>, ApiError>;

    /// Insert a user. Unique conflicts surface as `EmailTaken` / `UsernameTaken`.
    async fn create(&self, user: &NewUser) -> Result<User, ApiError>;

    async fn update_password_hash(&self, id: i32, password_hash: &str) -> Result<(), ApiError>;
}

/// Read-only tag catalogue.
pub trait TagRepository: Send + Sync {
    /// All tags ordered by name.
    async fn list(&self) -> Result<Vec<Tag>, ApiError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, ApiError>;
    /// Subset of `ids` that exist.
    async fn existing_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, ApiError>;
}

/// Read-only ingredient catalogue.
pub trait IngredientRepository: Send + Sync {
    /// Ingredients ordered by name, optionally filtered by a case-insensitive name prefix.
    async fn list(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, ApiError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Ingredient>, ApiError>;
    /// Subset of `ids` that exist.
    async fn existing_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, ApiError>;
}

pub trait RecipeRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Recipe>, ApiError>;

    /// Recipes matching `filter`, newest first.
    async fn list(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Paginated<Recipe>, ApiError>;

    /// Attach author, tags, ingredients and viewer flags. Output keeps input order.
    async fn load_details(
        &self,
        recipes: Vec<Recipe>,
        viewer: Option<i32>,
    ) -> Result<Vec<RecipeDetail>, ApiError>;

    /// Up to `per_author` newest recipes of each author (all when `None`),
    /// newest first.
    async fn list_by_authors(
        &self,
        author_ids: &[i32],
        per_author: Option<u64>,
    ) -> Result<Vec<Recipe>, ApiError>;

    /// Total recipes per author. Authors without recipes are absent.
    async fn count_by_authors(&self, author_ids: &[i32]) -> Result<HashMap<i32, u64>, ApiError>;

    /// Insert recipe, tag links and ingredient amounts in one transaction.
    async fn create(&self, author_id: i32, draft: &RecipeDraft) -> Result<Recipe, ApiError>;

    /// Update columns and replace tag links and ingredient amounts in one transaction.
    async fn update(&self, id: i32, patch: &RecipePatch) -> Result<Recipe, ApiError>;

    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: i32) -> Result<bool, ApiError>;
}

/// A per-user set of recipes (favorites or shopping cart).
pub trait RecipeCollectionRepository: Send + Sync {
    const COLLECTION: Collection;

    /// Returns `false` when the pair already exists.
    async fn add(&self, user_id: i32, recipe_id: i32) -> Result<bool, ApiError>;

    /// Returns `true` if a row was deleted.
    async fn remove(&self, user_id: i32, recipe_id: i32) -> Result<bool, ApiError>;
}

pub trait ShoppingCartRepository: Send + Sync {
    /// Ingredient amounts of every recipe in the user's cart, unaggregated.
    async fn cart_lines(&self, user_id: i32) -> Result<Vec<CartLine>, ApiError>;
}

pub trait SubscriptionRepository: Send + Sync {
    /// Returns `false` when already subscribed.
    async fn subscribe(&self, user_id: i32, author_id: i32) -> Result<bool, ApiError>;

    /// Returns `true` if a row was deleted.
    async fn unsubscribe(&self, user_id: i32, author_id: i32) -> Result<bool, ApiError>;

    /// Authors the user follows, ordered by author id.
    async fn list_authors(
        &self,
        user_id: i32,
        page: PageRequest,
    ) -> Result<Paginated<User>, ApiError>;
}

/// Storage for uploaded recipe images.
pub trait ImageStore: Send + Sync {
    /// Persist the image, returning its path relative to the media root.
    async fn save(&self, image: &DecodedImage) -> Result<String, ApiError>;

    async fn remove(&self, path: &str) -> Result<(), ApiError>;
}
