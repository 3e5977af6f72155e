use std::collections::HashSet;

use foodgram_auth_types::identity::Identity;
use foodgram_domain::pagination::{PageRequest, Paginated};
use foodgram_domain::recipe::{
    MAX_VALUE, MIN_VALUE, RECIPE_NAME_MAX_LEN, bounded_value, validate_recipe_name,
};

use crate::domain::image::parse_data_uri;
use crate::domain::repository::{
    ImageStore, IngredientRepository, RecipeRepository, TagRepository,
};
use crate::domain::types::{
    IngredientLine, Recipe, RecipeDetail, RecipeDraft, RecipeFilter, RecipePatch,
};
use crate::error::ApiError;

/// One `{id, amount}` entry of a write payload.
#[derive(Debug, Clone, Copy)]
pub struct IngredientInput {
    pub id: i32,
    pub amount: i64,
}

/// Raw recipe write payload. Required fields are checked per operation.
#[derive(Debug, Clone, Default)]
pub struct RecipeInput {
    pub name: Option<String>,
    pub text: Option<String>,
    pub image: Option<String>,
    pub cooking_time: Option<i64>,
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<IngredientInput>>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::validation(format!("{field} is required")))
}

fn check_name(name: String) -> Result<String, ApiError> {
    if !validate_recipe_name(&name) {
        return Err(ApiError::validation(format!(
            "name must be 1-{RECIPE_NAME_MAX_LEN} characters"
        )));
    }
    Ok(name.trim().to_owned())
}

fn check_text(text: String) -> Result<String, ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::validation("text must not be empty"));
    }
    Ok(text)
}

fn check_cooking_time(value: i64) -> Result<i32, ApiError> {
    bounded_value(value).map_err(|_| {
        ApiError::validation(format!(
            "cooking_time must be between {MIN_VALUE} and {MAX_VALUE}"
        ))
    })
}

fn check_tags(tags: Vec<i32>) -> Result<Vec<i32>, ApiError> {
    if tags.is_empty() {
        return Err(ApiError::validation("at least one tag is required"));
    }
    let mut seen = HashSet::with_capacity(tags.len());
    if !tags.iter().all(|id| seen.insert(*id)) {
        return Err(ApiError::validation("tags must not repeat"));
    }
    Ok(tags)
}

fn check_ingredients(ingredients: Vec<IngredientInput>) -> Result<Vec<IngredientLine>, ApiError> {
    if ingredients.is_empty() {
        return Err(ApiError::validation("at least one ingredient is required"));
    }
    let mut seen = HashSet::with_capacity(ingredients.len());
    ingredients
        .into_iter()
        .map(|input| {
            if !seen.insert(input.id) {
                return Err(ApiError::validation("ingredients must not repeat"));
            }
            let amount = bounded_value(input.amount).map_err(|_| {
                ApiError::validation(format!(
                    "amount must be between {MIN_VALUE} and {MAX_VALUE}"
                ))
            })?;
            Ok(IngredientLine {
                ingredient_id: input.id,
                amount,
            })
        })
        .collect()
}

/// Reject the first tag or ingredient id (in payload order) that does not exist.
async fn ensure_references<T: TagRepository, I: IngredientRepository>(
    tags: &T,
    ingredients: &I,
    tag_ids: &[i32],
    lines: &[IngredientLine],
) -> Result<(), ApiError> {
    let known_tags = tags.existing_ids(tag_ids).await?;
    if let Some(id) = tag_ids.iter().find(|id| !known_tags.contains(id)) {
        return Err(ApiError::UnknownTag(*id));
    }
    let ingredient_ids: Vec<i32> = lines.iter().map(|l| l.ingredient_id).collect();
    let known_ingredients = ingredients.existing_ids(&ingredient_ids).await?;
    if let Some(id) = ingredient_ids
        .iter()
        .find(|id| !known_ingredients.contains(id))
    {
        return Err(ApiError::UnknownIngredient(*id));
    }
    Ok(())
}

async fn discard_image<S: ImageStore>(images: &S, path: &str) {
    if let Err(e) = images.remove(path).await {
        tracing::warn!(error = ?e, path, "failed to remove recipe image");
    }
}

async fn single_detail<R: RecipeRepository>(
    repo: &R,
    recipe: Recipe,
    viewer: Option<i32>,
) -> Result<RecipeDetail, ApiError> {
    repo.load_details(vec![recipe], viewer)
        .await?
        .into_iter()
        .next()
        .ok_or(ApiError::RecipeNotFound)
}

fn ensure_can_modify(identity: &Identity, recipe: &Recipe) -> Result<(), ApiError> {
    if recipe.author_id == identity.user_id || identity.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

// ── CreateRecipe ─────────────────────────────────────────────────────────────

pub struct CreateRecipeUseCase<R, T, I, S>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    S: ImageStore,
{
    pub recipes: R,
    pub tags: T,
    pub ingredients: I,
    pub images: S,
}

impl<R, T, I, S> CreateRecipeUseCase<R, T, I, S>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    S: ImageStore,
{
    pub async fn execute(
        &self,
        author_id: i32,
        input: RecipeInput,
    ) -> Result<RecipeDetail, ApiError> {
        let tag_ids = check_tags(required(input.tags, "tags")?)?;
        let lines = check_ingredients(required(input.ingredients, "ingredients")?)?;
        let name = check_name(required(input.name, "name")?)?;
        let text = check_text(required(input.text, "text")?)?;
        let cooking_time = check_cooking_time(required(input.cooking_time, "cooking_time")?)?;
        let image = input.image.as_deref().map(parse_data_uri).transpose()?;
        ensure_references(&self.tags, &self.ingredients, &tag_ids, &lines).await?;

        let path = match &image {
            Some(image) => Some(self.images.save(image).await?),
            None => None,
        };
        let draft = RecipeDraft {
            name,
            text,
            image: path,
            cooking_time,
            tag_ids,
            ingredients: lines,
        };
        let recipe = match self.recipes.create(author_id, &draft).await {
            Ok(recipe) => recipe,
            Err(e) => {
                if let Some(path) = &draft.image {
                    discard_image(&self.images, path).await;
                }
                return Err(e);
            }
        };
        tracing::info!(recipe_id = recipe.id, author_id, "recipe created");
        single_detail(&self.recipes, recipe, Some(author_id)).await
    }
}

// ── UpdateRecipe ─────────────────────────────────────────────────────────────

pub struct UpdateRecipeUseCase<R, T, I, S>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    S: ImageStore,
{
    pub recipes: R,
    pub tags: T,
    pub ingredients: I,
    pub images: S,
}

impl<R, T, I, S> UpdateRecipeUseCase<R, T, I, S>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    S: ImageStore,
{
    /// Tags and ingredients are required and replace the stored sets.
    pub async fn execute(
        &self,
        identity: &Identity,
        recipe_id: i32,
        input: RecipeInput,
    ) -> Result<RecipeDetail, ApiError> {
        let current = self
            .recipes
            .find_by_id(recipe_id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;
        ensure_can_modify(identity, &current)?;

        let tag_ids = check_tags(required(input.tags, "tags")?)?;
        let lines = check_ingredients(required(input.ingredients, "ingredients")?)?;
        let name = input.name.map(check_name).transpose()?;
        let text = input.text.map(check_text).transpose()?;
        let cooking_time = input.cooking_time.map(check_cooking_time).transpose()?;
        let image = input.image.as_deref().map(parse_data_uri).transpose()?;
        ensure_references(&self.tags, &self.ingredients, &tag_ids, &lines).await?;

        let new_path = match &image {
            Some(image) => Some(self.images.save(image).await?),
            None => None,
        };
        let patch = RecipePatch {
            name,
            text,
            image: new_path.clone(),
            cooking_time,
            tag_ids,
            ingredients: lines,
        };
        let updated = match self.recipes.update(recipe_id, &patch).await {
            Ok(recipe) => recipe,
            Err(e) => {
                if let Some(path) = &new_path {
                    discard_image(&self.images, path).await;
                }
                return Err(e);
            }
        };
        if new_path.is_some() {
            if let Some(old) = &current.image {
                discard_image(&self.images, old).await;
            }
        }
        tracing::info!(recipe_id, user_id = identity.user_id, "recipe updated");
        single_detail(&self.recipes, updated, Some(identity.user_id)).await
    }
}

// ── DeleteRecipe ─────────────────────────────────────────────────────────────

pub struct DeleteRecipeUseCase<R: RecipeRepository, S: ImageStore> {
    pub recipes: R,
    pub images: S,
}

impl<R: RecipeRepository, S: ImageStore> DeleteRecipeUseCase<R, S> {
    pub async fn execute(&self, identity: &Identity, recipe_id: i32) -> Result<(), ApiError> {
        let recipe = self
            .recipes
            .find_by_id(recipe_id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;
        ensure_can_modify(identity, &recipe)?;
        if !self.recipes.delete(recipe_id).await? {
            return Err(ApiError::RecipeNotFound);
        }
        if let Some(path) = &recipe.image {
            discard_image(&self.images, path).await;
        }
        tracing::info!(recipe_id, user_id = identity.user_id, "recipe deleted");
        Ok(())
    }
}

// ── GetRecipe ────────────────────────────────────────────────────────────────

pub struct GetRecipeUseCase<R: RecipeRepository> {
    pub repo: R,
}

impl<R: RecipeRepository> GetRecipeUseCase<R> {
    pub async fn execute(&self, id: i32, viewer: Option<i32>) -> Result<RecipeDetail, ApiError> {
        let recipe = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;
        single_detail(&self.repo, recipe, viewer).await
    }
}

// ── ListRecipes ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ListRecipesQuery {
    pub tags: Vec<String>,
    pub author_id: Option<i32>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

pub struct ListRecipesUseCase<R: RecipeRepository> {
    pub repo: R,
}

impl<R: RecipeRepository> ListRecipesUseCase<R> {
    /// `is_favorited` / `is_in_shopping_cart` yield an empty page for anonymous viewers.
    pub async fn execute(
        &self,
        query: ListRecipesQuery,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<Paginated<RecipeDetail>, ApiError> {
        let page = page.clamped();
        let needs_viewer = query.is_favorited || query.is_in_shopping_cart;
        if needs_viewer && viewer.is_none() {
            return Ok(Paginated::empty(page));
        }
        let filter = RecipeFilter {
            tags: query.tags,
            author_id: query.author_id,
            favorited_by: viewer.filter(|_| query.is_favorited),
            in_cart_of: viewer.filter(|_| query.is_in_shopping_cart),
        };
        let Paginated { items, total, page } = self.repo.list(&filter, page).await?;
        let details = self.repo.load_details(items, viewer).await?;
        Ok(Paginated::new(details, total, page))
    }
}
