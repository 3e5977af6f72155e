use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{TimeZone, Utc};

use foodgram_api::domain::image::DecodedImage;
use foodgram_api::domain::repository::{
    ImageStore, IngredientRepository, RecipeCollectionRepository, RecipeRepository,
    ShoppingCartRepository, SubscriptionRepository, TagRepository, UserRepository,
};
use foodgram_api::domain::types::{
    CartLine, Collection, Ingredient, IngredientLine, NewUser, Profile, Recipe, RecipeDetail,
    RecipeDraft, RecipeFilter, RecipeIngredient, RecipePatch, Tag, User, UserCredentials,
};
use foodgram_api::error::ApiError;
use foodgram_domain::pagination::{PageRequest, Paginated};
use foodgram_domain::user::UserRole;

// 1x1 transparent GIF
pub const GIF_DATA_URI: &str =
    "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

pub fn paginate<T>(items: Vec<T>, page: PageRequest) -> Paginated<T> {
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    Paginated::new(items, total, page)
}

// ── MemoryStore ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct Data {
    pub users: Vec<UserCredentials>,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
    pub recipes: Vec<Recipe>,
    pub recipe_tags: Vec<(i32, i32)>,
    pub recipe_ingredients: Vec<(i32, IngredientLine)>,
    pub favorites: HashSet<(i32, i32)>,
    pub carts: HashSet<(i32, i32)>,
    pub subscriptions: HashSet<(i32, i32)>,
    pub saved_images: Vec<String>,
    pub removed_images: Vec<String>,
    /// Make recipe create/update fail after validation passed.
    pub fail_recipe_writes: bool,
    clock: i64,
}

impl Data {
    fn next_timestamp(&mut self) -> chrono::DateTime<Utc> {
        self.clock += 60;
        Utc.timestamp_opt(1_700_000_000 + self.clock, 0).unwrap()
    }

    fn profile(&self, user: &User, viewer: Option<i32>) -> Profile {
        Profile {
            user: user.clone(),
            is_subscribed: viewer.is_some_and(|v| self.subscriptions.contains(&(v, user.id))),
        }
    }

    fn replace_links(&mut self, recipe_id: i32, tag_ids: &[i32], lines: &[IngredientLine]) {
        self.recipe_tags.retain(|(r, _)| *r != recipe_id);
        self.recipe_ingredients.retain(|(r, _)| *r != recipe_id);
        self.recipe_tags
            .extend(tag_ids.iter().map(|t| (recipe_id, *t)));
        self.recipe_ingredients
            .extend(lines.iter().map(|l| (recipe_id, *l)));
    }
}

/// In-memory backing for every repository trait. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<Data>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> MutexGuard<'_, Data> {
        self.data.lock().unwrap()
    }

    pub fn favorites(&self) -> MemoryFavorites {
        MemoryFavorites(self.clone())
    }

    pub fn cart(&self) -> MemoryCart {
        MemoryCart(self.clone())
    }

    pub fn seed_user(&self, username: &str, role: UserRole, password_hash: &str) -> User {
        let mut data = self.data();
        let user = User {
            id: data.users.len() as i32 + 1,
            email: format!("{username}@example.com"),
            username: username.to_owned(),
            first_name: "Test".into(),
            last_name: "User".into(),
            role,
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        data.users.push(UserCredentials {
            user: user.clone(),
            password_hash: password_hash.to_owned(),
        });
        user
    }

    pub fn with_user(&self, username: &str) -> User {
        self.seed_user(username, UserRole::User, "unused")
    }

    pub fn with_admin(&self, username: &str) -> User {
        self.seed_user(username, UserRole::Admin, "unused")
    }

    pub fn with_tag(&self, name: &str, slug: &str) -> Tag {
        let mut data = self.data();
        let tag = Tag {
            id: data.tags.len() as i32 + 1,
            name: name.to_owned(),
            color: format!("#{:06X}", data.tags.len() * 0x111),
            slug: slug.to_owned(),
        };
        data.tags.push(tag.clone());
        tag
    }

    pub fn with_ingredient(&self, name: &str, unit: &str) -> Ingredient {
        let mut data = self.data();
        let ingredient = Ingredient {
            id: data.ingredients.len() as i32 + 1,
            name: name.to_owned(),
            measurement_unit: unit.to_owned(),
        };
        data.ingredients.push(ingredient.clone());
        ingredient
    }

    /// Insert a recipe with `(ingredient_id, amount)` lines.
    pub fn with_recipe(
        &self,
        author_id: i32,
        name: &str,
        tag_ids: &[i32],
        lines: &[(i32, i32)],
    ) -> Recipe {
        let mut data = self.data();
        let id = data.recipes.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let recipe = Recipe {
            id,
            author_id,
            name: name.to_owned(),
            text: format!("How to cook {name}"),
            image: Some(format!("recipes/seed-{id}.gif")),
            cooking_time: 30,
            pub_date: data.next_timestamp(),
        };
        data.recipes.push(recipe.clone());
        let lines: Vec<IngredientLine> = lines
            .iter()
            .map(|(ingredient_id, amount)| IngredientLine {
                ingredient_id: *ingredient_id,
                amount: *amount,
            })
            .collect();
        data.replace_links(id, tag_ids, &lines);
        recipe
    }
}

impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, ApiError> {
        let data = self.data();
        Ok(data
            .users
            .iter()
            .find(|c| c.user.id == id)
            .map(|c| c.user.clone()))
    }

    async fn find_profile(
        &self,
        id: i32,
        viewer: Option<i32>,
    ) -> Result<Option<Profile>, ApiError> {
        let data = self.data();
        Ok(data
            .users
            .iter()
            .find(|c| c.user.id == id)
            .map(|c| data.profile(&c.user, viewer)))
    }

    async fn list_profiles(
        &self,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<Paginated<Profile>, ApiError> {
        let data = self.data();
        let mut users: Vec<&User> = data.users.iter().map(|c| &c.user).collect();
        users.sort_by_key(|u| u.id);
        let profiles = users.into_iter().map(|u| data.profile(u, viewer)).collect();
        Ok(paginate(profiles, page))
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, ApiError> {
        let data = self.data();
        Ok(data.users.iter().find(|c| c.user.email == email).cloned())
    }

    async fn find_credentials_by_id(
        &self,
        id: i32,
    ) -> Result<Option<UserCredentials>, ApiError> {
        let data = self.data();
        Ok(data.users.iter().find(|c| c.user.id == id).cloned())
    }

    async fn create(&self, new: &NewUser) -> Result<User, ApiError> {
        if self
            .data()
            .users
            .iter()
            .any(|c| c.user.email == new.email)
        {
            return Err(ApiError::EmailTaken);
        }
        if self
            .data()
            .users
            .iter()
            .any(|c| c.user.username == new.username)
        {
            return Err(ApiError::UsernameTaken);
        }
        Ok(self.seed_user(&new.username, UserRole::User, &new.password_hash))
    }

    async fn update_password_hash(&self, id: i32, password_hash: &str) -> Result<(), ApiError> {
        let mut data = self.data();
        if let Some(c) = data.users.iter_mut().find(|c| c.user.id == id) {
            c.password_hash = password_hash.to_owned();
        }
        Ok(())
    }
}

impl TagRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Tag>, ApiError> {
        let mut tags = self.data().tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, ApiError> {
        Ok(self.data().tags.iter().find(|t| t.id == id).cloned())
    }

    async fn existing_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, ApiError> {
        let data = self.data();
        Ok(data
            .tags
            .iter()
            .map(|t| t.id)
            .filter(|id| ids.contains(id))
            .collect())
    }
}

impl IngredientRepository for MemoryStore {
    async fn list(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, ApiError> {
        let prefix = name_prefix.map(str::to_lowercase);
        let mut items: Vec<Ingredient> = self
            .data()
            .ingredients
            .iter()
            .filter(|i| {
                prefix
                    .as_deref()
                    .is_none_or(|p| i.name.to_lowercase().starts_with(p))
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Ingredient>, ApiError> {
        Ok(self.data().ingredients.iter().find(|i| i.id == id).cloned())
    }

    async fn existing_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, ApiError> {
        let data = self.data();
        Ok(data
            .ingredients
            .iter()
            .map(|i| i.id)
            .filter(|id| ids.contains(id))
            .collect())
    }
}

fn newest_first(recipes: &mut [Recipe]) {
    recipes.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
}

impl RecipeRepository for MemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Recipe>, ApiError> {
        Ok(self.data().recipes.iter().find(|r| r.id == id).cloned())
    }

    async fn list(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Paginated<Recipe>, ApiError> {
        let data = self.data();
        let tag_ids: HashSet<i32> = data
            .tags
            .iter()
            .filter(|t| filter.tags.contains(&t.slug))
            .map(|t| t.id)
            .collect();
        let mut matched: Vec<Recipe> = data
            .recipes
            .iter()
            .filter(|r| {
                filter.tags.is_empty()
                    || data
                        .recipe_tags
                        .iter()
                        .any(|(rid, tid)| *rid == r.id && tag_ids.contains(tid))
            })
            .filter(|r| filter.author_id.is_none_or(|a| r.author_id == a))
            .filter(|r| {
                filter
                    .favorited_by
                    .is_none_or(|u| data.favorites.contains(&(u, r.id)))
            })
            .filter(|r| {
                filter
                    .in_cart_of
                    .is_none_or(|u| data.carts.contains(&(u, r.id)))
            })
            .cloned()
            .collect();
        newest_first(&mut matched);
        Ok(paginate(matched, page))
    }

    async fn load_details(
        &self,
        recipes: Vec<Recipe>,
        viewer: Option<i32>,
    ) -> Result<Vec<RecipeDetail>, ApiError> {
        let data = self.data();
        recipes
            .into_iter()
            .map(|recipe| {
                let author = data
                    .users
                    .iter()
                    .find(|c| c.user.id == recipe.author_id)
                    .map(|c| data.profile(&c.user, viewer))
                    .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("dangling author")))?;
                let mut tags: Vec<Tag> = data
                    .recipe_tags
                    .iter()
                    .filter(|(rid, _)| *rid == recipe.id)
                    .filter_map(|(_, tid)| data.tags.iter().find(|t| t.id == *tid).cloned())
                    .collect();
                tags.sort_by(|a, b| a.name.cmp(&b.name));
                let ingredients = data
                    .recipe_ingredients
                    .iter()
                    .filter(|(rid, _)| *rid == recipe.id)
                    .filter_map(|(_, line)| {
                        data.ingredients
                            .iter()
                            .find(|i| i.id == line.ingredient_id)
                            .map(|i| RecipeIngredient {
                                id: i.id,
                                name: i.name.clone(),
                                measurement_unit: i.measurement_unit.clone(),
                                amount: line.amount,
                            })
                    })
                    .collect();
                let is_favorited =
                    viewer.is_some_and(|v| data.favorites.contains(&(v, recipe.id)));
                let is_in_shopping_cart =
                    viewer.is_some_and(|v| data.carts.contains(&(v, recipe.id)));
                Ok(RecipeDetail {
                    recipe,
                    author,
                    tags,
                    ingredients,
                    is_favorited,
                    is_in_shopping_cart,
                })
            })
            .collect()
    }

    async fn list_by_authors(
        &self,
        author_ids: &[i32],
        per_author: Option<u64>,
    ) -> Result<Vec<Recipe>, ApiError> {
        let mut recipes: Vec<Recipe> = self
            .data()
            .recipes
            .iter()
            .filter(|r| author_ids.contains(&r.author_id))
            .cloned()
            .collect();
        newest_first(&mut recipes);
        if let Some(limit) = per_author {
            let mut taken: HashMap<i32, u64> = HashMap::new();
            recipes.retain(|r| {
                let n = taken.entry(r.author_id).or_default();
                *n += 1;
                *n <= limit
            });
        }
        Ok(recipes)
    }

    async fn count_by_authors(&self, author_ids: &[i32]) -> Result<HashMap<i32, u64>, ApiError> {
        let mut counts = HashMap::new();
        for recipe in &self.data().recipes {
            if author_ids.contains(&recipe.author_id) {
                *counts.entry(recipe.author_id).or_default() += 1;
            }
        }
        Ok(counts)
    }

    async fn create(&self, author_id: i32, draft: &RecipeDraft) -> Result<Recipe, ApiError> {
        let mut data = self.data();
        if data.fail_recipe_writes {
            return Err(ApiError::Internal(anyhow::anyhow!("write failed")));
        }
        let id = data.recipes.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let recipe = Recipe {
            id,
            author_id,
            name: draft.name.clone(),
            text: draft.text.clone(),
            image: draft.image.clone(),
            cooking_time: draft.cooking_time,
            pub_date: data.next_timestamp(),
        };
        data.recipes.push(recipe.clone());
        data.replace_links(id, &draft.tag_ids, &draft.ingredients);
        Ok(recipe)
    }

    async fn update(&self, id: i32, patch: &RecipePatch) -> Result<Recipe, ApiError> {
        let mut data = self.data();
        if data.fail_recipe_writes {
            return Err(ApiError::Internal(anyhow::anyhow!("write failed")));
        }
        let recipe = data
            .recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ApiError::RecipeNotFound)?;
        if let Some(name) = &patch.name {
            recipe.name = name.clone();
        }
        if let Some(text) = &patch.text {
            recipe.text = text.clone();
        }
        if let Some(image) = &patch.image {
            recipe.image = Some(image.clone());
        }
        if let Some(cooking_time) = patch.cooking_time {
            recipe.cooking_time = cooking_time;
        }
        let updated = recipe.clone();
        data.replace_links(id, &patch.tag_ids, &patch.ingredients);
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let mut data = self.data();
        let before = data.recipes.len();
        data.recipes.retain(|r| r.id != id);
        if data.recipes.len() == before {
            return Ok(false);
        }
        data.replace_links(id, &[], &[]);
        data.favorites.retain(|(_, r)| *r != id);
        data.carts.retain(|(_, r)| *r != id);
        Ok(true)
    }
}

impl ShoppingCartRepository for MemoryStore {
    async fn cart_lines(&self, user_id: i32) -> Result<Vec<CartLine>, ApiError> {
        let data = self.data();
        Ok(data
            .recipe_ingredients
            .iter()
            .filter(|(rid, _)| data.carts.contains(&(user_id, *rid)))
            .filter_map(|(_, line)| {
                data.ingredients
                    .iter()
                    .find(|i| i.id == line.ingredient_id)
                    .map(|i| CartLine {
                        name: i.name.clone(),
                        measurement_unit: i.measurement_unit.clone(),
                        amount: line.amount,
                    })
            })
            .collect())
    }
}

impl SubscriptionRepository for MemoryStore {
    async fn subscribe(&self, user_id: i32, author_id: i32) -> Result<bool, ApiError> {
        Ok(self.data().subscriptions.insert((user_id, author_id)))
    }

    async fn unsubscribe(&self, user_id: i32, author_id: i32) -> Result<bool, ApiError> {
        Ok(self.data().subscriptions.remove(&(user_id, author_id)))
    }

    async fn list_authors(
        &self,
        user_id: i32,
        page: PageRequest,
    ) -> Result<Paginated<User>, ApiError> {
        let data = self.data();
        let mut authors: Vec<User> = data
            .users
            .iter()
            .filter(|c| data.subscriptions.contains(&(user_id, c.user.id)))
            .map(|c| c.user.clone())
            .collect();
        authors.sort_by_key(|u| u.id);
        Ok(paginate(authors, page))
    }
}

impl ImageStore for MemoryStore {
    async fn save(&self, image: &DecodedImage) -> Result<String, ApiError> {
        let mut data = self.data();
        let path = format!(
            "recipes/upload-{}.{}",
            data.saved_images.len() + 1,
            image.extension
        );
        data.saved_images.push(path.clone());
        Ok(path)
    }

    async fn remove(&self, path: &str) -> Result<(), ApiError> {
        self.data().removed_images.push(path.to_owned());
        Ok(())
    }
}

// ── Collections ──────────────────────────────────────────────────────────────

pub struct MemoryFavorites(pub MemoryStore);

impl RecipeCollectionRepository for MemoryFavorites {
    const COLLECTION: Collection = Collection::Favorites;

    async fn add(&self, user_id: i32, recipe_id: i32) -> Result<bool, ApiError> {
        Ok(self.0.data().favorites.insert((user_id, recipe_id)))
    }

    async fn remove(&self, user_id: i32, recipe_id: i32) -> Result<bool, ApiError> {
        Ok(self.0.data().favorites.remove(&(user_id, recipe_id)))
    }
}

pub struct MemoryCart(pub MemoryStore);

impl RecipeCollectionRepository for MemoryCart {
    const COLLECTION: Collection = Collection::ShoppingCart;

    async fn add(&self, user_id: i32, recipe_id: i32) -> Result<bool, ApiError> {
        Ok(self.0.data().carts.insert((user_id, recipe_id)))
    }

    async fn remove(&self, user_id: i32, recipe_id: i32) -> Result<bool, ApiError> {
        Ok(self.0.data().carts.remove(&(user_id, recipe_id)))
    }
}
