use std::collections::{HashMap, HashSet};

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, SqlErr, Statement, TransactionError,
    TransactionTrait, Value,
    sea_query::{Expr, OnConflict, Query, SelectStatement},
};

use foodgram_api_schema::{
    favorites, ingredient_amounts, ingredients, recipe_tags, recipes, shopping_carts,
    subscriptions, tags, users,
};
use foodgram_core::sea_ext::{SelectPage, starts_with_ci};
use foodgram_domain::pagination::{PageRequest, Paginated};
use foodgram_domain::user::UserRole;

use crate::domain::repository::{
    IngredientRepository, RecipeCollectionRepository, RecipeRepository, ShoppingCartRepository,
    SubscriptionRepository, TagRepository, UserRepository,
};
use crate::domain::types::{
    CartLine, Collection, Ingredient, IngredientLine, NewUser, Profile, Recipe, RecipeDetail,
    RecipeDraft, RecipeFilter, RecipeIngredient, RecipePatch, Tag, User, UserCredentials,
};
use crate::error::ApiError;

// ── Shared lookups ───────────────────────────────────────────────────────────

/// Authors among `author_ids` that `viewer` follows.
async fn subscribed_authors(
    db: &DatabaseConnection,
    viewer: Option<i32>,
    author_ids: &[i32],
) -> Result<HashSet<i32>, DbErr> {
    let Some(viewer) = viewer else {
        return Ok(HashSet::new());
    };
    if author_ids.is_empty() {
        return Ok(HashSet::new());
    }
    let ids: Vec<i32> = subscriptions::Entity::find()
        .select_only()
        .column(subscriptions::Column::AuthorId)
        .filter(subscriptions::Column::UserId.eq(viewer))
        .filter(subscriptions::Column::AuthorId.is_in(author_ids.iter().copied()))
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids.into_iter().collect())
}

fn select_for_user(
    table: impl sea_orm::sea_query::IntoTableRef,
    column: impl sea_orm::sea_query::IntoColumnRef,
    user_filter: sea_orm::sea_query::SimpleExpr,
) -> SelectStatement {
    Query::select()
        .column(column)
        .from(table)
        .and_where(user_filter)
        .to_owned()
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        username: model.username,
        first_name: model.first_name,
        last_name: model.last_name,
        role: u8::try_from(model.role)
            .ok()
            .and_then(UserRole::from_u8)
            .unwrap_or(UserRole::User),
        created_at: model.created_at,
    }
}

fn credentials_from_model(model: users::Model) -> UserCredentials {
    let password_hash = model.password_hash.clone();
    UserCredentials {
        user: user_from_model(model),
        password_hash,
    }
}

fn tag_from_model(model: tags::Model) -> Tag {
    Tag {
        id: model.id,
        name: model.name,
        color: model.color,
        slug: model.slug,
    }
}

fn ingredient_from_model(model: ingredients::Model) -> Ingredient {
    Ingredient {
        id: model.id,
        name: model.name,
        measurement_unit: model.measurement_unit,
    }
}

fn recipe_from_model(model: recipes::Model) -> Recipe {
    Recipe {
        id: model.id,
        author_id: model.author_id,
        name: model.name,
        text: model.text,
        image: model.image,
        cooking_time: model.cooking_time,
        pub_date: model.pub_date,
    }
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

fn map_user_conflict(e: DbErr) -> ApiError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) if msg.contains("email") => {
            ApiError::EmailTaken
        }
        Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::UsernameTaken,
        _ => ApiError::Internal(anyhow::Error::new(e).context("create user")),
    }
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_profile(
        &self,
        id: i32,
        viewer: Option<i32>,
    ) -> Result<Option<Profile>, ApiError> {
        let Some(user) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let subscribed = subscribed_authors(&self.db, viewer, &[id])
            .await
            .context("load subscription flag")?;
        Ok(Some(Profile {
            is_subscribed: subscribed.contains(&id),
            user,
        }))
    }

    async fn list_profiles(
        &self,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<Paginated<Profile>, ApiError> {
        let page = page.clamped();
        let query = users::Entity::find().order_by_asc(users::Column::Id);
        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count users")?;
        let models = query
            .paged(page)
            .all(&self.db)
            .await
            .context("list users")?;
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let subscribed = subscribed_authors(&self.db, viewer, &ids)
            .await
            .context("load subscription flags")?;
        let items = models
            .into_iter()
            .map(|m| Profile {
                is_subscribed: subscribed.contains(&m.id),
                user: user_from_model(m),
            })
            .collect();
        Ok(Paginated::new(items, total, page))
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(credentials_from_model))
    }

    async fn find_credentials_by_id(
        &self,
        id: i32,
    ) -> Result<Option<UserCredentials>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user credentials")?;
        Ok(model.map(credentials_from_model))
    }

    async fn create(&self, user: &NewUser) -> Result<User, ApiError> {
        let model = users::ActiveModel {
            email: Set(user.email.clone()),
            username: Set(user.username.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            password_hash: Set(user.password_hash.clone()),
            role: Set(i16::from(UserRole::User.as_u8())),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(map_user_conflict)?;
        Ok(user_from_model(model))
    }

    async fn update_password_hash(&self, id: i32, password_hash: &str) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            password_hash: Set(password_hash.to_owned()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update password hash")?;
        Ok(())
    }
}

// ── Tag repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTagRepository {
    pub db: DatabaseConnection,
}

impl TagRepository for DbTagRepository {
    async fn list(&self) -> Result<Vec<Tag>, ApiError> {
        let models = tags::Entity::find()
            .order_by_asc(tags::Column::Name)
            .all(&self.db)
            .await
            .context("list tags")?;
        Ok(models.into_iter().map(tag_from_model).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, ApiError> {
        let model = tags::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find tag by id")?;
        Ok(model.map(tag_from_model))
    }

    async fn existing_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, ApiError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let found: Vec<i32> = tags::Entity::find()
            .select_only()
            .column(tags::Column::Id)
            .filter(tags::Column::Id.is_in(ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .context("check tag ids")?;
        Ok(found.into_iter().collect())
    }
}

// ── Ingredient repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbIngredientRepository {
    pub db: DatabaseConnection,
}

impl IngredientRepository for DbIngredientRepository {
    async fn list(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, ApiError> {
        let mut query = ingredients::Entity::find();
        if let Some(prefix) = name_prefix.filter(|p| !p.is_empty()) {
            query = query.filter(starts_with_ci(
                (ingredients::Entity, ingredients::Column::Name),
                prefix,
            ));
        }
        let models = query
            .order_by_asc(ingredients::Column::Name)
            .order_by_asc(ingredients::Column::Id)
            .all(&self.db)
            .await
            .context("list ingredients")?;
        Ok(models.into_iter().map(ingredient_from_model).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Ingredient>, ApiError> {
        let model = ingredients::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find ingredient by id")?;
        Ok(model.map(ingredient_from_model))
    }

    async fn existing_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, ApiError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let found: Vec<i32> = ingredients::Entity::find()
            .select_only()
            .column(ingredients::Column::Id)
            .filter(ingredients::Column::Id.is_in(ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .context("check ingredient ids")?;
        Ok(found.into_iter().collect())
    }
}

// ── Recipe repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRecipeRepository {
    pub db: DatabaseConnection,
}

async fn insert_links(
    txn: &DatabaseTransaction,
    recipe_id: i32,
    tag_ids: &[i32],
    lines: &[IngredientLine],
) -> Result<(), DbErr> {
    if !tag_ids.is_empty() {
        recipe_tags::Entity::insert_many(tag_ids.iter().map(|&tag_id| recipe_tags::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(tag_id),
        }))
        .exec_without_returning(txn)
        .await?;
    }
    if !lines.is_empty() {
        ingredient_amounts::Entity::insert_many(lines.iter().map(|line| {
            ingredient_amounts::ActiveModel {
                recipe_id: Set(recipe_id),
                ingredient_id: Set(line.ingredient_id),
                amount: Set(line.amount),
                ..Default::default()
            }
        }))
        .exec_without_returning(txn)
        .await?;
    }
    Ok(())
}

async fn delete_links(txn: &DatabaseTransaction, recipe_id: i32) -> Result<(), DbErr> {
    recipe_tags::Entity::delete_many()
        .filter(recipe_tags::Column::RecipeId.eq(recipe_id))
        .exec(txn)
        .await?;
    ingredient_amounts::Entity::delete_many()
        .filter(ingredient_amounts::Column::RecipeId.eq(recipe_id))
        .exec(txn)
        .await?;
    Ok(())
}

impl DbRecipeRepository {
    async fn marked_by(
        &self,
        collection: Collection,
        viewer: Option<i32>,
        recipe_ids: &[i32],
    ) -> Result<HashSet<i32>, DbErr> {
        let Some(viewer) = viewer else {
            return Ok(HashSet::new());
        };
        if recipe_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<i32> = match collection {
            Collection::Favorites => {
                favorites::Entity::find()
                    .select_only()
                    .column(favorites::Column::RecipeId)
                    .filter(favorites::Column::UserId.eq(viewer))
                    .filter(favorites::Column::RecipeId.is_in(recipe_ids.iter().copied()))
                    .into_tuple()
                    .all(&self.db)
                    .await?
            }
            Collection::ShoppingCart => {
                shopping_carts::Entity::find()
                    .select_only()
                    .column(shopping_carts::Column::RecipeId)
                    .filter(shopping_carts::Column::UserId.eq(viewer))
                    .filter(shopping_carts::Column::RecipeId.is_in(recipe_ids.iter().copied()))
                    .into_tuple()
                    .all(&self.db)
                    .await?
            }
        };
        Ok(ids.into_iter().collect())
    }
}

impl RecipeRepository for DbRecipeRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Recipe>, ApiError> {
        let model = recipes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find recipe by id")?;
        Ok(model.map(recipe_from_model))
    }

    async fn list(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Paginated<Recipe>, ApiError> {
        let page = page.clamped();
        let mut query = recipes::Entity::find();
        if let Some(author_id) = filter.author_id {
            query = query.filter(recipes::Column::AuthorId.eq(author_id));
        }
        if !filter.tags.is_empty() {
            let tagged = Query::select()
                .column((recipe_tags::Entity, recipe_tags::Column::RecipeId))
                .from(recipe_tags::Entity)
                .inner_join(
                    tags::Entity,
                    Expr::col((tags::Entity, tags::Column::Id))
                        .equals((recipe_tags::Entity, recipe_tags::Column::TagId)),
                )
                .and_where(
                    Expr::col((tags::Entity, tags::Column::Slug))
                        .is_in(filter.tags.iter().cloned()),
                )
                .to_owned();
            query = query.filter(recipes::Column::Id.in_subquery(tagged));
        }
        if let Some(user_id) = filter.favorited_by {
            query = query.filter(recipes::Column::Id.in_subquery(select_for_user(
                favorites::Entity,
                favorites::Column::RecipeId,
                favorites::Column::UserId.eq(user_id),
            )));
        }
        if let Some(user_id) = filter.in_cart_of {
            query = query.filter(recipes::Column::Id.in_subquery(select_for_user(
                shopping_carts::Entity,
                shopping_carts::Column::RecipeId,
                shopping_carts::Column::UserId.eq(user_id),
            )));
        }
        let query = query
            .order_by_desc(recipes::Column::PubDate)
            .order_by_desc(recipes::Column::Id);

        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count recipes")?;
        let models = query
            .paged(page)
            .all(&self.db)
            .await
            .context("list recipes")?;
        Ok(Paginated::new(
            models.into_iter().map(recipe_from_model).collect(),
            total,
            page,
        ))
    }

    async fn load_details(
        &self,
        recipes: Vec<Recipe>,
        viewer: Option<i32>,
    ) -> Result<Vec<RecipeDetail>, ApiError> {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }
        let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
        let mut author_ids: Vec<i32> = recipes.iter().map(|r| r.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<i32, User> = users::Entity::find()
            .filter(users::Column::Id.is_in(author_ids.iter().copied()))
            .all(&self.db)
            .await
            .context("load recipe authors")?
            .into_iter()
            .map(|m| (m.id, user_from_model(m)))
            .collect();
        let subscribed = subscribed_authors(&self.db, viewer, &author_ids)
            .await
            .context("load subscription flags")?;

        let mut tags_by_recipe: HashMap<i32, Vec<Tag>> = HashMap::new();
        let tag_rows = recipe_tags::Entity::find()
            .filter(recipe_tags::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .find_also_related(tags::Entity)
            .all(&self.db)
            .await
            .context("load recipe tags")?;
        for (link, tag) in tag_rows {
            if let Some(tag) = tag {
                tags_by_recipe
                    .entry(link.recipe_id)
                    .or_default()
                    .push(tag_from_model(tag));
            }
        }
        for tags in tags_by_recipe.values_mut() {
            tags.sort_by(|a, b| a.name.cmp(&b.name));
        }

        let mut ingredients_by_recipe: HashMap<i32, Vec<RecipeIngredient>> = HashMap::new();
        let amount_rows = ingredient_amounts::Entity::find()
            .filter(ingredient_amounts::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .order_by_asc(ingredient_amounts::Column::Id)
            .find_also_related(ingredients::Entity)
            .all(&self.db)
            .await
            .context("load recipe ingredients")?;
        for (amount, ingredient) in amount_rows {
            if let Some(ingredient) = ingredient {
                ingredients_by_recipe
                    .entry(amount.recipe_id)
                    .or_default()
                    .push(RecipeIngredient {
                        id: ingredient.id,
                        name: ingredient.name,
                        measurement_unit: ingredient.measurement_unit,
                        amount: amount.amount,
                    });
            }
        }

        let favorited = self
            .marked_by(Collection::Favorites, viewer, &recipe_ids)
            .await
            .context("load favorite flags")?;
        let in_cart = self
            .marked_by(Collection::ShoppingCart, viewer, &recipe_ids)
            .await
            .context("load shopping cart flags")?;

        recipes
            .into_iter()
            .map(|recipe| {
                let author = authors.get(&recipe.author_id).cloned().with_context(|| {
                    format!("author {} of recipe {} missing", recipe.author_id, recipe.id)
                })?;
                Ok(RecipeDetail {
                    author: Profile {
                        is_subscribed: subscribed.contains(&author.id),
                        user: author,
                    },
                    tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
                    ingredients: ingredients_by_recipe.remove(&recipe.id).unwrap_or_default(),
                    is_favorited: favorited.contains(&recipe.id),
                    is_in_shopping_cart: in_cart.contains(&recipe.id),
                    recipe,
                })
            })
            .collect()
    }

    async fn list_by_authors(
        &self,
        author_ids: &[i32],
        per_author: Option<u64>,
    ) -> Result<Vec<Recipe>, ApiError> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }
        let Some(limit) = per_author else {
            let models = recipes::Entity::find()
                .filter(recipes::Column::AuthorId.is_in(author_ids.iter().copied()))
                .order_by_desc(recipes::Column::PubDate)
                .order_by_desc(recipes::Column::Id)
                .all(&self.db)
                .await
                .context("list recipes by authors")?;
            return Ok(models.into_iter().map(recipe_from_model).collect());
        };

        let placeholders: Vec<String> = (1..=author_ids.len()).map(|i| format!("${i}")).collect();
        let sql = format!(
            r#"
            SELECT id, author_id, name, text, image, cooking_time, pub_date FROM (
                SELECT recipes.*, ROW_NUMBER() OVER (
                    PARTITION BY author_id ORDER BY pub_date DESC, id DESC
                ) AS author_rank
                FROM recipes
                WHERE author_id IN ({})
            ) AS ranked
            WHERE author_rank <= ${}
            ORDER BY pub_date DESC, id DESC
            "#,
            placeholders.join(", "),
            author_ids.len() + 1,
        );
        let mut values: Vec<Value> = author_ids.iter().map(|&id| id.into()).collect();
        values.push(i64::try_from(limit).unwrap_or(i64::MAX).into());

        let models = recipes::Model::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            &sql,
            values,
        ))
        .all(&self.db)
        .await
        .context("list newest recipes per author")?;
        Ok(models.into_iter().map(recipe_from_model).collect())
    }

    async fn count_by_authors(&self, author_ids: &[i32]) -> Result<HashMap<i32, u64>, ApiError> {
        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(i32, i64)> = recipes::Entity::find()
            .select_only()
            .column(recipes::Column::AuthorId)
            .column_as(recipes::Column::Id.count(), "recipes_count")
            .filter(recipes::Column::AuthorId.is_in(author_ids.iter().copied()))
            .group_by(recipes::Column::AuthorId)
            .into_tuple()
            .all(&self.db)
            .await
            .context("count recipes by authors")?;
        Ok(rows
            .into_iter()
            .map(|(author_id, count)| (author_id, count.max(0) as u64))
            .collect())
    }

    async fn create(&self, author_id: i32, draft: &RecipeDraft) -> Result<Recipe, ApiError> {
        let model = self
            .db
            .transaction::<_, recipes::Model, DbErr>(|txn| {
                let draft = draft.clone();
                Box::pin(async move {
                    let recipe = recipes::ActiveModel {
                        author_id: Set(author_id),
                        name: Set(draft.name),
                        text: Set(draft.text),
                        image: Set(draft.image),
                        cooking_time: Set(draft.cooking_time),
                        pub_date: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    insert_links(txn, recipe.id, &draft.tag_ids, &draft.ingredients).await?;
                    Ok(recipe)
                })
            })
            .await
            .context("create recipe")?;
        Ok(recipe_from_model(model))
    }

    async fn update(&self, id: i32, patch: &RecipePatch) -> Result<Recipe, ApiError> {
        let result = self
            .db
            .transaction::<_, recipes::Model, DbErr>(|txn| {
                let patch = patch.clone();
                Box::pin(async move {
                    let existing = recipes::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| DbErr::RecordNotFound(format!("recipe {id}")))?;
                    let mut active: recipes::ActiveModel = existing.clone().into();
                    if let Some(name) = patch.name {
                        active.name = Set(name);
                    }
                    if let Some(text) = patch.text {
                        active.text = Set(text);
                    }
                    if let Some(image) = patch.image {
                        active.image = Set(Some(image));
                    }
                    if let Some(cooking_time) = patch.cooking_time {
                        active.cooking_time = Set(cooking_time);
                    }
                    let recipe = if active.is_changed() {
                        active.update(txn).await?
                    } else {
                        existing
                    };
                    delete_links(txn, id).await?;
                    insert_links(txn, id, &patch.tag_ids, &patch.ingredients).await?;
                    Ok(recipe)
                })
            })
            .await;
        match result {
            Ok(model) => Ok(recipe_from_model(model)),
            Err(TransactionError::Transaction(DbErr::RecordNotFound(_))) => {
                Err(ApiError::RecipeNotFound)
            }
            Err(e) => Err(anyhow::Error::new(e).context("update recipe").into()),
        }
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let result = recipes::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete recipe")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Favorite repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbFavoriteRepository {
    pub db: DatabaseConnection,
}

impl RecipeCollectionRepository for DbFavoriteRepository {
    const COLLECTION: Collection = Collection::Favorites;

    async fn add(&self, user_id: i32, recipe_id: i32) -> Result<bool, ApiError> {
        let inserted = favorites::Entity::insert(favorites::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
        })
        .on_conflict(
            OnConflict::columns([favorites::Column::UserId, favorites::Column::RecipeId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("add favorite")?;
        Ok(inserted > 0)
    }

    async fn remove(&self, user_id: i32, recipe_id: i32) -> Result<bool, ApiError> {
        let result = favorites::Entity::delete_many()
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(favorites::Column::RecipeId.eq(recipe_id))
            .exec(&self.db)
            .await
            .context("remove favorite")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Shopping cart repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbShoppingCartRepository {
    pub db: DatabaseConnection,
}

impl RecipeCollectionRepository for DbShoppingCartRepository {
    const COLLECTION: Collection = Collection::ShoppingCart;

    async fn add(&self, user_id: i32, recipe_id: i32) -> Result<bool, ApiError> {
        let inserted = shopping_carts::Entity::insert(shopping_carts::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
        })
        .on_conflict(
            OnConflict::columns([
                shopping_carts::Column::UserId,
                shopping_carts::Column::RecipeId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("add to shopping cart")?;
        Ok(inserted > 0)
    }

    async fn remove(&self, user_id: i32, recipe_id: i32) -> Result<bool, ApiError> {
        let result = shopping_carts::Entity::delete_many()
            .filter(shopping_carts::Column::UserId.eq(user_id))
            .filter(shopping_carts::Column::RecipeId.eq(recipe_id))
            .exec(&self.db)
            .await
            .context("remove from shopping cart")?;
        Ok(result.rows_affected > 0)
    }
}

impl ShoppingCartRepository for DbShoppingCartRepository {
    async fn cart_lines(&self, user_id: i32) -> Result<Vec<CartLine>, ApiError> {
        let rows: Vec<(String, String, i32)> = ingredient_amounts::Entity::find()
            .select_only()
            .column(ingredients::Column::Name)
            .column(ingredients::Column::MeasurementUnit)
            .column(ingredient_amounts::Column::Amount)
            .join(
                JoinType::InnerJoin,
                ingredient_amounts::Relation::Ingredient.def(),
            )
            .filter(
                ingredient_amounts::Column::RecipeId.in_subquery(select_for_user(
                    shopping_carts::Entity,
                    shopping_carts::Column::RecipeId,
                    shopping_carts::Column::UserId.eq(user_id),
                )),
            )
            .into_tuple()
            .all(&self.db)
            .await
            .context("load shopping cart lines")?;
        Ok(rows
            .into_iter()
            .map(|(name, measurement_unit, amount)| CartLine {
                name,
                measurement_unit,
                amount,
            })
            .collect())
    }
}

// ── Subscription repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSubscriptionRepository {
    pub db: DatabaseConnection,
}

impl SubscriptionRepository for DbSubscriptionRepository {
    async fn subscribe(&self, user_id: i32, author_id: i32) -> Result<bool, ApiError> {
        let inserted = subscriptions::Entity::insert(subscriptions::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
        })
        .on_conflict(
            OnConflict::columns([
                subscriptions::Column::UserId,
                subscriptions::Column::AuthorId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("subscribe")?;
        Ok(inserted > 0)
    }

    async fn unsubscribe(&self, user_id: i32, author_id: i32) -> Result<bool, ApiError> {
        let result = subscriptions::Entity::delete_many()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::AuthorId.eq(author_id))
            .exec(&self.db)
            .await
            .context("unsubscribe")?;
        Ok(result.rows_affected > 0)
    }

    async fn list_authors(
        &self,
        user_id: i32,
        page: PageRequest,
    ) -> Result<Paginated<User>, ApiError> {
        let page = page.clamped();
        let query = users::Entity::find()
            .filter(users::Column::Id.in_subquery(select_for_user(
                subscriptions::Entity,
                subscriptions::Column::AuthorId,
                subscriptions::Column::UserId.eq(user_id),
            )))
            .order_by_asc(users::Column::Id);
        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count subscriptions")?;
        let models = query
            .paged(page)
            .all(&self.db)
            .await
            .context("list subscriptions")?;
        Ok(Paginated::new(
            models.into_iter().map(user_from_model).collect(),
            total,
            page,
        ))
    }
}
