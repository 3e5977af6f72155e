use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};

use foodgram_auth_types::identity::{Identity, MaybeIdentity};
use foodgram_core::pagination::PageResponse;
use foodgram_domain::pagination::PageRequest;

use crate::domain::types::{Recipe, RecipeDetail, RecipeIngredient};
use crate::error::ApiError;
use crate::handlers::RequestUrl;
use crate::handlers::tag::TagResponse;
use crate::handlers::user::ProfileResponse;
use crate::state::AppState;
use crate::usecase::recipe::{
    CreateRecipeUseCase, DeleteRecipeUseCase, GetRecipeUseCase, IngredientInput,
    ListRecipesQuery, ListRecipesUseCase, RecipeInput, UpdateRecipeUseCase,
};

#[derive(Debug, Serialize)]
pub struct RecipeIngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<RecipeIngredient> for RecipeIngredientResponse {
    fn from(item: RecipeIngredient) -> Self {
        Self {
            id: item.id,
            name: item.name,
            measurement_unit: item.measurement_unit,
            amount: item.amount,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: i32,
    pub tags: Vec<TagResponse>,
    pub author: ProfileResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: Option<String>,
    pub text: String,
    pub cooking_time: i32,
}

impl RecipeResponse {
    pub fn new(detail: RecipeDetail, url: &RequestUrl, media_url: &str) -> Self {
        let recipe = detail.recipe;
        Self {
            id: recipe.id,
            tags: detail.tags.into_iter().map(TagResponse::from).collect(),
            author: detail.author.into(),
            ingredients: detail
                .ingredients
                .into_iter()
                .map(RecipeIngredientResponse::from)
                .collect(),
            is_favorited: detail.is_favorited,
            is_in_shopping_cart: detail.is_in_shopping_cart,
            name: recipe.name,
            image: recipe.image.map(|path| url.image(media_url, &path)),
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// `{id, name, image, cooking_time}` for favorites, cart and subscriptions.
#[derive(Debug, Serialize)]
pub struct ShortRecipeResponse {
    pub id: i32,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i32,
}

impl ShortRecipeResponse {
    pub fn new(recipe: Recipe, url: &RequestUrl, media_url: &str) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image.map(|path| url.image(media_url, &path)),
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Deserialize)]
pub struct IngredientAmountRequest {
    pub id: i32,
    pub amount: i64,
}

#[derive(Deserialize)]
pub struct RecipeRequest {
    pub ingredients: Option<Vec<IngredientAmountRequest>>,
    pub tags: Option<Vec<i32>>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
}

impl From<RecipeRequest> for RecipeInput {
    fn from(body: RecipeRequest) -> Self {
        Self {
            name: body.name,
            text: body.text,
            image: body.image,
            cooking_time: body.cooking_time,
            tags: body.tags,
            ingredients: body.ingredients.map(|items| {
                items
                    .into_iter()
                    .map(|i| IngredientInput {
                        id: i.id,
                        amount: i.amount,
                    })
                    .collect()
            }),
        }
    }
}

// ── GET /recipes ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RecipeListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: Option<i32>,
    pub is_favorited: Option<u8>,
    pub is_in_shopping_cart: Option<u8>,
}

pub async fn list_recipes(
    identity: MaybeIdentity,
    url: RequestUrl,
    State(state): State<AppState>,
    Query(query): Query<RecipeListQuery>,
) -> Result<Json<PageResponse<RecipeResponse>>, ApiError> {
    let usecase = ListRecipesUseCase {
        repo: state.recipe_repo(),
    };
    let page = usecase
        .execute(
            ListRecipesQuery {
                tags: query.tags,
                author_id: query.author,
                is_favorited: query.is_favorited.is_some_and(|v| v != 0),
                is_in_shopping_cart: query.is_in_shopping_cart.is_some_and(|v| v != 0),
            },
            identity.user_id(),
            PageRequest::from_query(query.page, query.limit),
        )
        .await?;
    let page = page.map(|detail| RecipeResponse::new(detail, &url, &state.media_url));
    Ok(Json(PageResponse::from_page(page, url.0.as_ref())))
}

// ── GET /recipes/{id} ────────────────────────────────────────────────────────

pub async fn get_recipe(
    identity: MaybeIdentity,
    url: RequestUrl,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let usecase = GetRecipeUseCase {
        repo: state.recipe_repo(),
    };
    let detail = usecase.execute(id, identity.user_id()).await?;
    Ok(Json(RecipeResponse::new(detail, &url, &state.media_url)))
}

// ── POST /recipes ────────────────────────────────────────────────────────────

pub async fn create_recipe(
    identity: Identity,
    url: RequestUrl,
    State(state): State<AppState>,
    Json(body): Json<RecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>), ApiError> {
    let usecase = CreateRecipeUseCase {
        recipes: state.recipe_repo(),
        tags: state.tag_repo(),
        ingredients: state.ingredient_repo(),
        images: state.image_store(),
    };
    let detail = usecase.execute(identity.user_id, body.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecipeResponse::new(detail, &url, &state.media_url)),
    ))
}

// ── PATCH /recipes/{id} ──────────────────────────────────────────────────────

pub async fn update_recipe(
    identity: Identity,
    url: RequestUrl,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<RecipeRequest>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let usecase = UpdateRecipeUseCase {
        recipes: state.recipe_repo(),
        tags: state.tag_repo(),
        ingredients: state.ingredient_repo(),
        images: state.image_store(),
    };
    let detail = usecase.execute(&identity, id, body.into()).await?;
    Ok(Json(RecipeResponse::new(detail, &url, &state.media_url)))
}

// ── DELETE /recipes/{id} ─────────────────────────────────────────────────────

pub async fn delete_recipe(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteRecipeUseCase {
        recipes: state.recipe_repo(),
        images: state.image_store(),
    };
    usecase.execute(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
