use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use foodgram_auth_types::identity::Identity;
use foodgram_core::pagination::PageResponse;
use foodgram_domain::pagination::PageRequest;

use crate::domain::types::Subscription;
use crate::error::ApiError;
use crate::handlers::RequestUrl;
use crate::handlers::recipe::ShortRecipeResponse;
use crate::state::AppState;
use crate::usecase::subscription::{
    ListSubscriptionsUseCase, SubscribeUseCase, UnsubscribeUseCase,
};

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<ShortRecipeResponse>,
    pub recipes_count: u64,
}

impl SubscriptionResponse {
    pub fn new(subscription: Subscription, url: &RequestUrl, media_url: &str) -> Self {
        let user = subscription.author.user;
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed: subscription.author.is_subscribed,
            recipes: subscription
                .recipes
                .into_iter()
                .map(|r| ShortRecipeResponse::new(r, url, media_url))
                .collect(),
            recipes_count: subscription.recipes_count,
        }
    }
}

#[derive(Deserialize)]
pub struct RecipesLimitQuery {
    pub recipes_limit: Option<usize>,
}

// ── GET /users/subscriptions ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SubscriptionListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub recipes_limit: Option<usize>,
}

pub async fn list_subscriptions(
    identity: Identity,
    url: RequestUrl,
    State(state): State<AppState>,
    Query(query): Query<SubscriptionListQuery>,
) -> Result<Json<PageResponse<SubscriptionResponse>>, ApiError> {
    let usecase = ListSubscriptionsUseCase {
        subscriptions: state.subscription_repo(),
        recipes: state.recipe_repo(),
    };
    let page = usecase
        .execute(
            identity.user_id,
            PageRequest::from_query(query.page, query.limit),
            query.recipes_limit,
        )
        .await?;
    let page = page.map(|s| SubscriptionResponse::new(s, &url, &state.media_url));
    Ok(Json(PageResponse::from_page(page, url.0.as_ref())))
}

// ── POST /users/{id}/subscribe ───────────────────────────────────────────────

pub async fn subscribe(
    identity: Identity,
    url: RequestUrl,
    State(state): State<AppState>,
    Path(author_id): Path<i32>,
    Query(query): Query<RecipesLimitQuery>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    let usecase = SubscribeUseCase {
        users: state.user_repo(),
        subscriptions: state.subscription_repo(),
        recipes: state.recipe_repo(),
    };
    let subscription = usecase
        .execute(identity.user_id, author_id, query.recipes_limit)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse::new(
            subscription,
            &url,
            &state.media_url,
        )),
    ))
}

// ── DELETE /users/{id}/subscribe ─────────────────────────────────────────────

pub async fn unsubscribe(
    identity: Identity,
    State(state): State<AppState>,
    Path(author_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let usecase = UnsubscribeUseCase {
        users: state.user_repo(),
        subscriptions: state.subscription_repo(),
    };
    usecase.execute(identity.user_id, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
