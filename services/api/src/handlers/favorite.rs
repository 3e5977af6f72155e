use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use foodgram_auth_types::identity::Identity;

use crate::error::ApiError;
use crate::handlers::RequestUrl;
use crate::handlers::recipe::ShortRecipeResponse;
use crate::state::AppState;
use crate::usecase::collection::{AddToCollectionUseCase, RemoveFromCollectionUseCase};

// ── POST /recipes/{id}/favorite ──────────────────────────────────────────────

pub async fn add_favorite(
    identity: Identity,
    url: RequestUrl,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<ShortRecipeResponse>), ApiError> {
    let usecase = AddToCollectionUseCase {
        recipes: state.recipe_repo(),
        collection: state.favorite_repo(),
    };
    let recipe = usecase.execute(identity.user_id, id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ShortRecipeResponse::new(recipe, &url, &state.media_url)),
    ))
}

// ── DELETE /recipes/{id}/favorite ────────────────────────────────────────────

pub async fn remove_favorite(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let usecase = RemoveFromCollectionUseCase {
        recipes: state.recipe_repo(),
        collection: state.favorite_repo(),
    };
    usecase.execute(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
