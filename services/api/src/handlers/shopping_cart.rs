use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::response::Attachment;

use foodgram_auth_types::identity::Identity;

use crate::error::ApiError;
use crate::handlers::RequestUrl;
use crate::handlers::recipe::ShortRecipeResponse;
use crate::infra::pdf::render_shopping_list;
use crate::state::AppState;
use crate::usecase::collection::{AddToCollectionUseCase, RemoveFromCollectionUseCase};
use crate::usecase::shopping_cart::DownloadShoppingListUseCase;

pub const SHOPPING_LIST_FILENAME: &str = "shopping_cart.pdf";

// ── POST /recipes/{id}/shopping_cart ─────────────────────────────────────────

pub async fn add_to_cart(
    identity: Identity,
    url: RequestUrl,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<ShortRecipeResponse>), ApiError> {
    let usecase = AddToCollectionUseCase {
        recipes: state.recipe_repo(),
        collection: state.cart_repo(),
    };
    let recipe = usecase.execute(identity.user_id, id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ShortRecipeResponse::new(recipe, &url, &state.media_url)),
    ))
}

// ── DELETE /recipes/{id}/shopping_cart ───────────────────────────────────────

pub async fn remove_from_cart(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let usecase = RemoveFromCollectionUseCase {
        recipes: state.recipe_repo(),
        collection: state.cart_repo(),
    };
    usecase.execute(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /recipes/download_shopping_cart ──────────────────────────────────────

pub async fn download_shopping_cart(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Attachment<Vec<u8>>, ApiError> {
    let usecase = DownloadShoppingListUseCase {
        cart: state.cart_repo(),
    };
    let items = usecase.execute(identity.user_id).await?;
    let pdf = tokio::task::spawn_blocking(move || render_shopping_list(&items))
        .await
        .map_err(|e| ApiError::Internal(e.into()))??;
    Ok(Attachment::new(pdf)
        .filename(SHOPPING_LIST_FILENAME)
        .content_type("application/pdf"))
}
