use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use foodgram_auth_types::identity::{Identity, MaybeIdentity};
use foodgram_core::pagination::PageResponse;

use crate::domain::types::{Profile, User};
use crate::error::ApiError;
use crate::handlers::{PageQuery, RequestUrl};
use crate::state::AppState;
use crate::usecase::user::{
    GetMeUseCase, GetProfileUseCase, ListUsersUseCase, RegisterUserInput, RegisterUserUseCase,
    SetPasswordInput, SetPasswordUseCase,
};

/// Account fields returned on registration.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// A user as seen by the caller.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        let user = profile.user;
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed: profile.is_subscribed,
        }
    }
}

// ── POST /users ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let usecase = RegisterUserUseCase {
        repo: state.user_repo(),
    };
    let user = usecase
        .execute(RegisterUserInput {
            email: body.email,
            username: body.username,
            first_name: body.first_name,
            last_name: body.last_name,
            password: body.password,
        })
        .await?;
    tracing::info!(user_id = user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /users ───────────────────────────────────────────────────────────────

pub async fn list_users(
    identity: MaybeIdentity,
    url: RequestUrl,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<ProfileResponse>>, ApiError> {
    let usecase = ListUsersUseCase {
        repo: state.user_repo(),
    };
    let page = usecase
        .execute(identity.user_id(), query.page_request())
        .await?;
    Ok(Json(PageResponse::from_page(
        page.map(ProfileResponse::from),
        url.0.as_ref(),
    )))
}

// ── GET /users/{id} ──────────────────────────────────────────────────────────

pub async fn get_user(
    identity: MaybeIdentity,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let usecase = GetProfileUseCase {
        repo: state.user_repo(),
    };
    let profile = usecase.execute(id, identity.user_id()).await?;
    Ok(Json(profile.into()))
}

// ── GET /users/me ────────────────────────────────────────────────────────────

pub async fn get_me(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let usecase = GetMeUseCase {
        repo: state.user_repo(),
    };
    let profile = usecase.execute(identity.user_id).await?;
    Ok(Json(profile.into()))
}

// ── POST /users/set_password ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetPasswordRequest {
    pub new_password: String,
    pub current_password: String,
}

pub async fn set_password(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<SetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let usecase = SetPasswordUseCase {
        repo: state.user_repo(),
    };
    usecase
        .execute(
            identity.user_id,
            SetPasswordInput {
                current_password: body.current_password,
                new_password: body.new_password,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
