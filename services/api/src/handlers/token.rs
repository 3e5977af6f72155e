use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use foodgram_auth_types::identity::Identity;

use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::token::{LoginInput, LoginUseCase};

// ── POST /auth/token/login ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub auth_token: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        jwt_secret: state.token_secret.0.to_string(),
        ttl_secs: state.token_ttl_secs,
    };
    let output = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(Json(LoginResponse {
        auth_token: output.auth_token,
    }))
}

// ── POST /auth/token/logout ──────────────────────────────────────────────────

/// Tokens are stateless; the client discards its copy.
pub async fn logout(identity: Identity) -> StatusCode {
    tracing::debug!(user_id = identity.user_id, "logout");
    StatusCode::NO_CONTENT
}
