use foodgram_auth_types::token::issue_access_token;

use crate::domain::repository::UserRepository;
use crate::error::ApiError;
use crate::infra::password::{verify_password, verify_unknown_user};

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user_id: i32,
    pub auth_token: String,
    pub expires_at: u64,
}

pub struct LoginUseCase<R: UserRepository> {
    pub users: R,
    pub jwt_secret: String,
    pub ttl_secs: u64,
}

impl<R: UserRepository> LoginUseCase<R> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, ApiError> {
        let found = self
            .users
            .find_credentials_by_email(input.email.trim())
            .await?;
        let Some(credentials) = found else {
            verify_unknown_user(input.password).await?;
            return Err(ApiError::InvalidCredentials);
        };
        if !verify_password(input.password, credentials.password_hash).await? {
            return Err(ApiError::InvalidCredentials);
        }
        let user = credentials.user;
        let (auth_token, expires_at) =
            issue_access_token(user.id, user.role, &self.jwt_secret, self.ttl_secs)
                .map_err(|e| ApiError::Internal(e.into()))?;
        tracing::info!(user_id = user.id, "issued access token");
        Ok(LoginOutput {
            user_id: user.id,
            auth_token,
            expires_at,
        })
    }
}
