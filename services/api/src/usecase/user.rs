use foodgram_domain::pagination::{PageRequest, Paginated};
use foodgram_domain::user::{
    EMAIL_MAX_LEN, PASSWORD_MIN_LEN, PERSON_NAME_MAX_LEN, USERNAME_MAX_LEN, validate_email,
    validate_password, validate_person_name, validate_username,
};

use crate::domain::repository::UserRepository;
use crate::domain::types::{NewUser, Profile, User};
use crate::error::ApiError;
use crate::infra::password::{hash_password, verify_password};

// ── RegisterUser ─────────────────────────────────────────────────────────────

pub struct RegisterUserInput {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

pub struct RegisterUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> RegisterUserUseCase<R> {
    pub async fn execute(&self, input: RegisterUserInput) -> Result<User, ApiError> {
        let email = input.email.trim().to_owned();
        let username = input.username.trim().to_owned();
        if !validate_email(&email) {
            return Err(ApiError::validation(format!(
                "email must be a valid address of at most {EMAIL_MAX_LEN} characters"
            )));
        }
        if !validate_username(&username) {
            return Err(ApiError::validation(format!(
                "username must be 1-{USERNAME_MAX_LEN} letters, digits or .@+-_ and not \"me\""
            )));
        }
        if !validate_person_name(&input.first_name) || !validate_person_name(&input.last_name) {
            return Err(ApiError::validation(format!(
                "first_name and last_name must be 1-{PERSON_NAME_MAX_LEN} characters"
            )));
        }
        if !validate_password(&input.password) {
            return Err(ApiError::validation(format!(
                "password must be at least {PASSWORD_MIN_LEN} characters"
            )));
        }
        let password_hash = hash_password(input.password).await?;
        self.repo
            .create(&NewUser {
                email,
                username,
                first_name: input.first_name.trim().to_owned(),
                last_name: input.last_name.trim().to_owned(),
                password_hash,
            })
            .await
    }
}

// ── GetProfile ───────────────────────────────────────────────────────────────

pub struct GetProfileUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> GetProfileUseCase<R> {
    pub async fn execute(&self, id: i32, viewer: Option<i32>) -> Result<Profile, ApiError> {
        self.repo
            .find_profile(id, viewer)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

// ── GetMe ────────────────────────────────────────────────────────────────────

pub struct GetMeUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> GetMeUseCase<R> {
    /// A valid token for a deleted account is treated as unauthenticated.
    pub async fn execute(&self, user_id: i32) -> Result<Profile, ApiError> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::Unauthorized)?;
        Ok(Profile {
            user,
            is_subscribed: false,
        })
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> ListUsersUseCase<R> {
    pub async fn execute(
        &self,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<Paginated<Profile>, ApiError> {
        self.repo.list_profiles(viewer, page.clamped()).await
    }
}

// ── SetPassword ──────────────────────────────────────────────────────────────

pub struct SetPasswordInput {
    pub current_password: String,
    pub new_password: String,
}

pub struct SetPasswordUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> SetPasswordUseCase<R> {
    pub async fn execute(&self, user_id: i32, input: SetPasswordInput) -> Result<(), ApiError> {
        let credentials = self
            .repo
            .find_credentials_by_id(user_id)
            .await?
            .ok_or(ApiError::Unauthorized)?;
        if !verify_password(input.current_password, credentials.password_hash).await? {
            return Err(ApiError::InvalidPassword);
        }
        if !validate_password(&input.new_password) {
            return Err(ApiError::validation(format!(
                "password must be at least {PASSWORD_MIN_LEN} characters"
            )));
        }
        let password_hash = hash_password(input.new_password).await?;
        self.repo.update_password_hash(user_id, &password_hash).await?;
        tracing::info!(user_id, "password changed");
        Ok(())
    }
}
