use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use foodgram_core::error::error_response;

/// API error variants. Rendered as `{"kind", "message"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("user not found")]
    UserNotFound,
    #[error("recipe not found")]
    RecipeNotFound,
    #[error("tag not found")]
    TagNotFound,
    #[error("ingredient not found")]
    IngredientNotFound,
    #[error("{0}")]
    Validation(String),
    #[error("ingredient {0} does not exist")]
    UnknownIngredient(i32),
    #[error("tag {0} does not exist")]
    UnknownTag(i32),
    #[error("image must be a base64 data URI of a png, jpg, jpeg, gif or webp file")]
    InvalidImage,
    #[error("a user with this email already exists")]
    EmailTaken,
    #[error("a user with this username already exists")]
    UsernameTaken,
    #[error("unable to log in with provided credentials")]
    InvalidCredentials,
    #[error("current password is incorrect")]
    InvalidPassword,
    #[error("recipe is already in favorites")]
    AlreadyFavorited,
    #[error("recipe is not in favorites")]
    NotFavorited,
    #[error("recipe is already in the shopping cart")]
    AlreadyInShoppingCart,
    #[error("recipe is not in the shopping cart")]
    NotInShoppingCart,
    #[error("you cannot subscribe to yourself")]
    SelfSubscription,
    #[error("already subscribed to this author")]
    AlreadySubscribed,
    #[error("not subscribed to this author")]
    NotSubscribed,
    #[error("authentication credentials were not provided or are invalid")]
    Unauthorized,
    #[error("you do not have permission to perform this action")]
    Forbidden,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::RecipeNotFound => "RECIPE_NOT_FOUND",
            Self::TagNotFound => "TAG_NOT_FOUND",
            Self::IngredientNotFound => "INGREDIENT_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::UnknownIngredient(_) => "UNKNOWN_INGREDIENT",
            Self::UnknownTag(_) => "UNKNOWN_TAG",
            Self::InvalidImage => "INVALID_IMAGE",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::AlreadyFavorited => "ALREADY_FAVORITED",
            Self::NotFavorited => "NOT_FAVORITED",
            Self::AlreadyInShoppingCart => "ALREADY_IN_SHOPPING_CART",
            Self::NotInShoppingCart => "NOT_IN_SHOPPING_CART",
            Self::SelfSubscription => "SELF_SUBSCRIPTION",
            Self::AlreadySubscribed => "ALREADY_SUBSCRIBED",
            Self::NotSubscribed => "NOT_SUBSCRIBED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound
            | Self::RecipeNotFound
            | Self::TagNotFound
            | Self::IngredientNotFound => StatusCode::NOT_FOUND,
            Self::Validation(_)
            | Self::UnknownIngredient(_)
            | Self::UnknownTag(_)
            | Self::InvalidImage
            | Self::EmailTaken
            | Self::UsernameTaken
            | Self::InvalidCredentials
            | Self::InvalidPassword
            | Self::AlreadyFavorited
            | Self::NotFavorited
            | Self::AlreadyInShoppingCart
            | Self::NotInShoppingCart
            | Self::SelfSubscription
            | Self::AlreadySubscribed
            | Self::NotSubscribed => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        error_response(status, self.kind(), self.to_string())
    }
}
