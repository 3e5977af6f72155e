use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use foodgram_auth_types::identity::TokenSecret;

use crate::infra::db::{
    DbFavoriteRepository, DbIngredientRepository, DbRecipeRepository, DbShoppingCartRepository,
    DbSubscriptionRepository, DbTagRepository, DbUserRepository,
};
use crate::infra::storage::FsImageStore;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub token_secret: TokenSecret,
    pub token_ttl_secs: u64,
    pub media_root: PathBuf,
    pub media_url: Arc<str>,
}

impl FromRef<AppState> for TokenSecret {
    fn from_ref(state: &AppState) -> Self {
        state.token_secret.clone()
    }
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn tag_repo(&self) -> DbTagRepository {
        DbTagRepository {
            db: self.db.clone(),
        }
    }

    pub fn ingredient_repo(&self) -> DbIngredientRepository {
        DbIngredientRepository {
            db: self.db.clone(),
        }
    }

    pub fn recipe_repo(&self) -> DbRecipeRepository {
        DbRecipeRepository {
            db: self.db.clone(),
        }
    }

    pub fn favorite_repo(&self) -> DbFavoriteRepository {
        DbFavoriteRepository {
            db: self.db.clone(),
        }
    }

    pub fn cart_repo(&self) -> DbShoppingCartRepository {
        DbShoppingCartRepository {
            db: self.db.clone(),
        }
    }

    pub fn subscription_repo(&self) -> DbSubscriptionRepository {
        DbSubscriptionRepository {
            db: self.db.clone(),
        }
    }

    pub fn image_store(&self) -> FsImageStore {
        FsImageStore {
            root: self.media_root.clone(),
        }
    }
}
