use std::collections::HashMap;

use foodgram_domain::pagination::{PageRequest, Paginated};

use crate::domain::repository::{RecipeRepository, SubscriptionRepository, UserRepository};
use crate::domain::types::{Profile, Recipe, Subscription, User};
use crate::error::ApiError;

/// Group recipes by author, keeping repository order. Counts cover every
/// recipe an author has, not only the loaded ones.
fn build_subscriptions(
    authors: Vec<User>,
    recipes: Vec<Recipe>,
    counts: &HashMap<i32, u64>,
) -> Vec<Subscription> {
    let mut by_author: HashMap<i32, Vec<Recipe>> = HashMap::new();
    for recipe in recipes {
        by_author.entry(recipe.author_id).or_default().push(recipe);
    }
    authors
        .into_iter()
        .map(|user| Subscription {
            recipes: by_author.remove(&user.id).unwrap_or_default(),
            recipes_count: counts.get(&user.id).copied().unwrap_or(0),
            author: Profile {
                user,
                is_subscribed: true,
            },
        })
        .collect()
}

/// Recipes shown per author, capped by `recipes_limit`, plus full counts.
async fn author_recipes<R: RecipeRepository>(
    recipes: &R,
    author_ids: &[i32],
    recipes_limit: Option<usize>,
) -> Result<(Vec<Recipe>, HashMap<i32, u64>), ApiError> {
    if author_ids.is_empty() {
        return Ok((Vec::new(), HashMap::new()));
    }
    let per_author = recipes_limit.map(|n| n as u64);
    let shown = recipes.list_by_authors(author_ids, per_author).await?;
    let counts = recipes.count_by_authors(author_ids).await?;
    Ok((shown, counts))
}

// ── Subscribe ────────────────────────────────────────────────────────────────

pub struct SubscribeUseCase<U, S, R>
where
    U: UserRepository,
    S: SubscriptionRepository,
    R: RecipeRepository,
{
    pub users: U,
    pub subscriptions: S,
    pub recipes: R,
}

impl<U, S, R> SubscribeUseCase<U, S, R>
where
    U: UserRepository,
    S: SubscriptionRepository,
    R: RecipeRepository,
{
    pub async fn execute(
        &self,
        user_id: i32,
        author_id: i32,
        recipes_limit: Option<usize>,
    ) -> Result<Subscription, ApiError> {
        if user_id == author_id {
            return Err(ApiError::SelfSubscription);
        }
        let author = self
            .users
            .find_by_id(author_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        if !self.subscriptions.subscribe(user_id, author_id).await? {
            return Err(ApiError::AlreadySubscribed);
        }
        tracing::debug!(user_id, author_id, "subscribed");
        let (recipes, counts) = author_recipes(&self.recipes, &[author_id], recipes_limit).await?;
        build_subscriptions(vec![author], recipes, &counts)
            .pop()
            .ok_or(ApiError::UserNotFound)
    }
}

// ── Unsubscribe ──────────────────────────────────────────────────────────────

pub struct UnsubscribeUseCase<U: UserRepository, S: SubscriptionRepository> {
    pub users: U,
    pub subscriptions: S,
}

impl<U: UserRepository, S: SubscriptionRepository> UnsubscribeUseCase<U, S> {
    pub async fn execute(&self, user_id: i32, author_id: i32) -> Result<(), ApiError> {
        if self.users.find_by_id(author_id).await?.is_none() {
            return Err(ApiError::UserNotFound);
        }
        if !self.subscriptions.unsubscribe(user_id, author_id).await? {
            return Err(ApiError::NotSubscribed);
        }
        Ok(())
    }
}

// ── ListSubscriptions ────────────────────────────────────────────────────────

pub struct ListSubscriptionsUseCase<S: SubscriptionRepository, R: RecipeRepository> {
    pub subscriptions: S,
    pub recipes: R,
}

impl<S: SubscriptionRepository, R: RecipeRepository> ListSubscriptionsUseCase<S, R> {
    pub async fn execute(
        &self,
        user_id: i32,
        page: PageRequest,
        recipes_limit: Option<usize>,
    ) -> Result<Paginated<Subscription>, ApiError> {
        let Paginated { items, total, page } = self
            .subscriptions
            .list_authors(user_id, page.clamped())
            .await?;
        let author_ids: Vec<i32> = items.iter().map(|u| u.id).collect();
        let (recipes, counts) = author_recipes(&self.recipes, &author_ids, recipes_limit).await?;
        Ok(Paginated::new(
            build_subscriptions(items, recipes, &counts),
            total,
            page,
        ))
    }
}
