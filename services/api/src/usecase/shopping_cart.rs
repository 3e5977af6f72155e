use crate::domain::repository::ShoppingCartRepository;
use crate::domain::shopping_list::aggregate;
use crate::domain::types::ShoppingListItem;
use crate::error::ApiError;

// ── DownloadShoppingList ─────────────────────────────────────────────────────

pub struct DownloadShoppingListUseCase<C: ShoppingCartRepository> {
    pub cart: C,
}

impl<C: ShoppingCartRepository> DownloadShoppingListUseCase<C> {
    /// Cart ingredients summed per (name, unit), sorted by name then unit.
    pub async fn execute(&self, user_id: i32) -> Result<Vec<ShoppingListItem>, ApiError> {
        let lines = self.cart.cart_lines(user_id).await?;
        let items = aggregate(lines);
        tracing::debug!(user_id, items = items.len(), "shopping list aggregated");
        Ok(items)
    }
}
