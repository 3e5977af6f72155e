pub mod collection;
pub mod ingredient;
pub mod recipe;
pub mod shopping_cart;
pub mod subscription;
pub mod tag;
pub mod token;
pub mod user;
