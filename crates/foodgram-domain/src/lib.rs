//! Domain types shared across Foodgram crates.
//!
//! Pure types and validation rules with no framework dependencies. Any layer
//! may import them; framework types never flow back into this crate.

pub mod pagination;
pub mod recipe;
pub mod tag;
pub mod user;
