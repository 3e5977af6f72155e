//! Web plumbing shared by Foodgram services.

pub mod error;
pub mod health;
pub mod middleware;
pub mod pagination;
pub mod sea_ext;
pub mod tracing;
