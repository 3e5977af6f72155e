//! Mock auth helpers for HTTP tests.
//!
//! `MockAuth` signs a real token with [`TEST_JWT_SECRET`], so routers under
//! test must be built with the same secret.

use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};

use foodgram_auth_types::token::issue_access_token;
use foodgram_domain::user::UserRole;

pub const TEST_JWT_SECRET: &str = "foodgram-test-secret";

/// Identity to authenticate test requests as.
pub struct MockAuth {
    pub user_id: i32,
    pub role: UserRole,
}

impl MockAuth {
    pub fn new(user_id: i32, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn user(user_id: i32) -> Self {
        Self::new(user_id, UserRole::User)
    }

    pub fn admin(user_id: i32) -> Self {
        Self::new(user_id, UserRole::Admin)
    }

    /// `Authorization: Token <jwt>` value.
    pub fn header_value(&self) -> HeaderValue {
        let (token, _) = issue_access_token(self.user_id, self.role, TEST_JWT_SECRET, 3600)
            .expect("sign test token");
        HeaderValue::from_str(&format!("Token {token}")).expect("ascii token")
    }

    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, self.header_value());
        map
    }
}
