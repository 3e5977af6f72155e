//! `Authorization` header extractors.
//!
//! Accepted schemes: `Token <jwt>` and `Bearer <jwt>`.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use http::header::AUTHORIZATION;
use http::request::Parts;

use foodgram_core::error::AppError;
use foodgram_domain::user::UserRole;

use crate::token::validate_access_token;

/// HMAC secret used to validate tokens. Services expose it via `FromRef`.
#[derive(Clone)]
pub struct TokenSecret(pub Arc<str>);

impl TokenSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }
}

/// Authenticated caller. Rejects with 401 when the header is absent or invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i32,
    pub role: UserRole,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Optional caller. `None` when no header is sent; a header carrying a bad
/// token is still rejected with 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaybeIdentity(pub Option<Identity>);

impl MaybeIdentity {
    pub fn user_id(&self) -> Option<i32> {
        self.0.map(|i| i.user_id)
    }
}

enum HeaderToken {
    Absent,
    Invalid,
    Valid(Identity),
}

fn read_header(parts: &Parts, secret: &str) -> HeaderToken {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return HeaderToken::Absent;
    };
    let token = value.to_str().ok().and_then(|v| {
        v.strip_prefix("Token ")
            .or_else(|| v.strip_prefix("Bearer "))
            .map(str::trim)
    });
    let Some(token) = token else {
        return HeaderToken::Invalid;
    };
    match validate_access_token(token, secret) {
        Ok(info) => HeaderToken::Valid(Identity {
            user_id: info.user_id,
            role: info.role,
        }),
        Err(e) => {
            tracing::debug!(error = %e, "rejected access token");
            HeaderToken::Invalid
        }
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    TokenSecret: FromRef<S>,
{
    type Rejection = AppError;

    // Resolve the header synchronously so the returned future holds no borrow of `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = TokenSecret::from_ref(state);
        let result = read_header(parts, &secret.0);
        async move {
            match result {
                HeaderToken::Valid(identity) => Ok(identity),
                HeaderToken::Absent | HeaderToken::Invalid => Err(AppError::Unauthorized),
            }
        }
    }
}

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
    TokenSecret: FromRef<S>,
{
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = TokenSecret::from_ref(state);
        let result = read_header(parts, &secret.0);
        async move {
            match result {
                HeaderToken::Valid(identity) => Ok(Self(Some(identity))),
                HeaderToken::Absent => Ok(Self(None)),
                HeaderToken::Invalid => Err(AppError::Unauthorized),
            }
        }
    }
}
