pub mod favorite;
pub mod health;
pub mod ingredient;
pub mod recipe;
pub mod shopping_cart;
pub mod subscription;
pub mod tag;
pub mod token;
pub mod user;

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::Deserialize;
use url::Url;

use foodgram_core::pagination::request_url;
use foodgram_domain::pagination::PageRequest;

use crate::infra::storage::media_url;

/// `?page=&limit=` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_query(self.page, self.limit)
    }
}

/// Absolute URL of the current request, used for page links and media URLs.
pub struct RequestUrl(pub Option<Url>);

impl<S: Send + Sync> FromRequestParts<S> for RequestUrl {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(request_url(&parts.headers, &parts.uri)))
    }
}

impl RequestUrl {
    /// Media URL for a stored path, made absolute against the request origin.
    pub fn image(&self, prefix: &str, path: &str) -> String {
        let relative = media_url(prefix, path);
        match &self.0 {
            Some(base) => base
                .join(&relative)
                .map(String::from)
                .unwrap_or(relative),
            None => relative,
        }
    }
}
