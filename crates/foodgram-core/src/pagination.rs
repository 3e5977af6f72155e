//! Paginated response envelope.
//!
//! Wire shape: `{"count", "next", "previous", "results"}` where `next` and
//! `previous` are absolute links to the neighbouring pages (or `null`).

use axum::http::{HeaderMap, Uri, header};
use foodgram_domain::pagination::Paginated;
use serde::Serialize;
use url::Url;

#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> PageResponse<T> {
    /// Build the envelope, deriving links from the URL the client requested.
    pub fn from_page(page: Paginated<T>, request_url: Option<&Url>) -> Self {
        let current = page.page.page;
        let next = match request_url {
            Some(url) if page.has_next() => Some(page_link(url, Some(current + 1))),
            _ => None,
        };
        let previous = match request_url {
            // page 1 is the default, so its link drops the parameter
            Some(url) if page.has_previous() => Some(page_link(
                url,
                (current > 2).then_some(current - 1),
            )),
            _ => None,
        };
        Self {
            count: page.total,
            next,
            previous,
            results: page.items,
        }
    }
}

/// Reconstruct the absolute URL of the current request from `Host` and the URI.
pub fn request_url(headers: &HeaderMap, uri: &Uri) -> Option<Url> {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    Url::parse(&format!("http://{host}{path_and_query}")).ok()
}

/// Copy `url` with its `page` query parameter replaced (or removed for `None`).
pub fn page_link(url: &Url, page: Option<u32>) -> String {
    let mut link = url.clone();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "page")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    {
        let mut pairs = link.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        if let Some(page) = page {
            pairs.append_pair("page", &page.to_string());
        }
    }
    if link.query() == Some("") {
        link.set_query(None);
    }
    link.to_string()
}
