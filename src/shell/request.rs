//! Requests, responses, and cache-key normalization

use crate::error::{DexError, DexResult};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use url::Url;

/// Body served for navigations when offline and no offline page is cached
pub const OFFLINE_PLACEHOLDER: &str = "Offline and no offline page available.";

/// What kind of load a request is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    /// Top-level page navigation
    Navigate,
    /// Script, style, image, or other sub-resource
    Subresource,
}

/// An outgoing resource request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRequest {
    /// Absolute URL, or a path relative to the shell origin
    pub url: String,
    pub mode: RequestMode,
}

impl ShellRequest {
    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Navigate,
        }
    }

    pub fn subresource(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Subresource,
        }
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}

/// A response, either fetched or served from cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ShellResponse {
    /// Whether the status is 2xx
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Minimal page returned when a navigation cannot be served at all
    pub fn offline_placeholder() -> Self {
        Self {
            status: 200,
            content_type: Some("text/html".to_string()),
            body: OFFLINE_PLACEHOLDER.as_bytes().to_vec(),
        }
    }

    /// Body as text, lossily decoded
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Origin and routing rules that decide cache keys
#[derive(Debug, Clone)]
pub struct Scope {
    origin: Url,
    detail_route: String,
}

impl Scope {
    /// Build a scope from the shell origin and its parameterized detail route
    pub fn new(origin: &str, detail_route: &str) -> DexResult<Self> {
        let origin = Url::parse(origin).map_err(|e| DexError::InvalidUrl {
            url: origin.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            origin,
            detail_route: detail_route.to_string(),
        })
    }

    /// Resolve a path or absolute URL against the origin
    pub fn resolve(&self, raw: &str) -> DexResult<Url> {
        self.origin.join(raw).map_err(|e| DexError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })
    }

    /// Cache key for a resolved URL
    ///
    /// Same-origin URLs key by path and query, except the detail route,
    /// which always keys by its bare path. Cross-origin URLs key by the
    /// full URL. Fragments never take part.
    pub fn cache_key(&self, url: &Url) -> String {
        if url.origin() != self.origin.origin() {
            let mut url = url.clone();
            url.set_fragment(None);
            return url.to_string();
        }

        if url.path() == self.detail_route {
            return self.detail_route.clone();
        }

        match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        }
    }

    /// Resolve and key in one step
    pub fn normalize(&self, raw: &str) -> DexResult<String> {
        Ok(self.cache_key(&self.resolve(raw)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Scope {
        Scope::new("http://localhost:8080", "/duck.html").unwrap()
    }

    #[test]
    fn detail_route_collapses_query() {
        let scope = scope();
        assert_eq!(scope.normalize("/duck.html?x=1").unwrap(), "/duck.html");
        assert_eq!(scope.normalize("/duck.html?x=2").unwrap(), "/duck.html");
        assert_eq!(
            scope
                .normalize("http://localhost:8080/duck.html?id=3&name=Hat")
                .unwrap(),
            "/duck.html"
        );
    }

    #[test]
    fn other_paths_keep_query() {
        let scope = scope();
        assert_eq!(scope.normalize("/style.css").unwrap(), "/style.css");
        assert_eq!(scope.normalize("/scan.html?cam=1").unwrap(), "/scan.html?cam=1");
        assert_eq!(scope.normalize("/").unwrap(), "/");
    }

    #[test]
    fn fragments_are_ignored() {
        assert_eq!(scope().normalize("/index.html#top").unwrap(), "/index.html");
    }

    #[test]
    fn cross_origin_keys_by_full_url() {
        let key = scope().normalize("https://cdn.example.com/duck.html?x=1").unwrap();
        assert_eq!(key, "https://cdn.example.com/duck.html?x=1");
    }

    #[test]
    fn invalid_origin_rejected() {
        assert!(matches!(
            Scope::new("not a url", "/duck.html"),
            Err(DexError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn placeholder_is_html() {
        let response = ShellResponse::offline_placeholder();
        assert!(response.is_ok());
        assert_eq!(response.content_type.as_deref(), Some("text/html"));
        assert_eq!(response.text(), OFFLINE_PLACEHOLDER);
    }
}
