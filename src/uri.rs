//! Base/proxy URI state and link rewriting.
//!
//! Servers behind a reverse proxy emit absolute links pointing at their
//! internal root. [`BaseUri`] swaps that root prefix for a public-facing
//! proxy prefix without the server's cooperation, and owns the small URI
//! surgery helpers the navigator needs: template-token stripping and
//! query-parameter replacement.

/// Root and proxy URIs for one API, passed explicitly to the engine.
///
/// Reconfiguration (e.g. an environment change) is an explicit setter call;
/// links captured before the change are interpreted under the new mapping on
/// their next use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUri {
    root: String,
    proxy: Option<String>,
}

impl BaseUri {
    /// A base with no proxy configured; [`BaseUri::rewrite`] is the identity.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            proxy: None,
        }
    }

    /// A base whose emitted links are redirected from `root` to `proxy`.
    pub fn with_proxy(root: impl Into<String>, proxy: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            proxy: Some(proxy.into()),
        }
    }

    pub fn set_root(&mut self, root: impl Into<String>) {
        self.root = root.into();
    }

    /// Set or clear the proxy prefix.
    pub fn set_proxy(&mut self, proxy: Option<String>) {
        self.proxy = proxy;
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref().filter(|p| !p.is_empty())
    }

    /// The URI requests are issued against: the proxy when one is configured,
    /// the root otherwise, trailing-slash-normalized.
    pub fn base(&self) -> String {
        match self.proxy() {
            Some(proxy) => ensure_trailing_slash(proxy),
            None => ensure_trailing_slash(&self.root),
        }
    }

    /// Absolute URL for a resource path under [`BaseUri::base`].
    pub fn resource_url(&self, resource: &str) -> String {
        format!("{}{}", self.base(), resource)
    }

    /// Redirect a server-emitted link to the proxy.
    ///
    /// No-op when no proxy is configured. A URI already under the proxy
    /// prefix is returned normalized but otherwise untouched, which makes
    /// `rewrite` idempotent even when the proxy prefix itself contains the
    /// root as a substring. URIs under neither prefix pass through unchanged.
    pub fn rewrite(&self, uri: &str) -> String {
        let Some(proxy) = self.proxy() else {
            return uri.to_string();
        };
        if uri.starts_with(proxy) {
            return ensure_trailing_slash(uri);
        }
        match uri.strip_prefix(&self.root) {
            Some(rest) => ensure_trailing_slash(&format!("{}{}", proxy, rest)),
            None => uri.to_string(),
        }
    }
}

/// Append a trailing slash unless the URI already ends with one or carries a
/// query component.
pub(crate) fn ensure_trailing_slash(uri: &str) -> String {
    if uri.is_empty() || uri.contains('?') || uri.ends_with('/') {
        uri.to_string()
    } else {
        format!("{}/", uri)
    }
}

/// Remove unexpanded URI-template tokens from a stored link.
///
/// Spring Data emits templates like `{?page,size,sort}`, `{&sort}` or
/// `{?projection}` on collection self links; they must be gone before real
/// query parameters are appended.
pub(crate) fn strip_template_tokens(uri: &str) -> String {
    let mut result = String::with_capacity(uri.len());
    let mut in_template = false;
    for ch in uri.chars() {
        match ch {
            '{' => in_template = true,
            '}' if in_template => in_template = false,
            _ if in_template => {}
            _ => result.push(ch),
        }
    }
    result
}

/// Replace a parameter in a raw query string (no leading `?`), or append it.
///
/// Keys are matched whole; existing pair order is preserved.
pub(crate) fn replace_or_add(query: &str, field: &str, value: &str) -> String {
    let mut pairs: Vec<(String, String)> = query
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect();

    match pairs.iter_mut().find(|(k, _)| k == field) {
        Some((_, v)) => *v = value.to_string(),
        None => pairs.push((field.to_string(), value.to_string())),
    }

    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Drop every pair with the given key from a raw query string.
pub(crate) fn remove_param(query: &str, field: &str) -> String {
    query
        .split('&')
        .filter(|pair| {
            !pair.is_empty() && pair.split_once('=').map_or(*pair, |(k, _)| k) != field
        })
        .collect::<Vec<_>>()
        .join("&")
}
