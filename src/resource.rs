//! The resource abstraction: links, the `HalResource` capability trait, and
//! the structural tests that decide whether a JSON value is a nested resource.
//!
//! Deserialized instances carry only structural identity (they are built via
//! `Default` and field copy, not a tagged constructor), so "is this a
//! resource" is answered two ways: at compile time by the [`HalResource`]
//! bound, and on the wire by the presence of a `_links` section. The
//! self-link is the authoritative signal during flattening; the bare
//! `_links` marker covers partially hydrated objects that carry links but no
//! self entry yet.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single hypermedia link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// The `_links` section of a resource or envelope.
///
/// Entries are kept as raw JSON in document order; hydration overwrites the
/// whole section, never merges it field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links {
    entries: Map<String, Value>,
}

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `href` of the named relation, if present.
    pub fn href(&self, rel: &str) -> Option<&str> {
        self.entries.get(rel)?.get("href")?.as_str()
    }

    /// The canonical URI identifying this resource.
    pub fn self_href(&self) -> Option<&str> {
        self.href("self")
    }

    /// Set or replace a relation's link.
    pub fn insert(&mut self, rel: impl Into<String>, link: Link) {
        self.entries.insert(
            rel.into(),
            serde_json::json!({ "href": link.href }),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Relation names in document order.
    pub fn relations(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Capability interface every typed HAL entity implements.
///
/// Entities are plain serde types that expose their `_links` section; the
/// engine derives everything else. Types used with collections additionally
/// need `Default` (the assembler's no-argument construction) and `Clone` at
/// the repository seams.
///
/// ```
/// use hal_client::{HalResource, Links};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Clone, Serialize, Deserialize)]
/// struct Item {
///     #[serde(rename = "_links", default)]
///     links: Links,
///     id: Option<u64>,
///     name: Option<String>,
/// }
///
/// impl HalResource for Item {
///     fn links(&self) -> &Links {
///         &self.links
///     }
///     fn links_mut(&mut self) -> &mut Links {
///         &mut self.links
///     }
/// }
/// ```
pub trait HalResource: Serialize + DeserializeOwned {
    /// Navigation links attached to this resource (`_links` on the wire).
    fn links(&self) -> &Links;

    fn links_mut(&mut self) -> &mut Links;

    /// The canonical URI identifying this instance, if it has been persisted.
    fn self_href(&self) -> Option<&str> {
        self.links().self_href()
    }

    /// Whether `save` should create rather than update.
    ///
    /// Defaults to "no self link yet"; entity types with a distinct
    /// identifier field may override to dispatch on that instead.
    fn is_new(&self) -> bool {
        self.self_href().is_none()
    }
}

/// Wire-shape test: does this value look like a nested resource?
pub fn is_resource_like(value: &Value) -> bool {
    value.get("_links").is_some()
}

/// The self-link href carried by a value, if any.
pub fn self_href_of(value: &Value) -> Option<&str> {
    value.get("_links")?.get("self")?.get("href")?.as_str()
}
