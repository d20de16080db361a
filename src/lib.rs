//! HAL+JSON client engine
//!
//! Typed resource hydration and hypermedia navigation for HAL+JSON APIs
//! (Spring Data REST-style services).
//!
//! The engine turns hypermedia envelopes into typed entities and paginated
//! collections, follows pagination and relation links, rewrites link URIs
//! for reverse-proxy deployments, and flattens typed object graphs back into
//! link-resolved JSON for writes. HTTP stays behind the [`Transport`] trait;
//! the reqwest-backed [`HttpTransport`] ships behind the default-on `remote`
//! feature, and auth or caching middleware belongs inside transport
//! implementations.
//!
//! # Example
//!
//! ```
//! use hal_client::{HalResource, Links, ResourceCollection, EMBEDDED_KEY};
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Debug, Default, Clone, Serialize, Deserialize)]
//! struct Item {
//!     #[serde(rename = "_links", default)]
//!     links: Links,
//!     id: Option<u64>,
//!     name: Option<String>,
//! }
//!
//! impl HalResource for Item {
//!     fn links(&self) -> &Links {
//!         &self.links
//!     }
//!     fn links_mut(&mut self) -> &mut Links {
//!         &mut self.links
//!     }
//! }
//!
//! let envelope = json!({
//!     "_embedded": {
//!         "items": [ { "id": 1, "name": "first" }, { "id": 2, "name": "second" } ]
//!     },
//!     "page": { "size": 20, "totalElements": 2, "totalPages": 1, "number": 0 },
//!     "_links": { "self": { "href": "http://api.example.com/items" } }
//! });
//!
//! let collection = ResourceCollection::<Item>::from_payload(&envelope, EMBEDDED_KEY, None)
//!     .unwrap()
//!     .expect("envelope carries an embedded section");
//!
//! assert_eq!(collection.len(), 2);
//! assert_eq!(collection.total_elements, 2);
//! assert_eq!(collection.items()[0].name.as_deref(), Some("first"));
//! ```
//!
//! Against a live API, [`HalRepository`] wraps one resource path and holds
//! the pagination cursor:
//!
//! - `get_all` / `search` / `custom_query` fetch and assemble a page,
//! - `next` / `prev` / `first` / `last` / `page` / `resize` / `sort` replay
//!   the stored links and replace the cursor,
//! - `create` / `update` / `patch` / `save` / `delete` flatten relations to
//!   their self-link hrefs and rehydrate the entity from the response.
//!
//! # Reverse proxies
//!
//! Servers behind a proxy emit absolute links pointing at their internal
//! root. Configure [`BaseUri::with_proxy`] and every stored link is
//! rewritten to the public prefix before it is replayed.

mod collection;
mod error;
mod flatten;
mod hydrate;
pub mod navigate;
mod repository;
mod resource;
mod subtype;
mod transport;
mod types;
mod uri;

pub use collection::ResourceCollection;
pub use error::{HalError, NavigationError, TransportError};
pub use flatten::flatten;
pub use hydrate::hydrate;
pub use repository::HalRepository;
pub use resource::{is_resource_like, self_href_of, HalResource, Link, Links};
pub use subtype::SubtypeRegistry;
pub use transport::{Method, Transport, TransportResponse};
pub use types::{QueryOptions, Sort, SortOrder, DEFAULT_PAGE_SIZE, EMBEDDED_KEY};
pub use uri::BaseUri;

#[cfg(feature = "remote")]
pub use transport::HttpTransport;
