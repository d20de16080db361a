//! Cursor navigation over paginated collections.
//!
//! Every transition here is a full request/replace cycle: the stored link (or
//! a URI rebuilt from the `self` link) is rewritten through [`BaseUri`],
//! fetched, and assembled into a brand-new collection seeded with the source
//! collection's envelope key and sort spec. Nothing mutates the source
//! collection. A missing link slot is always a typed error - no navigation
//! method silently returns an empty result.

use serde_json::Value;

use crate::collection::ResourceCollection;
use crate::error::{HalError, NavigationError};
use crate::resource::HalResource;
use crate::transport::{expect_success, Transport};
use crate::types::Sort;
use crate::uri::{remove_param, replace_or_add, strip_template_tokens, BaseUri};

/// The four stored-link transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Next,
    Prev,
    First,
    Last,
}

impl Slot {
    fn rel(self) -> &'static str {
        match self {
            Slot::Next => "next",
            Slot::Prev => "prev",
            Slot::First => "first",
            Slot::Last => "last",
        }
    }

    fn link<'a, T>(self, collection: &'a ResourceCollection<T>) -> Option<&'a str> {
        match self {
            Slot::Next => collection.next_link.as_deref(),
            Slot::Prev => collection.prev_link.as_deref(),
            Slot::First => collection.first_link.as_deref(),
            Slot::Last => collection.last_link.as_deref(),
        }
    }
}

/// Fetch the page behind the `next` link.
///
/// # Errors
///
/// [`NavigationError::MissingLink`] when the slot is absent, plus any
/// transport or status failure.
pub async fn next<T: HalResource + Default>(
    transport: &dyn Transport,
    base: &BaseUri,
    current: &ResourceCollection<T>,
) -> Result<ResourceCollection<T>, HalError> {
    follow(transport, base, current, Slot::Next).await
}

/// Fetch the page behind the `prev` link.
pub async fn prev<T: HalResource + Default>(
    transport: &dyn Transport,
    base: &BaseUri,
    current: &ResourceCollection<T>,
) -> Result<ResourceCollection<T>, HalError> {
    follow(transport, base, current, Slot::Prev).await
}

/// Fetch the page behind the `first` link.
pub async fn first<T: HalResource + Default>(
    transport: &dyn Transport,
    base: &BaseUri,
    current: &ResourceCollection<T>,
) -> Result<ResourceCollection<T>, HalError> {
    follow(transport, base, current, Slot::First).await
}

/// Fetch the page behind the `last` link.
pub async fn last<T: HalResource + Default>(
    transport: &dyn Transport,
    base: &BaseUri,
    current: &ResourceCollection<T>,
) -> Result<ResourceCollection<T>, HalError> {
    follow(transport, base, current, Slot::Last).await
}

async fn follow<T: HalResource + Default>(
    transport: &dyn Transport,
    base: &BaseUri,
    current: &ResourceCollection<T>,
    slot: Slot,
) -> Result<ResourceCollection<T>, HalError> {
    let link = slot.link(current).ok_or_else(|| NavigationError::MissingLink {
        rel: slot.rel().to_string(),
    })?;
    let uri = base.rewrite(link);
    tracing::debug!(rel = slot.rel(), %uri, "following link");
    let body = expect_success(transport.get(&uri).await?, &uri)?;
    assemble(&body, current, &current.sort_info)
}

/// Jump to an explicit page number, keeping the current page size and sort.
///
/// The URI is rebuilt from the `self` link: template tokens are stripped,
/// `page` and `size` are set on the existing query, and the current sort
/// spec is re-appended as repeated `sort=path,order` parameters.
pub async fn page<T: HalResource + Default>(
    transport: &dyn Transport,
    base: &BaseUri,
    current: &ResourceCollection<T>,
    page_number: u64,
) -> Result<ResourceCollection<T>, HalError> {
    let uri = rebuild_uri(
        base,
        current,
        &[
            ("page", page_number.to_string()),
            ("size", current.page_size.to_string()),
        ],
        &current.sort_info,
    )?;
    let body = expect_success(transport.get(&uri).await?, &uri)?;
    assemble(&body, current, &current.sort_info)
}

/// Change the page size, leaving page position to the server.
///
/// Only `size` is replaced on the query rebuilt from `self`; an existing
/// `page` parameter is preserved as-is.
pub async fn resize<T: HalResource + Default>(
    transport: &dyn Transport,
    base: &BaseUri,
    current: &ResourceCollection<T>,
    size: u64,
) -> Result<ResourceCollection<T>, HalError> {
    let uri = rebuild_uri(
        base,
        current,
        &[("size", size.to_string())],
        &current.sort_info,
    )?;
    let body = expect_success(transport.get(&uri).await?, &uri)?;
    assemble(&body, current, &current.sort_info)
}

/// Re-fetch with a new sort spec.
///
/// The URI carries explicit `size` and `page` plus the **new** spec; the
/// returned collection records the new spec as its sort info - this is the
/// one transition that changes the recorded sort state.
pub async fn sort<T: HalResource + Default>(
    transport: &dyn Transport,
    base: &BaseUri,
    current: &ResourceCollection<T>,
    new_sort: Vec<Sort>,
) -> Result<ResourceCollection<T>, HalError> {
    let uri = rebuild_uri(
        base,
        current,
        &[
            ("size", current.page_size.to_string()),
            ("page", current.page_number.to_string()),
        ],
        &new_sort,
    )?;
    let body = expect_success(transport.get(&uri).await?, &uri)?;
    assemble(&body, current, &new_sort)
}

/// Rebuild a request URI from the collection's `self` link.
///
/// Any `sort` pairs already on the query are dropped before the effective
/// spec is appended, so replayed links never accumulate duplicates.
fn rebuild_uri<T>(
    base: &BaseUri,
    current: &ResourceCollection<T>,
    replacements: &[(&str, String)],
    sorts: &[Sort],
) -> Result<String, HalError> {
    let self_link = current
        .self_link
        .as_deref()
        .ok_or_else(|| NavigationError::MissingLink {
            rel: "self".to_string(),
        })?;
    let rewritten = base.rewrite(&strip_template_tokens(self_link));
    let (path, existing) = match rewritten.split_once('?') {
        Some((path, query)) => (path.to_string(), query.to_string()),
        None => (rewritten, String::new()),
    };

    let mut query = remove_param(&existing, "sort");
    for (field, value) in replacements {
        query = replace_or_add(&query, field, value);
    }

    let mut uri = format!("{}?{}", path, query);
    for sort in sorts {
        uri.push_str(&format!("&sort={}", sort.as_param()));
    }
    Ok(uri)
}

fn assemble<T: HalResource + Default>(
    body: &Value,
    current: &ResourceCollection<T>,
    sort_info: &[Sort],
) -> Result<ResourceCollection<T>, HalError> {
    let mut collection =
        ResourceCollection::from_payload(body, current.embedded_key.as_str(), None)?
            .unwrap_or_else(|| ResourceCollection::new(current.embedded_key.as_str()));
    collection.sort_info = sort_info.to_vec();
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::resource::Links;
    use crate::transport::{Method, TransportResponse};
    use crate::types::{SortOrder, EMBEDDED_KEY};
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        #[serde(rename = "_links", default)]
        links: Links,
        id: Option<u64>,
    }

    impl HalResource for Item {
        fn links(&self) -> &Links {
            &self.links
        }
        fn links_mut(&mut self) -> &mut Links {
            &mut self.links
        }
    }

    /// Replays a fixed body for every request and records the URIs hit.
    struct ScriptedTransport {
        body: Value,
        requests: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(body: Value) -> Self {
            Self {
                body,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            _method: Method,
            uri: &str,
            _body: Option<&Value>,
        ) -> Result<TransportResponse, TransportError> {
            self.requests.lock().unwrap().push(uri.to_string());
            Ok(TransportResponse {
                status: 200,
                body: self.body.clone(),
            })
        }
    }

    fn collection_with_links() -> ResourceCollection<Item> {
        let mut collection = ResourceCollection::new(EMBEDDED_KEY);
        collection.self_link = Some("/items{?page,size,sort}".into());
        collection.next_link = Some("/items?page=1&size=10".into());
        collection.page_size = 10;
        collection.page_number = 0;
        collection
    }

    fn page_body() -> Value {
        json!({
            "_embedded": { "items": [ { "id": 10 } ] },
            "page": { "totalElements": 30, "totalPages": 3, "number": 1, "size": 10 },
            "_links": { "self": { "href": "/items?page=1&size=10" } }
        })
    }

    #[tokio::test]
    async fn next_follows_the_stored_link() {
        let transport = ScriptedTransport::new(page_body());
        let base = BaseUri::new("http://internal");
        let current = collection_with_links();

        let advanced = next(&transport, &base, &current).await.unwrap();
        assert_eq!(transport.requested(), vec!["/items?page=1&size=10"]);
        assert_eq!(advanced.len(), 1);
        assert_eq!(advanced.page_number, 1);
    }

    #[tokio::test]
    async fn missing_slot_is_a_typed_error() {
        let transport = ScriptedTransport::new(page_body());
        let base = BaseUri::new("http://internal");
        let current = collection_with_links();

        let err = prev(&transport, &base, &current).await.unwrap_err();
        assert!(matches!(
            err,
            HalError::Navigation(NavigationError::MissingLink { rel }) if rel == "prev"
        ));
        assert!(transport.requested().is_empty());
    }

    #[tokio::test]
    async fn page_strips_templates_and_sets_page_and_size() {
        let transport = ScriptedTransport::new(page_body());
        let base = BaseUri::new("http://internal");
        let current = collection_with_links();

        page(&transport, &base, &current, 2).await.unwrap();
        assert_eq!(transport.requested(), vec!["/items?page=2&size=10"]);
    }

    #[tokio::test]
    async fn page_replays_the_current_sort_spec() {
        let transport = ScriptedTransport::new(page_body());
        let base = BaseUri::new("http://internal");
        let mut current = collection_with_links();
        current.sort_info = vec![
            Sort::new("name", SortOrder::Asc),
            Sort::new("id", SortOrder::Desc),
        ];

        page(&transport, &base, &current, 2).await.unwrap();
        assert_eq!(
            transport.requested(),
            vec!["/items?page=2&size=10&sort=name,asc&sort=id,desc"]
        );
    }

    #[tokio::test]
    async fn resize_preserves_existing_page_position() {
        let transport = ScriptedTransport::new(page_body());
        let base = BaseUri::new("http://internal");
        let mut current = collection_with_links();
        current.self_link = Some("/items?page=3&size=10".into());

        resize(&transport, &base, &current, 50).await.unwrap();
        assert_eq!(transport.requested(), vec!["/items?page=3&size=50"]);
    }

    #[tokio::test]
    async fn sort_emits_and_records_the_new_spec() {
        let transport = ScriptedTransport::new(page_body());
        let base = BaseUri::new("http://internal");
        let mut current = collection_with_links();
        current.sort_info = vec![Sort::new("name", SortOrder::Asc)];

        let new_spec = vec![Sort::new("created", SortOrder::Desc)];
        let sorted = sort(&transport, &base, &current, new_spec.clone())
            .await
            .unwrap();

        // The old spec is gone from both the URI and the new collection.
        assert_eq!(
            transport.requested(),
            vec!["/items?size=10&page=0&sort=created,desc"]
        );
        assert_eq!(sorted.sort_info, new_spec);
    }

    #[tokio::test]
    async fn stale_sort_params_on_self_are_dropped() {
        let transport = ScriptedTransport::new(page_body());
        let base = BaseUri::new("http://internal");
        let mut current = collection_with_links();
        current.self_link = Some("/items?page=0&size=10&sort=name,asc".into());
        current.sort_info = vec![Sort::new("name", SortOrder::Asc)];

        page(&transport, &base, &current, 1).await.unwrap();
        assert_eq!(
            transport.requested(),
            vec!["/items?page=1&size=10&sort=name,asc"]
        );
    }

    #[tokio::test]
    async fn navigation_to_empty_payload_yields_empty_collection() {
        let transport = ScriptedTransport::new(json!({}));
        let base = BaseUri::new("http://internal");
        let current = collection_with_links();

        let advanced = next(&transport, &base, &current).await.unwrap();
        assert!(advanced.is_empty());
        assert_eq!(advanced.embedded_key, EMBEDDED_KEY);
    }

    #[tokio::test]
    async fn links_are_rewritten_through_the_proxy() {
        let transport = ScriptedTransport::new(page_body());
        let base = BaseUri::with_proxy("http://internal", "https://api.example.com");
        let mut current = collection_with_links();
        current.next_link = Some("http://internal/items?page=1&size=10".into());

        next(&transport, &base, &current).await.unwrap();
        assert_eq!(
            transport.requested(),
            vec!["https://api.example.com/items?page=1&size=10"]
        );
    }
}
