//! Typed, paginated collections assembled from HAL envelopes.

use serde_json::Value;

use crate::error::HalError;
use crate::hydrate::hydrate;
use crate::resource::HalResource;
use crate::subtype::SubtypeRegistry;
use crate::types::{Sort, DEFAULT_PAGE_SIZE};

/// One page of typed resources plus its pagination metadata and link slots.
///
/// Collections are replaced wholesale by navigation; the only in-place
/// mutation is [`ResourceCollection::push`] during assembly. A link slot that
/// is absent from the envelope stays `None` - never an empty string.
#[derive(Debug, Clone)]
pub struct ResourceCollection<T> {
    items: Vec<T>,
    /// Envelope key the items were assembled from (normally `"_embedded"`).
    pub embedded_key: String,
    /// Sort spec in effect for this page, replayed by navigation.
    pub sort_info: Vec<Sort>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub page_number: u64,
    pub page_size: u64,
    pub self_link: Option<String>,
    pub next_link: Option<String>,
    pub prev_link: Option<String>,
    pub first_link: Option<String>,
    pub last_link: Option<String>,
}

impl<T> ResourceCollection<T> {
    /// An empty collection with default pagination metadata.
    pub fn new(embedded_key: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            embedded_key: embedded_key.into(),
            sort_info: Vec::new(),
            total_elements: 0,
            total_pages: 1,
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            self_link: None,
            next_link: None,
            prev_link: None,
            first_link: None,
            last_link: None,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.next_link.is_some()
    }

    pub fn has_prev(&self) -> bool {
        self.prev_link.is_some()
    }

    pub fn has_first(&self) -> bool {
        self.first_link.is_some()
    }

    pub fn has_last(&self) -> bool {
        self.last_link.is_some()
    }
}

impl<T: HalResource + Default> ResourceCollection<T> {
    /// Assemble a collection from a HAL envelope.
    ///
    /// Returns `Ok(None)` when `payload` has no object under `embedded_key`,
    /// the canonical absent page, distinct from an empty-but-present one.
    ///
    /// Items are gathered from every relation-name group under the envelope
    /// key, groups in document order, items in array order; that is the
    /// canonical collection order. Each item is constructed through the
    /// subtype registry (keyed on its group's relation name) or
    /// `T::default()`, then hydrated from the raw item payload.
    ///
    /// Pagination metadata comes from the `page` block when present,
    /// otherwise `total_pages`/`page_number` default to 1, `page_size` to the
    /// engine default of 20 and `total_elements` to the number of items
    /// assembled.
    pub fn from_payload(
        payload: &Value,
        embedded_key: &str,
        registry: Option<&SubtypeRegistry<T>>,
    ) -> Result<Option<Self>, HalError> {
        let Some(embedded) = payload.get(embedded_key).and_then(Value::as_object) else {
            return Ok(None);
        };

        let mut collection = Self::new(embedded_key);

        for (relation, group) in embedded {
            let Some(items) = group.as_array() else {
                continue;
            };
            for item in items {
                let mut instance = registry
                    .and_then(|r| r.resolve(relation))
                    .unwrap_or_default();
                hydrate(&mut instance, item)?;
                collection.push(instance);
            }
        }

        if let Some(page) = payload.get("page") {
            collection.total_elements = page
                .get("totalElements")
                .and_then(Value::as_u64)
                .unwrap_or(0);
            collection.total_pages = page.get("totalPages").and_then(Value::as_u64).unwrap_or(1);
            collection.page_number = page.get("number").and_then(Value::as_u64).unwrap_or(1);
            collection.page_size = page
                .get("size")
                .and_then(Value::as_u64)
                .unwrap_or(DEFAULT_PAGE_SIZE);
        } else {
            collection.total_elements = collection.len() as u64;
        }

        let links = payload.get("_links");
        collection.self_link = link_href(links, "self");
        collection.next_link = link_href(links, "next");
        collection.prev_link = link_href(links, "prev");
        collection.first_link = link_href(links, "first");
        collection.last_link = link_href(links, "last");

        tracing::trace!(
            items = collection.len(),
            total_elements = collection.total_elements,
            "assembled collection"
        );
        Ok(Some(collection))
    }
}

fn link_href(links: Option<&Value>, rel: &str) -> Option<String> {
    links?
        .get(rel)?
        .get("href")?
        .as_str()
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Links;
    use crate::types::EMBEDDED_KEY;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Animal {
        #[serde(rename = "_links", default)]
        links: Links,
        name: Option<String>,
        #[serde(default)]
        kind: String,
    }

    impl HalResource for Animal {
        fn links(&self) -> &Links {
            &self.links
        }
        fn links_mut(&mut self) -> &mut Links {
            &mut self.links
        }
    }

    fn dog() -> Animal {
        Animal {
            kind: "dog".into(),
            ..Animal::default()
        }
    }

    #[test]
    fn assembles_canonical_page() {
        let payload = json!({
            "_embedded": { "items": [ { "name": "a" }, { "name": "b" } ] },
            "page": { "totalElements": 2, "totalPages": 1, "number": 0, "size": 20 },
            "_links": { "self": { "href": "/items" } }
        });
        let collection = ResourceCollection::<Animal>::from_payload(&payload, EMBEDDED_KEY, None)
            .unwrap()
            .unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.total_elements, 2);
        assert_eq!(collection.total_pages, 1);
        assert_eq!(collection.page_number, 0);
        assert_eq!(collection.self_link.as_deref(), Some("/items"));
        assert!(!collection.has_next());
        assert!(!collection.has_prev());
    }

    #[test]
    fn missing_embedded_key_is_absent_page() {
        let payload = json!({ "page": { "totalElements": 0 } });
        let result =
            ResourceCollection::<Animal>::from_payload(&payload, EMBEDDED_KEY, None).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn empty_but_present_page_is_not_absent() {
        let payload = json!({ "_embedded": { "items": [] } });
        let collection = ResourceCollection::<Animal>::from_payload(&payload, EMBEDDED_KEY, None)
            .unwrap()
            .unwrap();
        assert!(collection.is_empty());
    }

    #[test]
    fn missing_page_block_uses_defaults() {
        let payload = json!({
            "_embedded": { "items": [ { "name": "a" }, { "name": "b" }, { "name": "c" } ] }
        });
        let collection = ResourceCollection::<Animal>::from_payload(&payload, EMBEDDED_KEY, None)
            .unwrap()
            .unwrap();
        assert_eq!(collection.total_elements, 3);
        assert_eq!(collection.total_pages, 1);
        assert_eq!(collection.page_number, 1);
        assert_eq!(collection.page_size, 20);
    }

    #[test]
    fn group_then_array_order_is_preserved() {
        let payload = json!({
            "_embedded": {
                "cats": [ { "name": "c1" }, { "name": "c2" } ],
                "dogs": [ { "name": "d1" } ]
            }
        });
        let collection = ResourceCollection::<Animal>::from_payload(&payload, EMBEDDED_KEY, None)
            .unwrap()
            .unwrap();
        let names: Vec<&str> = collection
            .items()
            .iter()
            .map(|a| a.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["c1", "c2", "d1"]);
    }

    #[test]
    fn registry_constructs_subtypes_per_group() {
        let registry = SubtypeRegistry::new().register("dog", dog);
        let payload = json!({
            "_embedded": {
                "dogs": [ { "name": "Rex" } ],
                "others": [ { "name": "Misty" } ]
            }
        });
        let collection =
            ResourceCollection::<Animal>::from_payload(&payload, EMBEDDED_KEY, Some(&registry))
                .unwrap()
                .unwrap();
        assert_eq!(collection.items()[0].kind, "dog");
        assert_eq!(collection.items()[1].kind, "");
    }

    #[test]
    fn link_slots_absent_when_envelope_omits_them() {
        let payload = json!({
            "_embedded": { "items": [] },
            "_links": { "self": { "href": "/items" }, "next": { "href": "/items?page=1" } }
        });
        let collection = ResourceCollection::<Animal>::from_payload(&payload, EMBEDDED_KEY, None)
            .unwrap()
            .unwrap();
        assert!(collection.has_next());
        assert!(!collection.has_last());
        assert_eq!(collection.prev_link, None);
    }
}
