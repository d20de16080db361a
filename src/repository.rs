//! Per-entity-type facade: CRUD plus a pagination cursor.
//!
//! A repository wraps one resource path on one API and holds the single
//! "current" collection produced by its last list/search call. Navigation
//! methods replace that cursor wholesale with the page they fetch. Writes
//! flatten the entity graph to a link-resolved payload and rehydrate the
//! same instance from the response body.

use std::fmt::Display;
use std::sync::Arc;

use serde_json::Value;

use crate::collection::ResourceCollection;
use crate::error::{HalError, NavigationError};
use crate::flatten::flatten;
use crate::hydrate::hydrate;
use crate::navigate;
use crate::resource::HalResource;
use crate::subtype::SubtypeRegistry;
use crate::transport::{expect_success, success_or_not_found, Method, Transport};
use crate::types::{json_type_name, QueryOptions, Sort, EMBEDDED_KEY};
use crate::uri::BaseUri;

/// Typed access to one resource exposed by a HAL+JSON API.
///
/// ```no_run
/// use std::sync::Arc;
/// use hal_client::{BaseUri, HalRepository, HalResource, HttpTransport, Links};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Clone, Serialize, Deserialize)]
/// struct Item {
///     #[serde(rename = "_links", default)]
///     links: Links,
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
///
/// # async fn example() -> Result<(), hal_client::HalError> {
/// let transport = Arc::new(HttpTransport::new()?);
/// let base = BaseUri::new("http://localhost:8080");
/// let mut items = HalRepository::<Item>::new(transport, base, "items");
///
/// let first_page = items.get_all(None).await?;
/// if items.has_next() {
///     let second_page = items.next().await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct HalRepository<T> {
    transport: Arc<dyn Transport>,
    base: BaseUri,
    resource: String,
    embedded_key: String,
    registry: Option<SubtypeRegistry<T>>,
    cursor: Option<ResourceCollection<T>>,
}

impl<T> std::fmt::Debug for HalRepository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HalRepository")
            .field("resource", &self.resource)
            .field("embedded_key", &self.embedded_key)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl<T: HalResource + Default + Clone> HalRepository<T> {
    pub fn new(
        transport: Arc<dyn Transport>,
        base: BaseUri,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            base,
            resource: resource.into(),
            embedded_key: EMBEDDED_KEY.to_string(),
            registry: None,
            cursor: None,
        }
    }

    /// Use a non-standard envelope key instead of `"_embedded"`.
    pub fn embedded_key(mut self, key: impl Into<String>) -> Self {
        self.embedded_key = key.into();
        self
    }

    /// Resolve embedded relation groups through a subtype registry.
    pub fn subtypes(mut self, registry: SubtypeRegistry<T>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn base(&self) -> &BaseUri {
        &self.base
    }

    /// Reconfigure root/proxy; later requests and rewrites use the new
    /// mapping, including links captured before the change.
    pub fn base_mut(&mut self) -> &mut BaseUri {
        &mut self.base
    }

    /// The collection the cursor currently holds.
    pub fn cursor(&self) -> Option<&ResourceCollection<T>> {
        self.cursor.as_ref()
    }

    // --- Collection fetches ---

    /// List the resource, replacing the cursor.
    ///
    /// An absent page (no embedded section in the response) clears the
    /// cursor and returns an empty vec. With `no_page` set and a paginated
    /// first response, the request is re-issued once with `size` set to the
    /// observed total element count - a one-shot escalation, never a loop.
    pub async fn get_all(&mut self, options: Option<&QueryOptions>) -> Result<Vec<T>, HalError> {
        let uri = self.base.resource_url(&self.resource);
        self.fetch_list(&uri, options).await
    }

    /// Invoke a named search endpoint (`<resource>/search/<query>`).
    pub async fn search(
        &mut self,
        query: &str,
        options: Option<&QueryOptions>,
    ) -> Result<Vec<T>, HalError> {
        let uri = format!("{}/search/{}", self.base.resource_url(&self.resource), query);
        self.fetch_list(&uri, options).await
    }

    /// Append a raw suffix to the resource URL (`<resource><query>`).
    pub async fn custom_query(
        &mut self,
        query: &str,
        options: Option<&QueryOptions>,
    ) -> Result<Vec<T>, HalError> {
        let uri = format!("{}{}", self.base.resource_url(&self.resource), query);
        self.fetch_list(&uri, options).await
    }

    /// Follow a relation link that embeds a collection, replacing the cursor.
    pub async fn get_relation_collection(&mut self, link: &str) -> Result<Vec<T>, HalError> {
        let uri = self.base.rewrite(link);
        match self.fetch_collection(&uri).await? {
            Some(collection) => Ok(self.replace_cursor(collection)),
            None => {
                self.cursor = None;
                Ok(Vec::new())
            }
        }
    }

    async fn fetch_list(
        &mut self,
        uri_base: &str,
        options: Option<&QueryOptions>,
    ) -> Result<Vec<T>, HalError> {
        let opts = options.cloned().unwrap_or_default();
        let uri = format!("{}{}", uri_base, opts.query_string());
        tracing::debug!(%uri, "fetching collection");

        let Some(mut collection) = self.fetch_collection(&uri).await? else {
            self.cursor = None;
            return Ok(Vec::new());
        };

        if opts.no_page && collection.first_link.is_some() {
            // The caller wanted everything but the server paginated anyway:
            // replay once with size set to the observed total.
            let escalated = QueryOptions {
                no_page: false,
                page_size: Some(collection.total_elements),
                sort: opts.sort.clone(),
                params: opts.params.clone(),
            };
            let uri = format!("{}{}", uri_base, escalated.query_string());
            tracing::debug!(%uri, total = collection.total_elements, "re-fetching without paging");
            match self.fetch_collection(&uri).await? {
                Some(full) => collection = full,
                None => {
                    self.cursor = None;
                    return Ok(Vec::new());
                }
            }
        }

        collection.sort_info = opts.sort;
        Ok(self.replace_cursor(collection))
    }

    async fn fetch_collection(
        &self,
        uri: &str,
    ) -> Result<Option<ResourceCollection<T>>, HalError> {
        let body = expect_success(self.transport.get(uri).await?, uri)?;
        ResourceCollection::from_payload(&body, &self.embedded_key, self.registry.as_ref())
    }

    fn replace_cursor(&mut self, collection: ResourceCollection<T>) -> Vec<T> {
        let items = collection.items().to_vec();
        self.cursor = Some(collection);
        items
    }

    // --- Single fetches ---

    /// Fetch one resource by identifier; `404` yields `Ok(None)`.
    pub async fn get(&self, id: impl Display) -> Result<Option<T>, HalError> {
        let uri = format!("{}/{}", self.base.resource_url(&self.resource), id);
        self.fetch_single(&uri).await
    }

    /// Fetch one resource by its (rewritten) self link; `404` yields `Ok(None)`.
    pub async fn get_by_self_link(&self, link: &str) -> Result<Option<T>, HalError> {
        let uri = self.base.rewrite(link);
        self.fetch_single(&uri).await
    }

    /// Follow a single-valued relation link; `404` yields `Ok(None)`.
    pub async fn get_relation(&self, link: &str) -> Result<Option<T>, HalError> {
        self.get_by_self_link(link).await
    }

    /// Invoke a search endpoint expected to return a single resource.
    pub async fn search_single(
        &self,
        query: &str,
        options: Option<&QueryOptions>,
    ) -> Result<Option<T>, HalError> {
        let query_string = options.map(QueryOptions::query_string).unwrap_or_default();
        let uri = format!(
            "{}/search/{}{}",
            self.base.resource_url(&self.resource),
            query,
            query_string
        );
        self.fetch_single(&uri).await
    }

    async fn fetch_single(&self, uri: &str) -> Result<Option<T>, HalError> {
        let Some(body) = success_or_not_found(self.transport.get(uri).await?, uri)? else {
            return Ok(None);
        };
        let mut entity = T::default();
        hydrate(&mut entity, &body)?;
        Ok(Some(entity))
    }

    /// Total count from the `<resource>/search/countAll` endpoint.
    pub async fn count(&self) -> Result<u64, HalError> {
        let uri = format!("{}/search/countAll", self.base.resource_url(&self.resource));
        let body = expect_success(self.transport.get(&uri).await?, &uri)?;
        parse_count(&body)
    }

    // --- Writes ---

    /// POST a flattened payload and rehydrate `entity` from the response.
    pub async fn create(&self, entity: &mut T) -> Result<(), HalError> {
        let uri = self.base.resource_url(&self.resource);
        let payload = flatten(&*entity)?;
        let body = expect_success(self.transport.post(&uri, &payload).await?, &uri)?;
        hydrate(entity, &body)
    }

    /// PUT to the entity's own self link and rehydrate in place.
    pub async fn update(&self, entity: &mut T) -> Result<(), HalError> {
        self.write_to_self(entity, Method::Put).await
    }

    /// PATCH to the entity's own self link and rehydrate in place.
    pub async fn patch(&self, entity: &mut T) -> Result<(), HalError> {
        self.write_to_self(entity, Method::Patch).await
    }

    /// Dispatch to [`HalRepository::update`] or [`HalRepository::create`]
    /// depending on [`HalResource::is_new`].
    pub async fn save(&self, entity: &mut T) -> Result<(), HalError> {
        if entity.is_new() {
            self.create(entity).await
        } else {
            self.update(entity).await
        }
    }

    /// DELETE the entity at its (rewritten) self link.
    pub async fn delete(&self, entity: &T) -> Result<(), HalError> {
        let href = entity.self_href().ok_or(HalError::MissingSelfLink)?;
        let uri = self.base.rewrite(href);
        expect_success(self.transport.delete(&uri).await?, &uri)?;
        Ok(())
    }

    async fn write_to_self(&self, entity: &mut T, method: Method) -> Result<(), HalError> {
        let href = entity
            .self_href()
            .ok_or(HalError::MissingSelfLink)?
            .to_string();
        let uri = self.base.rewrite(&href);
        let payload = flatten(&*entity)?;
        let response = self.transport.send(method, &uri, Some(&payload)).await?;
        let body = expect_success(response, &uri)?;
        hydrate(entity, &body)
    }

    // --- Cursor navigation ---

    pub fn total_elements(&self) -> u64 {
        self.cursor.as_ref().map_or(0, |c| c.total_elements)
    }

    pub fn has_next(&self) -> bool {
        self.cursor.as_ref().is_some_and(ResourceCollection::has_next)
    }

    pub fn has_prev(&self) -> bool {
        self.cursor.as_ref().is_some_and(ResourceCollection::has_prev)
    }

    pub fn has_first(&self) -> bool {
        self.cursor.as_ref().is_some_and(ResourceCollection::has_first)
    }

    pub fn has_last(&self) -> bool {
        self.cursor.as_ref().is_some_and(ResourceCollection::has_last)
    }

    /// Advance to the next page, replacing the cursor.
    pub async fn next(&mut self) -> Result<Vec<T>, HalError> {
        let current = self.current()?;
        let collection = navigate::next(self.transport.as_ref(), &self.base, current).await?;
        Ok(self.replace_cursor(collection))
    }

    /// Move to the previous page, replacing the cursor.
    pub async fn prev(&mut self) -> Result<Vec<T>, HalError> {
        let current = self.current()?;
        let collection = navigate::prev(self.transport.as_ref(), &self.base, current).await?;
        Ok(self.replace_cursor(collection))
    }

    /// Jump to the first page, replacing the cursor.
    pub async fn first(&mut self) -> Result<Vec<T>, HalError> {
        let current = self.current()?;
        let collection = navigate::first(self.transport.as_ref(), &self.base, current).await?;
        Ok(self.replace_cursor(collection))
    }

    /// Jump to the last page, replacing the cursor.
    pub async fn last(&mut self) -> Result<Vec<T>, HalError> {
        let current = self.current()?;
        let collection = navigate::last(self.transport.as_ref(), &self.base, current).await?;
        Ok(self.replace_cursor(collection))
    }

    /// Jump to an explicit page number, replacing the cursor.
    pub async fn page(&mut self, page_number: u64) -> Result<Vec<T>, HalError> {
        let current = self.current()?;
        let collection =
            navigate::page(self.transport.as_ref(), &self.base, current, page_number).await?;
        Ok(self.replace_cursor(collection))
    }

    /// Change the page size, replacing the cursor.
    pub async fn resize(&mut self, size: u64) -> Result<Vec<T>, HalError> {
        let current = self.current()?;
        let collection =
            navigate::resize(self.transport.as_ref(), &self.base, current, size).await?;
        Ok(self.replace_cursor(collection))
    }

    /// Re-fetch with a new sort spec, replacing the cursor.
    pub async fn sort(&mut self, sort: Vec<Sort>) -> Result<Vec<T>, HalError> {
        let current = self.current()?;
        let collection =
            navigate::sort(self.transport.as_ref(), &self.base, current, sort).await?;
        Ok(self.replace_cursor(collection))
    }

    fn current(&self) -> Result<&ResourceCollection<T>, HalError> {
        Ok(self.cursor.as_ref().ok_or(NavigationError::NoCursor)?)
    }
}

fn parse_count(body: &Value) -> Result<u64, HalError> {
    match body {
        Value::Number(n) => n.as_u64().ok_or_else(|| HalError::MalformedBody {
            message: format!("count is not a non-negative integer: {}", n),
        }),
        Value::String(s) => s.trim().parse().map_err(|_| HalError::MalformedBody {
            message: format!("count is not numeric: {:?}", s),
        }),
        other => Err(HalError::MalformedBody {
            message: format!("expected numeric count, got {}", json_type_name(other)),
        }),
    }
}
