//! Core types for list requests: sorting and query options.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default page size assumed when a response carries no `page` block.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Envelope key under which HAL collection responses embed their items.
pub const EMBEDDED_KEY: &str = "_embedded";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Sort direction, emitted lowercase on the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// The query-string spelling of this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// One sort criterion: a property path and a direction.
///
/// Sort specs are ordered lists; the order determines query-string emission
/// order and therefore server-side precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub path: String,
    pub order: SortOrder,
}

impl Sort {
    pub fn new(path: impl Into<String>, order: SortOrder) -> Self {
        Self {
            path: path.into(),
            order,
        }
    }

    /// The `path,order` form used as a repeated `sort=` parameter value.
    pub(crate) fn as_param(&self) -> String {
        format!("{},{}", self.path, self.order.as_str())
    }
}

/// Request-shape configuration for list and search calls.
///
/// `no_page` is consumed client-side: when the first response turns out to be
/// paginated anyway, the request is re-issued once with `size` set to the
/// observed total element count.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub no_page: bool,
    pub page_size: Option<u64>,
    pub sort: Vec<Sort>,
    pub params: Vec<(String, String)>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the server return everything in one page.
    pub fn no_page(mut self, no_page: bool) -> Self {
        self.no_page = no_page;
        self
    }

    /// Set an explicit page size (`size` parameter).
    pub fn page_size(mut self, size: u64) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Append a sort criterion; criteria keep their insertion order.
    pub fn sort_by(mut self, path: impl Into<String>, order: SortOrder) -> Self {
        self.sort.push(Sort::new(path, order));
        self
    }

    /// Append an arbitrary query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Render these options as a query string, `?`-prefixed, or empty when
    /// nothing is set. Emission order: caller params, then `size`, then the
    /// repeated `sort` parameters in list order.
    pub(crate) fn query_string(&self) -> String {
        let mut pairs: Vec<String> = Vec::new();
        for (key, value) in &self.params {
            pairs.push(format!("{}={}", key, value));
        }
        if let Some(size) = self.page_size {
            pairs.push(format!("size={}", size));
        }
        for sort in &self.sort {
            pairs.push(format!("sort={}", sort.as_param()));
        }
        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}
