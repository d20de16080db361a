//! Relation flattening - turns a typed entity graph into a write payload.
//!
//! Servers accept a bare href wherever a relation is expected, so writes
//! replace every nested resource with its self-link URI instead of
//! serializing the whole object. The self-link is the authoritative signal;
//! a value that merely carries a `_links` section but no self entry is a
//! resource with nothing referenceable and is dropped from the payload.

use serde_json::{Map, Value};

use crate::error::HalError;
use crate::resource::{is_resource_like, self_href_of, HalResource};

/// Flatten an entity into a JSON payload for create/update/patch.
///
/// Per own property of the serialized entity:
/// - `null` values are skipped,
/// - values with a self-link collapse to that href string,
/// - resource-like values without a self link are dropped,
/// - sequences are rebuilt with primitives passed through, self-linked
///   elements collapsed to hrefs and other composites flattened recursively,
/// - everything else copies verbatim.
///
/// The entity itself is left untouched.
///
/// # Errors
///
/// Returns [`HalError::InvalidEntity`] when the entity cannot be serialized.
pub fn flatten<T: HalResource>(entity: &T) -> Result<Value, HalError> {
    let value =
        serde_json::to_value(entity).map_err(|source| HalError::InvalidEntity { source })?;
    match value {
        Value::Object(map) => Ok(flatten_object(&map)),
        other => Ok(other),
    }
}

fn flatten_object(map: &Map<String, Value>) -> Value {
    let mut result = Map::new();
    for (key, value) in map {
        if value.is_null() {
            continue;
        }
        if let Some(href) = self_href_of(value) {
            result.insert(key.clone(), Value::String(href.to_string()));
        } else if is_resource_like(value) {
            // Unpersisted nested resource: no href to reference.
            continue;
        } else if let Value::Array(items) = value {
            result.insert(
                key.clone(),
                Value::Array(items.iter().map(flatten_element).collect()),
            );
        } else {
            result.insert(key.clone(), value.clone());
        }
    }
    Value::Object(result)
}

fn flatten_element(value: &Value) -> Value {
    if let Some(href) = self_href_of(value) {
        return Value::String(href.to_string());
    }
    match value {
        Value::Object(map) => flatten_object(map),
        Value::Array(items) => Value::Array(items.iter().map(flatten_element).collect()),
        other => other.clone(),
    }
}
