//! Field copy from a raw payload onto a typed entity.
//!
//! Hydration goes through the entity's serde representation: the current
//! instance is serialized, the payload's fields are merged over it, and the
//! result is deserialized back in place. Fields the payload does not mention
//! keep their current values; fields it does mention overwrite
//! unconditionally, including nested objects and the `_links` section. No
//! recursive typed hydration happens for nested resources; callers wanting a
//! typed nested resource follow its relation link instead.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::HalError;

/// Copy every field present in `payload` onto `entity`, in place.
///
/// One exception to plain overwrite: a `null` payload value landing on a
/// field that currently holds an array becomes an empty array, so a server
/// omitting an empty collection never costs the field its array-ness.
///
/// Non-object payloads (e.g. the empty body of a write response) leave the
/// entity untouched.
///
/// # Errors
///
/// Returns [`HalError::InvalidEntity`] when the entity cannot be serialized
/// or the merged result no longer deserializes into `T`.
pub fn hydrate<T>(entity: &mut T, payload: &Value) -> Result<(), HalError>
where
    T: Serialize + DeserializeOwned,
{
    let Value::Object(fields) = payload else {
        return Ok(());
    };

    let mut current =
        serde_json::to_value(&*entity).map_err(|source| HalError::InvalidEntity { source })?;

    if let Value::Object(target) = &mut current {
        for (key, value) in fields {
            if value.is_null() && target.get(key).is_some_and(Value::is_array) {
                target.insert(key.clone(), Value::Array(Vec::new()));
            } else {
                target.insert(key.clone(), value.clone());
            }
        }
    } else {
        current = payload.clone();
    }

    *entity = serde_json::from_value(current).map_err(|source| HalError::InvalidEntity { source })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{HalResource, Links};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        #[serde(rename = "_links", default)]
        links: Links,
        id: Option<u64>,
        name: Option<String>,
        tags: Vec<String>,
    }

    impl HalResource for Item {
        fn links(&self) -> &Links {
            &self.links
        }
        fn links_mut(&mut self) -> &mut Links {
            &mut self.links
        }
    }

    #[test]
    fn payload_fields_overwrite() {
        let mut item = Item {
            name: Some("old".into()),
            ..Item::default()
        };
        hydrate(&mut item, &json!({ "id": 7, "name": "new" })).unwrap();
        assert_eq!(item.id, Some(7));
        assert_eq!(item.name.as_deref(), Some("new"));
    }

    #[test]
    fn unmentioned_fields_keep_their_values() {
        let mut item = Item {
            name: Some("kept".into()),
            ..Item::default()
        };
        hydrate(&mut item, &json!({ "id": 1 })).unwrap();
        assert_eq!(item.name.as_deref(), Some("kept"));
    }

    #[test]
    fn null_over_array_becomes_empty_array() {
        let mut item = Item {
            tags: vec!["a".into(), "b".into()],
            ..Item::default()
        };
        hydrate(&mut item, &json!({ "tags": null })).unwrap();
        assert!(item.tags.is_empty());
    }

    #[test]
    fn null_over_scalar_clears_it() {
        let mut item = Item {
            name: Some("gone".into()),
            ..Item::default()
        };
        hydrate(&mut item, &json!({ "name": null })).unwrap();
        assert_eq!(item.name, None);
    }

    #[test]
    fn links_section_is_replaced_wholesale() {
        let mut item = Item::default();
        hydrate(
            &mut item,
            &json!({ "_links": { "self": { "href": "/items/3" } } }),
        )
        .unwrap();
        assert_eq!(item.self_href(), Some("/items/3"));

        hydrate(
            &mut item,
            &json!({ "_links": { "self": { "href": "/items/4" } } }),
        )
        .unwrap();
        assert_eq!(item.self_href(), Some("/items/4"));
    }

    #[test]
    fn unknown_payload_fields_are_ignored() {
        let mut item = Item::default();
        hydrate(&mut item, &json!({ "id": 2, "color": "teal" })).unwrap();
        assert_eq!(item.id, Some(2));
    }

    #[test]
    fn non_object_payload_is_a_no_op() {
        let mut item = Item {
            id: Some(5),
            ..Item::default()
        };
        let before = item.clone();
        hydrate(&mut item, &Value::Null).unwrap();
        assert_eq!(item, before);
    }
}
