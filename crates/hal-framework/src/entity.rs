//! # Entity Trait
//!
//! The `Entity` trait is the contract any domain record must satisfy to be rendered
//! as HAL. The assembler only needs three things from an entity:
//!
//! 1. A **type identifier** ([`Entity::entity_type`]) used to find its [`Metadata`](crate::metadata::Metadata).
//! 2. Its **fields** as an ordered [`Fields`] map, either self-described
//!    ([`Entity::to_fields`]) or via the generic fallback ([`Entity::public_fields`]).
//! 3. Optionally, its **ancestors** (closest first) so that metadata declared for a
//!    broader type can match when ancestor matching is enabled.
//!
//! A field can hold plain JSON, a nested [`Resource`] or [`Collection`], or another
//! entity. Nested hypermedia objects end up under `_embedded`.
//!
//! # Provided Methods
//! Only [`Entity::public_fields`] is required. The rest default to "no opinion".
//!
//! ```rust
//! use hal_framework::{Entity, Fields, HalError};
//! use serde::Serialize;
//!
//! #[derive(Debug, Serialize)]
//! struct User {
//!     id: u32,
//!     name: String,
//! }
//!
//! impl Entity for User {
//!     fn entity_type(&self) -> &str {
//!         "User"
//!     }
//!
//!     fn public_fields(&self) -> Result<Fields, HalError> {
//!         Fields::from_serialize(self)
//!     }
//! }
//!
//! let fields = User { id: 1, name: "Alice".into() }.public_fields().unwrap();
//! assert_eq!(fields.len(), 2);
//! ```

use crate::collection::{Collection, CollectionSource};
use crate::error::HalError;
use crate::resource::Resource;
use serde::Serialize;
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

/// Access to the concrete type behind a `dyn Entity`.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A domain record that can be rendered as a HAL resource.
pub trait Entity: AsAny + Debug + Send + Sync {
    /// Identifier used for metadata lookup. Defaults to the Rust type name.
    fn entity_type(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Broader type identifiers, closest first.
    fn ancestors(&self) -> &[&str] {
        &[]
    }

    /// Self-describing serialization. When this returns `Some`, no hydrator is consulted.
    fn to_fields(&self) -> Option<Fields> {
        None
    }

    /// Generic field extraction, the last step of hydrator resolution.
    fn public_fields(&self) -> Result<Fields, HalError>;

    /// Contents of an entity whose metadata flags it as a collection.
    fn as_collection(&self) -> Option<CollectionSource> {
        None
    }
}

/// The value of a single field.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Json(Value),
    Resource(Box<Resource>),
    Collection(Box<Collection>),
    Entity(Arc<dyn Entity>),
}

impl FieldValue {
    pub fn entity(entity: impl Entity + 'static) -> Self {
        FieldValue::Entity(Arc::new(entity))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            FieldValue::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Json(value)
    }
}

impl From<Resource> for FieldValue {
    fn from(resource: Resource) -> Self {
        FieldValue::Resource(Box::new(resource))
    }
}

impl From<Collection> for FieldValue {
    fn from(collection: Collection) -> Self {
        FieldValue::Collection(Box::new(collection))
    }
}

impl From<Arc<dyn Entity>> for FieldValue {
    fn from(entity: Arc<dyn Entity>) -> Self {
        FieldValue::Entity(entity)
    }
}

/// Ordered field map of an entity.
#[derive(Debug, Clone, Default)]
pub struct Fields {
    entries: Vec<(String, FieldValue)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts a serializable struct into fields. The value must serialize to an object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, HalError> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self::from(map)),
            other => Err(HalError::Extraction {
                type_name: std::any::type_name::<T>().to_string(),
                reason: format!("expected an object, got {other}"),
            }),
        }
    }

    /// Inserts a field, replacing an existing one in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Map<String, Value>> for Fields {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter()
            .map(|(key, value)| (key, FieldValue::Json(value)))
            .collect()
    }
}

impl FromIterator<(String, FieldValue)> for Fields {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

impl IntoIterator for Fields {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Generic records are self-describing: their fields are used verbatim.
impl Entity for Map<String, Value> {
    fn entity_type(&self) -> &str {
        "map"
    }

    fn to_fields(&self) -> Option<Fields> {
        Some(Fields::from(self.clone()))
    }

    fn public_fields(&self) -> Result<Fields, HalError> {
        Ok(Fields::from(self.clone()))
    }
}

/// A hand-built field map can be rendered directly, nested resources included.
impl Entity for Fields {
    fn entity_type(&self) -> &str {
        "fields"
    }

    fn to_fields(&self) -> Option<Fields> {
        Some(self.clone())
    }

    fn public_fields(&self) -> Result<Fields, HalError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl Entity for Point {
        fn public_fields(&self) -> Result<Fields, HalError> {
            Fields::from_serialize(self)
        }
    }

    #[test]
    fn default_entity_type_is_the_rust_type_name() {
        let point = Point { x: 1, y: 2 };
        assert!(point.entity_type().ends_with("Point"));
        assert!(point.ancestors().is_empty());
        assert!(point.to_fields().is_none());
    }

    #[test]
    fn from_serialize_keeps_field_order() {
        let fields = Point { x: 1, y: 2 }.public_fields().unwrap();
        let names: Vec<&str> = fields.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(fields.get("y").and_then(FieldValue::as_json), Some(&json!(2)));
    }

    #[test]
    fn from_serialize_rejects_scalars() {
        let err = Fields::from_serialize(&42).unwrap_err();
        assert!(matches!(err, HalError::Extraction { .. }));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut fields = Fields::new().with("a", json!(1)).with("b", json!(2));
        fields.insert("a", json!(3));
        let values: Vec<Value> = fields
            .into_iter()
            .filter_map(|(_, value)| value.as_json().cloned())
            .collect();
        assert_eq!(values, vec![json!(3), json!(2)]);
    }

    #[test]
    fn downcast_through_as_any() {
        let entity: Arc<dyn Entity> = Arc::new(Point { x: 4, y: 5 });
        let point = entity.as_ref().as_any().downcast_ref::<Point>().unwrap();
        assert_eq!(point.x, 4);
    }

    #[test]
    fn json_maps_are_self_describing() {
        let map = json!({ "id": 1, "name": "Alice" });
        let map = map.as_object().unwrap().clone();
        let fields = map.to_fields().unwrap();
        assert_eq!(fields.len(), 2);
    }
}
