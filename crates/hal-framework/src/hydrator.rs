//! # Field Extraction
//!
//! A [`Hydrator`] turns an entity into its ordered [`Fields`]. Which one runs is
//! decided once per entity, in this order:
//!
//! 1. The entity describes itself ([`Entity::to_fields`] returns `Some`).
//! 2. The entity's [`Metadata`] names a hydrator.
//! 3. A hydrator registered for the entity type.
//! 4. The default hydrator.
//! 5. [`Entity::public_fields`].
//!
//! [`HydratorManager`] is built up front and is read-only while rendering.

use crate::config::RendererConfig;
use crate::entity::{Entity, Fields};
use crate::error::HalError;
use crate::metadata::Metadata;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Name under which [`PublicFieldsHydrator`] is always registered.
pub const PUBLIC_FIELDS: &str = "public_fields";

/// Extracts the fields of an entity.
pub trait Hydrator: Send + Sync {
    fn extract(&self, entity: &dyn Entity) -> Result<Fields, HalError>;
}

impl<F> Hydrator for F
where
    F: Fn(&dyn Entity) -> Result<Fields, HalError> + Send + Sync,
{
    fn extract(&self, entity: &dyn Entity) -> Result<Fields, HalError> {
        self(entity)
    }
}

/// Shallow struct-to-map extraction through [`Entity::public_fields`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicFieldsHydrator;

impl Hydrator for PublicFieldsHydrator {
    fn extract(&self, entity: &dyn Entity) -> Result<Fields, HalError> {
        entity.public_fields()
    }
}

/// Registry of hydrators: by name, by entity type, plus a default.
#[derive(Clone)]
pub struct HydratorManager {
    named: HashMap<String, Arc<dyn Hydrator>>,
    by_type: HashMap<String, Arc<dyn Hydrator>>,
    default: Option<Arc<dyn Hydrator>>,
}

impl Default for HydratorManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HydratorManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut named: Vec<&String> = self.named.keys().collect();
        named.sort();
        let mut by_type: Vec<&String> = self.by_type.keys().collect();
        by_type.sort();
        f.debug_struct("HydratorManager")
            .field("named", &named)
            .field("by_type", &by_type)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

impl HydratorManager {
    pub fn new() -> Self {
        let mut named: HashMap<String, Arc<dyn Hydrator>> = HashMap::new();
        named.insert(PUBLIC_FIELDS.to_string(), Arc::new(PublicFieldsHydrator));
        Self {
            named,
            by_type: HashMap::new(),
            default: None,
        }
    }

    /// Registers a hydrator under a name, for use from configuration.
    pub fn with_named(mut self, name: impl Into<String>, hydrator: impl Hydrator + 'static) -> Self {
        self.named.insert(name.into(), Arc::new(hydrator));
        self
    }

    /// Registers a hydrator for one entity type.
    pub fn with_type(mut self, entity_type: impl Into<String>, hydrator: impl Hydrator + 'static) -> Self {
        self.by_type.insert(entity_type.into(), Arc::new(hydrator));
        self
    }

    pub fn with_default(mut self, hydrator: impl Hydrator + 'static) -> Self {
        self.default = Some(Arc::new(hydrator));
        self
    }

    /// Looks a hydrator up by name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Hydrator>, HalError> {
        self.named
            .get(name)
            .cloned()
            .ok_or_else(|| HalError::UnknownHydrator(name.to_string()))
    }

    pub fn for_type(&self, entity_type: &str) -> Option<&Arc<dyn Hydrator>> {
        self.by_type.get(entity_type)
    }

    pub fn default_hydrator(&self) -> Option<&Arc<dyn Hydrator>> {
        self.default.as_ref()
    }

    /// Applies the `renderer` section of the configuration.
    pub fn configure(&mut self, config: &RendererConfig) -> Result<(), HalError> {
        if let Some(name) = &config.default_hydrator {
            self.default = Some(self.resolve(name)?);
        }
        for (entity_type, name) in &config.hydrators {
            let hydrator = self.resolve(name)?;
            self.by_type.insert(entity_type.clone(), hydrator);
        }
        Ok(())
    }

    /// Extracts the fields of `entity` following the resolution order.
    pub fn extract(&self, entity: &dyn Entity, metadata: Option<&Metadata>) -> Result<Fields, HalError> {
        let entity_type = entity.entity_type();
        if let Some(fields) = entity.to_fields() {
            trace!(entity_type, "Self-describing entity");
            return Ok(fields);
        }
        if let Some(hydrator) = metadata.and_then(Metadata::hydrator) {
            trace!(entity_type, "Metadata hydrator");
            return hydrator.extract(entity);
        }
        if let Some(hydrator) = self.for_type(entity_type) {
            trace!(entity_type, "Type hydrator");
            return hydrator.extract(entity);
        }
        if let Some(hydrator) = &self.default {
            trace!(entity_type, "Default hydrator");
            return hydrator.extract(entity);
        }
        trace!(entity_type, "Public fields");
        entity.public_fields()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::FieldValue;
    use serde_json::json;

    #[derive(Debug)]
    struct Secret {
        name: String,
        password: String,
    }

    impl Entity for Secret {
        fn entity_type(&self) -> &str {
            "Secret"
        }

        fn public_fields(&self) -> Result<Fields, HalError> {
            Ok(Fields::new()
                .with("name", json!(self.name))
                .with("password", json!(self.password)))
        }
    }

    fn redacting(entity: &dyn Entity) -> Result<Fields, HalError> {
        let mut fields = entity.public_fields()?;
        fields.remove("password");
        Ok(fields)
    }

    fn constant(_: &dyn Entity) -> Result<Fields, HalError> {
        Ok(Fields::new().with("constant", json!(true)))
    }

    fn secret() -> Secret {
        Secret {
            name: "root".into(),
            password: "hunter2".into(),
        }
    }

    #[test]
    fn falls_back_to_public_fields() {
        let fields = HydratorManager::new().extract(&secret(), None).unwrap();
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn type_hydrator_beats_default() {
        let manager = HydratorManager::new()
            .with_type("Secret", redacting)
            .with_default(constant);
        let fields = manager.extract(&secret(), None).unwrap();
        assert!(fields.contains_key("name"));
        assert!(!fields.contains_key("password"));
    }

    #[test]
    fn default_applies_to_unregistered_types() {
        let manager = HydratorManager::new().with_default(constant);
        let fields = manager.extract(&secret(), None).unwrap();
        assert_eq!(fields.get("constant").and_then(FieldValue::as_json), Some(&json!(true)));
    }

    #[test]
    fn metadata_hydrator_beats_type_hydrator() {
        let manager = HydratorManager::new().with_type("Secret", constant);
        let metadata = Metadata::new("Secret").unwrap().with_hydrator(Arc::new(redacting));
        let fields = manager.extract(&secret(), Some(&metadata)).unwrap();
        assert!(!fields.contains_key("password"));
        assert!(!fields.contains_key("constant"));
    }

    #[test]
    fn self_describing_entities_skip_hydrators() {
        let map = json!({ "password": "x" }).as_object().cloned().unwrap_or_default();
        let manager = HydratorManager::new().with_default(redacting);
        let fields = manager.extract(&map, None).unwrap();
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn configure_resolves_names() {
        let mut manager = HydratorManager::new().with_named("redacting", redacting);
        let config: RendererConfig = serde_json::from_value(json!({
            "default_hydrator": "public_fields",
            "hydrators": { "Secret": "redacting" }
        }))
        .unwrap();
        manager.configure(&config).unwrap();
        assert!(manager.for_type("Secret").is_some());
        assert!(manager.default_hydrator().is_some());
    }

    #[test]
    fn unknown_hydrator_name_fails() {
        let mut manager = HydratorManager::new();
        let config: RendererConfig =
            serde_json::from_value(json!({ "default_hydrator": "missing" })).unwrap();
        let err = manager.configure(&config).unwrap_err();
        assert!(matches!(err, HalError::UnknownHydrator(name) if name == "missing"));
    }
}
