//! # Metadata
//!
//! [`Metadata`] tells the assembler how to turn a raw entity of a given type into
//! a hypermedia resource (or collection) without the caller wrapping it by hand:
//! which hydrator to use, which field holds the identifier, and which route or URL
//! produces its `self` link.
//!
//! [`MetadataMap`] looks metadata up by [`Entity::entity_type`]. With
//! `match_ancestors` enabled, the entity's [`Entity::ancestors`] are tried in order
//! after the exact type, so the closest ancestor wins.
//!
//! ```rust
//! use hal_framework::{Metadata, MetadataMap, Route};
//!
//! let mut map = MetadataMap::new();
//! map.insert(Metadata::new("User").unwrap().with_route(Route::new("users")).unwrap());
//! assert!(map.get_type("User").is_some());
//! assert!(map.require("Order").is_err());
//! ```

use crate::collection::{DEFAULT_COLLECTION_NAME, DEFAULT_IDENTIFIER};
use crate::config::{HalConfig, MetadataConfig};
use crate::entity::Entity;
use crate::error::HalError;
use crate::hydrator::{Hydrator, HydratorManager};
use crate::link::{Link, LinkTarget, Route};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Per-type rendering configuration.
#[derive(Clone)]
pub struct Metadata {
    type_name: String,
    hydrator: Option<Arc<dyn Hydrator>>,
    identifier_name: String,
    route_identifier_name: String,
    is_collection: bool,
    collection_name: String,
    route: Option<Route>,
    url: Option<String>,
    resource_route: Option<Route>,
    links: Vec<Link>,
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metadata")
            .field("type_name", &self.type_name)
            .field("has_hydrator", &self.hydrator.is_some())
            .field("identifier_name", &self.identifier_name)
            .field("route_identifier_name", &self.route_identifier_name)
            .field("is_collection", &self.is_collection)
            .field("collection_name", &self.collection_name)
            .field("route", &self.route)
            .field("url", &self.url)
            .field("resource_route", &self.resource_route)
            .field("links", &self.links)
            .finish()
    }
}

impl Metadata {
    pub fn new(type_name: impl Into<String>) -> Result<Self, HalError> {
        let type_name = type_name.into();
        if type_name.trim().is_empty() {
            return Err(HalError::InvalidMetadata {
                type_name,
                reason: "type identifier is empty".into(),
            });
        }
        Ok(Self {
            type_name,
            hydrator: None,
            identifier_name: DEFAULT_IDENTIFIER.to_string(),
            route_identifier_name: DEFAULT_IDENTIFIER.to_string(),
            is_collection: false,
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            route: None,
            url: None,
            resource_route: None,
            links: Vec::new(),
        })
    }

    /// Builds metadata from a configuration entry, resolving hydrator names.
    pub fn from_config(
        type_name: &str,
        config: &MetadataConfig,
        hydrators: &HydratorManager,
    ) -> Result<Self, HalError> {
        let mut metadata = Self::new(type_name)?;
        if let Some(name) = &config.hydrator {
            metadata.hydrator = Some(hydrators.resolve(name)?);
        }
        if let Some(name) = &config.identifier_name {
            metadata = metadata.with_identifier_name(name.as_str());
        }
        if let Some(name) = &config.route_identifier_name {
            metadata = metadata.with_route_identifier_name(name.as_str());
        }
        if let Some(name) = &config.collection_name {
            metadata = metadata.with_collection_name(name.as_str());
        }
        metadata = metadata.with_is_collection(config.is_collection);

        if let Some(name) = &config.route_name {
            let mut route = Route::new(name.as_str()).with_params(config.route_params.clone());
            if let Some(options) = &config.route_options {
                route = route.with_options(options.clone());
            }
            metadata = metadata.with_route(route)?;
        }
        if let Some(url) = &config.url {
            metadata = metadata.with_url(url)?;
        }
        if let Some(name) = &config.resource_route_name {
            metadata = metadata.with_resource_route(Route::new(name.as_str()));
        }
        for spec in &config.links {
            metadata = metadata.with_link(Link::try_from(spec.clone())?)?;
        }
        Ok(metadata)
    }

    pub fn with_hydrator(mut self, hydrator: Arc<dyn Hydrator>) -> Self {
        self.hydrator = Some(hydrator);
        self
    }

    /// Field of the entity holding its identifier.
    pub fn with_identifier_name(mut self, name: impl Into<String>) -> Self {
        self.identifier_name = name.into();
        self
    }

    /// Route parameter receiving the identifier.
    pub fn with_route_identifier_name(mut self, name: impl Into<String>) -> Self {
        self.route_identifier_name = name.into();
        self
    }

    pub fn with_is_collection(mut self, is_collection: bool) -> Self {
        self.is_collection = is_collection;
        self
    }

    pub fn with_collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = name.into();
        self
    }

    /// Route of the `self` link. Conflicts with a url.
    pub fn with_route(mut self, route: Route) -> Result<Self, HalError> {
        if self.url.is_some() {
            return Err(self.invalid("both a route and a url are set"));
        }
        self.route = Some(route);
        Ok(self)
    }

    /// Absolute url of the `self` link. Conflicts with a route.
    pub fn with_url(mut self, url: &str) -> Result<Self, HalError> {
        if self.route.is_some() {
            return Err(self.invalid("both a route and a url are set"));
        }
        url::Url::parse(url).map_err(|source| HalError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        self.url = Some(url.to_string());
        Ok(self)
    }

    /// Route used for items of a collection type.
    pub fn with_resource_route(mut self, route: Route) -> Self {
        self.resource_route = Some(route);
        self
    }

    /// Static link injected into every rendering of this type.
    pub fn with_link(mut self, link: Link) -> Result<Self, HalError> {
        if !link.is_complete() {
            return Err(HalError::IncompleteLink(link.rel().to_string()));
        }
        self.links.push(link);
        Ok(self)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn hydrator(&self) -> Option<&Arc<dyn Hydrator>> {
        self.hydrator.as_ref()
    }

    pub fn identifier_name(&self) -> &str {
        &self.identifier_name
    }

    pub fn route_identifier_name(&self) -> &str {
        &self.route_identifier_name
    }

    pub fn is_collection(&self) -> bool {
        self.is_collection
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn resource_route(&self) -> Option<&Route> {
        self.resource_route.as_ref()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Where the `self` link of this type points, if anywhere.
    pub fn self_target(&self) -> Option<LinkTarget> {
        match (&self.route, &self.url) {
            (Some(route), _) => Some(LinkTarget::Route(route.clone())),
            (None, Some(url)) => Some(LinkTarget::Url(url.clone())),
            (None, None) => None,
        }
    }

    fn invalid(&self, reason: &str) -> HalError {
        HalError::InvalidMetadata {
            type_name: self.type_name.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Metadata keyed by entity type.
#[derive(Debug, Clone, Default)]
pub struct MetadataMap {
    entries: HashMap<String, Metadata>,
    match_ancestors: bool,
}

impl MetadataMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match_ancestors(mut self, enabled: bool) -> Self {
        self.match_ancestors = enabled;
        self
    }

    pub fn from_config(config: &HalConfig, hydrators: &HydratorManager) -> Result<Self, HalError> {
        let mut map = Self::new().with_match_ancestors(config.match_ancestors);
        for (type_name, entry) in &config.metadata_map {
            map.insert(Metadata::from_config(type_name, entry, hydrators)?);
        }
        debug!(entries = map.len(), match_ancestors = map.match_ancestors, "Loaded metadata map");
        Ok(map)
    }

    /// Registers metadata, replacing any previous entry for the same type.
    pub fn insert(&mut self, metadata: Metadata) {
        self.entries.insert(metadata.type_name.clone(), metadata);
    }

    pub fn with(mut self, metadata: Metadata) -> Self {
        self.insert(metadata);
        self
    }

    pub fn match_ancestors(&self) -> bool {
        self.match_ancestors
    }

    /// Metadata for an entity: exact type first, then ancestors if enabled.
    pub fn get(&self, entity: &dyn Entity) -> Option<&Metadata> {
        if let Some(metadata) = self.entries.get(entity.entity_type()) {
            return Some(metadata);
        }
        if !self.match_ancestors {
            return None;
        }
        entity
            .ancestors()
            .iter()
            .find_map(|ancestor| self.entries.get(*ancestor))
    }

    pub fn get_type(&self, type_name: &str) -> Option<&Metadata> {
        self.entries.get(type_name)
    }

    pub fn require(&self, type_name: &str) -> Result<&Metadata, HalError> {
        self.get_type(type_name)
            .ok_or_else(|| HalError::UnknownType(type_name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
